use argh::FromArgs;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tinysh::io_adapters::{EditorSource, LineSource, ReaderSource};
use tinysh::{Interpreter, ShellError};
use tracing_subscriber::EnvFilter;

const BANNER: &[&str] = &[
    "$------------------------------------------------$",
    "$               Welcome to tinysh!               $",
    "$                                                $",
    "$       builtins: cd, exit   operators: & > |    $",
    "$------------------------------------------------$",
];

#[derive(FromArgs)]
/// A tiny command-line interpreter with background jobs, output redirection
/// and single pipes.
struct ShellArgs {
    /// prompt printed before every line
    #[argh(option, default = "String::from(\"$ \")")]
    prompt: String,

    /// do not print the welcome banner
    #[argh(switch)]
    no_banner: bool,
}

fn main() -> ExitCode {
    let args: ShellArgs = argh::from_env();

    // Logs go to stderr so stdout only carries the shell's own output.
    let filter = EnvFilter::try_from_env("TINYSH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // stdout may be what failed; writing here must not panic.
            let _ = writeln!(io::stdout(), "{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: ShellArgs) -> Result<(), ShellError> {
    let mut stdout = io::stdout();
    if !args.no_banner {
        for line in BANNER {
            writeln!(stdout, "{line}")?;
        }
    }

    let mut source: Box<dyn LineSource> = if io::stdin().is_terminal() {
        Box::new(EditorSource::new(args.prompt)?)
    } else {
        Box::new(ReaderSource::new(io::stdin().lock(), io::stdout(), args.prompt))
    };

    Interpreter::default().repl(source.as_mut(), &mut stdout)
}
