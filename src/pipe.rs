//! Two external commands joined by one anonymous pipe.

use crate::error::{ShellError, Stage};
use crate::external::{EXEC_FAILED, ExternalCommand, open_output, wait_for};
use std::io::Write;
use std::process::{Child, Stdio};

/// Runs `left | right`.
///
/// The left stage reads the shell's standard input and writes into the pipe.
/// The right stage reads the pipe and writes to `output_target` when one is
/// given, otherwise to the shell's standard output. Only the right stage is
/// redirected.
///
/// Exec failures are reported on `out`, never into the pipe or the target
/// file. If the left stage cannot be executed the right one still runs and
/// sees end of input straight away. If the right stage cannot be executed the
/// read end is dropped and the left stage gets a broken pipe on its next write.
///
/// # Returns
/// The running children when `blocking` is false; empty once both have been
/// waited for.
pub fn launch_pipe(
    left: &[String],
    right: &[String],
    output_target: Option<&str>,
    blocking: bool,
    out: &mut dyn Write,
) -> Result<Vec<Child>, ShellError> {
    let stdout = match output_target {
        Some(path) => match open_output(path, out)? {
            Some(file) => file,
            None => return Ok(Vec::new()),
        },
        None => Stdio::inherit(),
    };

    let mut writer = spawn_stage(left, Stdio::inherit(), Stdio::piped(), Stage::First, out)?;

    // The read end lives only in the right stage's builder; once that is
    // dropped the shell holds neither end of the pipe.
    let read_end = writer
        .as_mut()
        .and_then(|child| child.stdout.take())
        .map_or_else(Stdio::null, Stdio::from);

    let reader = spawn_stage(right, read_end, stdout, Stage::Second, out)?;

    let children: Vec<Child> = writer.into_iter().chain(reader).collect();
    if blocking {
        children.into_iter().for_each(wait_for);
        Ok(Vec::new())
    } else {
        Ok(children)
    }
}

fn spawn_stage(
    argv: &[String],
    stdin: Stdio,
    stdout: Stdio,
    stage: Stage,
    out: &mut dyn Write,
) -> Result<Option<Child>, ShellError> {
    match ExternalCommand::from_argv(argv) {
        Some(command) => command.spawn(stdin, stdout, stage, out),
        None => {
            writeln!(out, "{EXEC_FAILED}")?;
            Ok(None)
        }
    }
}
