use crate::command::{CommandFactory, Flow};
use crate::env::Environment;
use crate::error::ShellError;
use crate::io_adapters::LineSource;
use crate::jobs::JobTable;
use crate::parser;
use crate::{external, lexer, pipe};
use std::io::Write;
use tracing::{debug, trace};

/// Factory allows creating instances of ExecutableCommand.
///
/// Only support commands defined in this crate, i.e. the builtins.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A minimal shell: builtins run in-process, everything else is spawned.
///
/// Builtins are found by asking each [`CommandFactory`] about the first word of
/// the line, before `&`, `>` or `|` are looked at. Any other line is classified
/// and handed to the single-command or the pipe launcher.
///
/// Example
/// ```
/// use tinysh::{Flow, Interpreter};
/// let mut sh = Interpreter::default();
/// let mut out = Vec::new();
/// assert_eq!(sh.execute_line("exit", &mut out).unwrap(), Flow::Exit);
/// ```
pub struct Interpreter {
    env: Environment,
    builtins: Vec<Box<dyn CommandFactory>>,
    jobs: JobTable,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of builtin factories.
    pub fn new(builtins: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            builtins,
            jobs: JobTable::new(),
        }
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// Background children that have not been reaped yet.
    pub fn jobs(&self) -> &JobTable {
        &self.jobs
    }

    /// Runs one command line.
    ///
    /// Recovered failures are written to `out` and yield `Flow::Continue`.
    /// An `Err` is fatal to the session.
    pub fn execute_line(&mut self, line: &str, out: &mut dyn Write) -> Result<Flow, ShellError> {
        let argv = lexer::split_into_tokens(line);
        trace!(?argv, "tokens");

        let Some((name, args)) = argv.split_first() else {
            return Ok(Flow::Continue);
        };

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        for factory in &self.builtins {
            if let Some(cmd) = factory.try_create(name, &args) {
                return Ok(cmd.execute(out, &mut self.env)?);
            }
        }

        let line = parser::classify(argv)?;
        debug!(argv = ?line.argv, dispatch = ?line.dispatch, "dispatch");

        // Children write straight to fd 1; anything still buffered must go first.
        out.flush()?;

        let target = line.dispatch.output_target.as_deref();
        let blocking = !line.dispatch.background;
        match line.split_pipe() {
            Some((left, right)) => {
                let children = pipe::launch_pipe(left, right, target, blocking, out)?;
                self.jobs.extend(children);
            }
            None => {
                if let Some(child) = external::launch(&line.argv, target, blocking, out)? {
                    self.jobs.push(child);
                }
            }
        }
        Ok(Flow::Continue)
    }

    /// The read-eval loop.
    ///
    /// Runs until `exit` or end of input. Finished background jobs are reaped
    /// before every prompt.
    pub fn repl(&mut self, source: &mut dyn LineSource, out: &mut dyn Write) -> Result<(), ShellError> {
        loop {
            self.jobs.reap();
            let Some(line) = source.next_line()? else {
                debug!("end of input");
                break;
            };
            if self.execute_line(&line, out)? == Flow::Exit {
                break;
            }
        }
        self.jobs.reap();
        out.flush()?;
        Ok(())
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the builtins `cd` and `exit`.
    fn default() -> Self {
        Self::new(crate::builtin::factories())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::io_adapters::ReaderSource;
    use crate::lock_current_dir;
    use crate::parser::ParsingError;
    use std::fs;
    use std::io::Cursor;
    use std::path::Path;

    fn run(sh: &mut Interpreter, line: &str) -> (Flow, String) {
        let mut out = Vec::new();
        let flow = sh.execute_line(line, &mut out).unwrap();
        (flow, String::from_utf8(out).unwrap())
    }

    fn path(p: &Path) -> String {
        p.to_string_lossy().to_string()
    }

    #[test]
    fn test_blank_lines_do_nothing() {
        let mut sh = Interpreter::default();
        assert_eq!(run(&mut sh, ""), (Flow::Continue, String::new()));
        assert_eq!(run(&mut sh, "   "), (Flow::Continue, String::new()));
    }

    #[test]
    fn test_exit_with_and_without_arguments() {
        let mut sh = Interpreter::default();
        assert_eq!(run(&mut sh, "exit").0, Flow::Exit);
        assert_eq!(run(&mut sh, "exit now").0, Flow::Exit);
        assert_eq!(run(&mut sh, "exit &").0, Flow::Exit);
    }

    #[test]
    fn test_echo_redirected_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("x");
        let mut sh = Interpreter::default();

        let (flow, diag) = run(&mut sh, &format!("echo hello > {}", path(&target)));

        assert_eq!(flow, Flow::Continue);
        assert!(diag.is_empty());
        assert_eq!(fs::read_to_string(&target).unwrap(), "hello\n");
    }

    #[test]
    fn test_append_operator_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("x");
        let mut sh = Interpreter::default();

        run(&mut sh, &format!("echo first >> {}", path(&target)));
        run(&mut sh, &format!("echo second >> {}", path(&target)));

        assert_eq!(fs::read_to_string(&target).unwrap(), "second\n");
    }

    #[test]
    fn test_pipe_counts_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("n");
        let mut sh = Interpreter::default();

        run(&mut sh, &format!("printf a | wc -c > {}", path(&target)));

        assert_eq!(fs::read_to_string(&target).unwrap().trim(), "1");
    }

    #[test]
    fn test_unknown_command_keeps_shell_running() {
        let mut sh = Interpreter::default();
        let (flow, diag) = run(&mut sh, "tinysh-no-such-program --flag");
        assert_eq!(flow, Flow::Continue);
        assert_eq!(diag, "unable to execute command\n");
    }

    #[test]
    fn test_missing_output_file_is_fatal() {
        let mut sh = Interpreter::default();
        let err = sh.execute_line("echo hi >", &mut Vec::new()).unwrap_err();
        assert!(matches!(err, ShellError::Parsing(ParsingError::MissingOutputFile)));
        assert_eq!(err.to_string(), "must specify output file");
    }

    #[test]
    fn test_background_command_is_tracked() {
        let mut sh = Interpreter::default();
        let (flow, diag) = run(&mut sh, "sleep 0 &");
        assert_eq!(flow, Flow::Continue);
        assert!(diag.is_empty());
        assert_eq!(sh.jobs().len(), 1);
    }

    #[test]
    fn test_background_pipe_is_not_waited_for() {
        let mut sh = Interpreter::default();
        run(&mut sh, "true | cat &");
        assert_eq!(sh.jobs().len(), 2);
    }

    #[test]
    fn test_builtins_see_raw_words() {
        let _lock = lock_current_dir();
        let before = std::env::current_dir().unwrap();
        let mut sh = Interpreter::default();

        let (flow, diag) = run(&mut sh, "cd &");

        assert_eq!(flow, Flow::Continue);
        assert_eq!(diag, "cd: &: No such file or directory\n");
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_cd_without_argument_goes_home() {
        let _lock = lock_current_dir();
        let orig = std::env::current_dir().unwrap();
        let home = tempfile::tempdir().unwrap();
        let canonical_home = fs::canonicalize(home.path()).unwrap();

        let mut sh = Interpreter::default();
        sh.env_mut().set_var("HOME", path(&canonical_home));
        run(&mut sh, "cd");
        let now = fs::canonicalize(std::env::current_dir().unwrap()).unwrap();
        std::env::set_current_dir(orig).unwrap();

        assert_eq!(now, canonical_home);
    }

    #[test]
    fn test_repl_stops_at_exit() {
        let dir = tempfile::tempdir().unwrap();
        let before = dir.path().join("before");
        let after = dir.path().join("after");
        let script = format!(
            "echo one > {}\n\nexit\necho two > {}\n",
            path(&before),
            path(&after)
        );

        let mut sh = Interpreter::default();
        let mut source = ReaderSource::new(Cursor::new(script), Vec::new(), "$ ");
        let mut out = Vec::new();
        sh.repl(&mut source, &mut out).unwrap();

        assert_eq!(fs::read_to_string(&before).unwrap(), "one\n");
        assert!(!after.exists());
    }

    #[test]
    fn test_repl_stops_at_end_of_input() {
        let mut sh = Interpreter::default();
        let mut source = ReaderSource::new(Cursor::new("tinysh-no-such-program\n"), Vec::new(), "$ ");
        let mut out = Vec::new();
        sh.repl(&mut source, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "unable to execute command\n");
    }
}
