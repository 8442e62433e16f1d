use crate::error::{ShellError, Stage};
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use tracing::{debug, warn};

/// Printed when a program cannot be started. The shell keeps running.
pub const EXEC_FAILED: &str = "unable to execute command";

/// Command that is not a builtin.
///
/// The name is resolved against `PATH` by the OS when the process is spawned;
/// names containing a `/` are used as paths.
#[derive(Debug)]
pub struct ExternalCommand {
    name: OsString,
    args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new(name: OsString, args: Vec<OsString>) -> Self {
        Self { name, args }
    }

    /// Builds the command from a cleaned argv. `None` when the argv is empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (name, args) = argv.split_first()?;
        Some(Self::new(
            name.into(),
            args.iter().map(OsString::from).collect(),
        ))
    }

    /// Starts the program with the given standard input and output.
    ///
    /// The `Command` builder holds the parent's copies of `stdin` and `stdout`
    /// and is dropped before this returns, so a pipe end handed in here is no
    /// longer open in the shell afterwards.
    ///
    /// Returns `Ok(None)` when the program could not be executed; the
    /// diagnostic has then been written to `out`. Process-creation failures
    /// are fatal and come back as [`ShellError::Fork`].
    pub(crate) fn spawn(
        &self,
        stdin: Stdio,
        stdout: Stdio,
        stage: Stage,
        out: &mut dyn Write,
    ) -> Result<Option<Child>, ShellError> {
        let spawned = Command::new(&self.name)
            .args(&self.args)
            .stdin(stdin)
            .stdout(stdout)
            .spawn();

        match spawned {
            Ok(child) => {
                debug!(pid = child.id(), command = ?self.name, "spawned");
                Ok(Some(child))
            }
            Err(e) if is_fork_failure(&e) => Err(ShellError::Fork { stage, source: e }),
            Err(e) => {
                debug!(command = ?self.name, error = %e, "exec failed");
                writeln!(out, "{EXEC_FAILED}")?;
                Ok(None)
            }
        }
    }
}

/// Runs a single external command.
///
/// # Arguments
/// * `argv` - Cleaned argument vector; element 0 is the program.
/// * `output_target` - File that replaces the command's standard output.
/// * `blocking` - Wait for the command to finish.
/// * `out` - Where diagnostics are written.
///
/// # Returns
/// The still-running child when `blocking` is false, so the caller can reap it
/// later. `None` once a foreground child has been waited for, or when nothing
/// was started.
pub fn launch(
    argv: &[String],
    output_target: Option<&str>,
    blocking: bool,
    out: &mut dyn Write,
) -> Result<Option<Child>, ShellError> {
    let stdout = match output_target {
        Some(path) => match open_output(path, out)? {
            Some(file) => file,
            None => return Ok(None),
        },
        None => Stdio::inherit(),
    };

    let Some(command) = ExternalCommand::from_argv(argv) else {
        writeln!(out, "{EXEC_FAILED}")?;
        return Ok(None);
    };

    let Some(child) = command.spawn(Stdio::inherit(), stdout, Stage::Single, out)? else {
        return Ok(None);
    };

    if blocking {
        wait_for(child);
        Ok(None)
    } else {
        Ok(Some(child))
    }
}

/// Opens (creating or truncating) a redirection target.
///
/// A target that cannot be opened is reported on `out` and yields `None`; the
/// command is then not run.
pub(crate) fn open_output(path: &str, out: &mut dyn Write) -> Result<Option<Stdio>, ShellError> {
    match File::create(path) {
        Ok(file) => Ok(Some(Stdio::from(file))),
        Err(e) => {
            warn!(path, error = %e, "cannot open redirection target");
            writeln!(out, "{path}: {e}")?;
            Ok(None)
        }
    }
}

/// Blocks until `child` exits. The status is only logged.
pub(crate) fn wait_for(mut child: Child) {
    let pid = child.id();
    match child.wait() {
        Ok(status) => debug!(pid, code = exit_code(status), "child exited"),
        Err(e) => warn!(pid, error = %e, "wait failed"),
    }
}

/// Shell-style exit code for a finished child.
pub(crate) fn exit_code(exit_status: ExitStatus) -> i32 {
    match exit_status.code() {
        Some(x) => x,
        None => terminated_by_signal(exit_status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Spawn errors that mean no process could be created at all (EAGAIN,
/// ENOMEM), as opposed to the program failing to load.
fn is_fork_failure(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::OutOfMemory
    )
}
