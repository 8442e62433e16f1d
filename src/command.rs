use crate::env::Environment;
use anyhow::Result;
use std::io::Write;

/// What the read-eval loop should do after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Prompt for the next line.
    Continue,
    /// Leave the loop; the shell exits with status 0.
    Exit,
}

/// Object-safe trait for any command the shell runs in-process.
pub trait ExecutableCommand {
    /// Executes the command.
    ///
    /// Diagnostics go to `stdout`, the same stream the prompt is printed on.
    fn execute(self: Box<Self>, stdout: &mut dyn Write, env: &mut Environment) -> Result<Flow>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(&self, name: &str, args: &[&str]) -> Option<Box<dyn ExecutableCommand>>;
}
