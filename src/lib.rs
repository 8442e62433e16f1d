//! A tiny command-line interpreter.
//!
//! A line is split on spaces, checked against the builtins (`cd`, `exit`) and
//! otherwise run as one external program or as two programs joined by a pipe.
//! A trailing `&` runs the line in the background and `>`/`>>` followed by a
//! filename sends standard output of the (last) program to that file.
//!
//! The main entry point is [`Interpreter`]. The public modules [`command`],
//! [`env`] and [`io_adapters`] expose the traits and types needed to feed it
//! lines and to plug in further builtins.

mod builtin;
pub mod command;
pub mod env;
mod error;
mod external;
pub mod io_adapters;
mod interpreter;
mod jobs;
mod lexer;
mod parser;
mod pipe;

pub use command::Flow;
pub use error::{ShellError, Stage};
pub use jobs::JobTable;
pub use parser::ParsingError;
/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;

/// Serializes tests that change the process working directory.
#[cfg(test)]
pub(crate) fn lock_current_dir() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};
    static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
    MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
