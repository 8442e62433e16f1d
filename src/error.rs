use crate::parser::ParsingError;
use rustyline::error::ReadlineError;
use thiserror::Error;

/// Which process of a command line could not be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// A command without a pipe.
    Single,
    /// The writing side of a pipe.
    First,
    /// The reading side of a pipe.
    Second,
}

/// Conditions that end the whole shell session.
///
/// Anything recoverable (a failed `cd`, an unknown program) is reported as text
/// and never reaches this type. `main` prints the message and exits with 1.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Parsing(#[from] ParsingError),

    #[error("{}", fork_message(.stage))]
    Fork {
        stage: Stage,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to read command line: {0}")]
    Readline(#[from] ReadlineError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn fork_message(stage: &Stage) -> &'static str {
    match stage {
        Stage::Single => "unable to fork",
        Stage::First => "unable to fork first child",
        Stage::Second => "unable to fork second child",
    }
}
