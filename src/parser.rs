//! Classification of a tokenized command line.
//!
//! The classifier pulls the control directives out of an argument vector and
//! leaves behind the clean argv handed to the launchers. Three scans run in a
//! fixed order, each on the vector left by the previous one:
//!
//! 1. background: a trailing `&` is removed;
//! 2. output redirection: the first `>` or `>>` and the word after it are removed;
//! 3. pipe: the index of the first `|` is recorded, the vector is not touched.

use thiserror::Error;

/// Marker that, as the last word, runs the command without waiting for it.
pub const BACKGROUND: &str = "&";
/// Output redirection operator.
pub const REDIRECT_OUT: &str = ">";
/// Output redirection operator spelled for appending. It truncates like `>`.
pub const REDIRECT_APPEND: &str = ">>";
/// Separator between the two stages of a pipe.
pub const PIPE: &str = "|";

/// Errors that can occur while classifying an argument vector.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParsingError {
    /// A redirection operator was the last word on the line.
    #[error("must specify output file")]
    MissingOutputFile,
}

/// Control directives extracted from a command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// Do not wait for the launched process(es).
    pub background: bool,
    /// File that replaces standard output of the (last) command.
    pub output_target: Option<String>,
    /// Index of the first `|` in the cleaned argv.
    pub pipe_split: Option<usize>,
}

/// A classified command line: the cleaned argv plus its directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub argv: Vec<String>,
    pub dispatch: Dispatch,
}

impl CommandLine {
    /// Split the argv around the recorded pipe.
    ///
    /// The left stage is everything before the `|`, the right stage everything
    /// after it. Further `|` words stay in the right stage as plain arguments.
    /// Returns `None` when the line has no pipe.
    pub fn split_pipe(&self) -> Option<(&[String], &[String])> {
        let index = self.dispatch.pipe_split?;
        Some((&self.argv[..index], &self.argv[index + 1..]))
    }
}

/// Runs the three classification scans over `argv`.
///
/// # Arguments
/// * `argv` - Words produced by the lexer. Element 0, if any, is the command.
///
/// # Returns
/// The cleaned [`CommandLine`], or [`ParsingError::MissingOutputFile`] when a
/// redirection operator has no filename after it.
pub fn classify(argv: Vec<String>) -> Result<CommandLine, ParsingError> {
    let (argv, background) = take_background(argv);
    let (argv, output_target) = take_output_target(argv)?;
    let pipe_split = find_pipe(&argv);

    Ok(CommandLine {
        argv,
        dispatch: Dispatch {
            background,
            output_target,
            pipe_split,
        },
    })
}

fn take_background(mut argv: Vec<String>) -> (Vec<String>, bool) {
    if argv.last().is_some_and(|word| word == BACKGROUND) {
        argv.pop();
        (argv, true)
    } else {
        (argv, false)
    }
}

fn take_output_target(argv: Vec<String>) -> Result<(Vec<String>, Option<String>), ParsingError> {
    let Some(index) = argv
        .iter()
        .position(|word| word == REDIRECT_OUT || word == REDIRECT_APPEND)
    else {
        return Ok((argv, None));
    };

    let target = argv
        .get(index + 1)
        .cloned()
        .ok_or(ParsingError::MissingOutputFile)?;

    let rest = argv
        .into_iter()
        .enumerate()
        .filter(|(i, _)| *i != index && *i != index + 1)
        .map(|(_, word)| word)
        .collect();

    Ok((rest, Some(target)))
}

fn find_pipe(argv: &[String]) -> Option<usize> {
    argv.iter().position(|word| word == PIPE)
}
