use crate::error::ShellError;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{BufRead, Write};

/// Supplier of command lines for the interpreter loop.
pub trait LineSource {
    /// Shows the prompt and reads one line, without its line terminator.
    ///
    /// Returns `Ok(None)` at end of input.
    fn next_line(&mut self) -> Result<Option<String>, ShellError>;
}

/// Interactive terminal input backed by [`rustyline`].
///
/// Lines are not added to the editor history. Ctrl-C at the prompt discards
/// the line being typed and reads as an empty line.
pub struct EditorSource {
    editor: DefaultEditor,
    prompt: String,
}

impl EditorSource {
    pub fn new(prompt: impl Into<String>) -> Result<Self, ShellError> {
        Ok(Self {
            editor: DefaultEditor::new()?,
            prompt: prompt.into(),
        })
    }
}

impl LineSource for EditorSource {
    fn next_line(&mut self) -> Result<Option<String>, ShellError> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Line input from any buffered reader, with the prompt written to `prompt_out`.
///
/// Used when standard input is not a terminal. Bytes that are not valid UTF-8
/// are replaced rather than rejected.
pub struct ReaderSource<R, W> {
    reader: R,
    prompt_out: W,
    prompt: String,
}

impl<R: BufRead, W: Write> ReaderSource<R, W> {
    pub fn new(reader: R, prompt_out: W, prompt: impl Into<String>) -> Self {
        Self {
            reader,
            prompt_out,
            prompt: prompt.into(),
        }
    }
}

impl<R: BufRead, W: Write> LineSource for ReaderSource<R, W> {
    fn next_line(&mut self) -> Result<Option<String>, ShellError> {
        write!(self.prompt_out, "{}", self.prompt)?;
        self.prompt_out.flush()?;

        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }
}
