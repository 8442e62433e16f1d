//! Lexical analysis of a single command line.
//!
//! The grammar is deliberately flat: a line is a run of words separated by the
//! space character. There is no quoting, escaping or substitution, so control
//! tokens such as `|` or `>` are only recognised when they stand alone as a word.

/// The only delimiter recognised between words.
const DELIMITER: char = ' ';

/// Splits a raw line into its words.
///
/// Consecutive delimiters collapse, so no returned word is ever empty. Tabs and
/// other whitespace are kept inside words.
///
/// # Arguments
/// * `line` - The line as read from the input, without its trailing newline.
///
/// # Returns
/// The words of `line` in order; an empty vector for an empty or blank line.
pub fn split_into_tokens(line: &str) -> Vec<String> {
    line.split(DELIMITER)
        .filter(|word| !word.is_empty())
        .map(str::to_owned)
        .collect()
}
