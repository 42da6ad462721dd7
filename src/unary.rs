//! Unary "mark" notation: the value `n` is written as `n` repetitions of `|`.
//!
//! These helpers only build inputs and read outputs of machine runs.
//! They never do the arithmetic themselves.

use crate::types::MARK;

/// `n` marks.
pub fn marks(n: usize) -> String {
    std::iter::repeat(MARK).take(n).collect()
}

/// Number of marks in `tape`, ignoring every other symbol.
pub fn count_marks(tape: &str) -> usize {
    tape.chars().filter(|&c| c == MARK).count()
}

/// Keeps only the marks of a tape, dropping blanks and separators.
pub fn extract_marks(tape: &str) -> String {
    tape.chars().filter(|&c| c == MARK).collect()
}

/// The first letter A-Z on a tape.
pub fn first_letter(tape: &str) -> Option<char> {
    tape.chars().find(char::is_ascii_uppercase)
}
