//! This module defines the core data structures and types used throughout the engine and the
//! cipher pipeline, including transitions, step and run outcomes, and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::Rule;

/// The default blank symbol used on the Turing Machine tape.
pub const DEFAULT_BLANK_SYMBOL: char = '_';
/// The symbol used for unary arithmetic. `n` marks represent the value `n`.
pub const MARK: char = '|';
/// The maximum number of steps a single run may execute by default.
pub const MAX_EXECUTION_STEPS: usize = 100_000;
/// Hard ceiling on the number of subtractions performed by the mod-26 loop.
pub const MAX_MOD26_ITERATIONS: usize = 2000;
/// Size of the alphabet the cipher works on.
pub const ALPHABET_SIZE: usize = 26;

/// Represents a single transition rule for a Turing Machine.
///
/// A transition defines how the machine behaves when it is in a certain state
/// and reads specific symbols from its tapes. Single-tape machines use vectors of length 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// A vector of characters to be read from each tape.
    pub read: Vec<char>,
    /// A vector of characters to be written to each tape.
    pub write: Vec<char>,
    /// A vector of directions for each tape's head to move after the transition.
    pub directions: Vec<Direction>,
    /// The next state the machine transitions to.
    pub next_state: String,
}

/// Represents the possible directions a Turing Machine head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    #[serde(rename = "L", alias = "Left")]
    Left,
    /// Move the head one position to the right.
    #[serde(rename = "R", alias = "Right")]
    Right,
    /// Keep the head in the same position.
    #[serde(rename = "N", alias = "Stay", alias = "S")]
    Stay,
}

/// Represents the outcome of a single `step()` call.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A transition was applied and the machine may continue.
    Continue,
    /// No transition was applied.
    Halt(Halt),
}

impl Step {
    /// `true` when a transition was applied.
    pub fn advanced(&self) -> bool {
        matches!(self, Step::Continue)
    }
}

/// Why a step did not advance the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Halt {
    /// The machine had already halted before this call.
    Halted,
    /// No rule matches the current state and symbols.
    Rejected(Rejection),
}

/// Details of a rejection outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// The state the machine halted in.
    pub state: String,
    /// The symbols under the heads that no rule matched.
    pub symbols: Vec<char>,
}

/// How a run ended. Rejection and exhaustion are ordinary results, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// An accept state was reached.
    Accepted,
    /// The machine stopped in a non-accepting state because no rule matched.
    Rejected,
    /// The step budget ran out before the machine halted.
    Incomplete,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Accepted => write!(f, "accepted"),
            Outcome::Rejected => write!(f, "rejected"),
            Outcome::Incomplete => write!(f, "step budget exhausted"),
        }
    }
}

/// Controls whether executions record per-step snapshots.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceMode {
    /// No snapshots are recorded.
    #[default]
    Off,
    /// A snapshot is recorded for the initial configuration and after every step.
    Record,
}

/// One automaton run inside the cipher pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// A letter to its alphabet index in marks.
    LetterToMarks,
    /// Marks to the letter at that index.
    MarksToLetter,
    /// A decimal numeral 1-27 to the letter of its value mod 26.
    NumeralToLetter,
    /// `a+b` to `a + b` marks.
    Add,
    /// `a-b` to `a - b` marks, rejecting when `a < b`.
    Subtract,
}

impl Stage {
    /// Name of the library program this stage runs.
    pub fn program(&self) -> &'static str {
        match self {
            Stage::LetterToMarks => "letter_to_number",
            Stage::MarksToLetter => "number_to_letter",
            Stage::NumeralToLetter => "numeral_to_letter",
            Stage::Add => "add_unary",
            Stage::Subtract => "subtract_unary",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::LetterToMarks => "letter->marks",
            Stage::MarksToLetter => "marks->letter",
            Stage::NumeralToLetter => "numeral->letter",
            Stage::Add => "add",
            Stage::Subtract => "subtract",
        };
        f.write_str(label)
    }
}

/// Where a pipeline stage ran, reported with its errors and used to label its trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Context {
    /// A single pipeline operation called on its own.
    Standalone,
    /// Turning the cipher key into shift marks.
    Key,
    /// Processing the message character at this index.
    Char(usize),
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Standalone => Ok(()),
            Context::Key => write!(f, " while preparing the key"),
            Context::Char(i) => write!(f, " at character {i}"),
        }
    }
}

/// Represents the errors that can occur while building machines or running the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineError {
    /// Required configuration fields are absent.
    #[error("Missing configuration fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
    /// A configuration field is present but invalid.
    #[error("Invalid configuration field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },
    /// Two rules share the same `(state, symbols)` key.
    #[error("Duplicate transition for state {state} and symbols {symbols:?}")]
    DuplicateTransition { state: String, symbols: Vec<char> },
    /// The `key#message` input could not be parsed.
    #[error("Input parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// The cipher key is neither a single letter nor a numeral 1-27.
    #[error("Invalid key {0:?}: expected a letter A-Z or a number 1-27")]
    InvalidKey(String),
    /// A pipeline stage did not accept.
    ///
    /// `output` is an excerpt of the final tape, see `tape_excerpt`.
    #[error("Stage {stage}{context} {outcome} (tape: {output:?})")]
    Execution {
        stage: Stage,
        context: Context,
        outcome: Outcome,
        output: String,
    },
    /// A stage accepted but its tape does not hold the expected value.
    #[error("Stage {stage}{context} produced no usable output (tape: {output:?})")]
    UnexpectedOutput {
        stage: Stage,
        context: Context,
        output: String,
    },
    /// No machine with this name is registered.
    #[error("Machine '{0}' not found")]
    UnknownMachine(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
    /// A machine definition is not valid JSON.
    #[error("JSON error: {0}")]
    JsonError(String),
}

/// Longest tape rendered verbatim in an error.
pub const MAX_TAPE_EXCERPT: usize = 64;

/// Shortens a tape for error messages, keeping its head and tail.
///
/// `____||||...(1940 cells)...||-|` instead of the full tape.
pub fn tape_excerpt(tape: &str) -> String {
    let len = tape.chars().count();
    if len <= MAX_TAPE_EXCERPT {
        return tape.to_string();
    }

    let head: String = tape.chars().take(MAX_TAPE_EXCERPT / 2).collect();
    let tail: String = tape.chars().skip(len - MAX_TAPE_EXCERPT / 4).collect();
    let skipped = len - MAX_TAPE_EXCERPT / 2 - MAX_TAPE_EXCERPT / 4;

    format!("{head}...({skipped} cells)...{tail}")
}

impl MachineError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        MachineError::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for MachineError {
    fn from(error: serde_json::Error) -> Self {
        MachineError::JsonError(error.to_string())
    }
}
