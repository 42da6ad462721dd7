//! This module parses cipher inputs with the `pest` crate: the `key#message` form the
//! pipeline accepts, and the key itself (a letter or a numeral 1-27).

use crate::types::MachineError;
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser, Position,
};
use pest_derive::Parser;
use std::fmt;
use std::str::FromStr;

/// Largest numeral accepted as a key.
pub const MAX_NUMERAL_KEY: u8 = 27;

/// Derives a `Parser` for the cipher input grammar defined in `grammar.pest`.
#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct CipherInputParser;

/// A Caesar key: a letter (A=0 .. Z=25) or a numeral 1-27, reduced mod 26 by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Always stored uppercase.
    Letter(char),
    Numeral(u8),
}

impl Key {
    /// Parses a key. Surrounding whitespace is ignored; letters may be lowercase.
    ///
    /// # Returns
    ///
    /// * `Ok(Key)` for a single ASCII letter or a numeral 1-27.
    /// * `Err(MachineError::InvalidKey)` for anything else, including `0`, `28` and `07`.
    pub fn parse(raw: &str) -> Result<Self, MachineError> {
        let raw = raw.trim();
        let invalid = || MachineError::InvalidKey(raw.to_string());

        let pair = CipherInputParser::parse(Rule::key_spec, raw)
            .map_err(|_| invalid())?
            .next()
            .and_then(|root| root.into_inner().next())
            .ok_or_else(invalid)?;

        match pair.as_rule() {
            Rule::letter_key => pair
                .as_str()
                .chars()
                .next()
                .map(|c| Key::Letter(c.to_ascii_uppercase()))
                .ok_or_else(invalid),
            Rule::numeral_key => match pair.as_str().parse::<u8>() {
                Ok(n) if n <= MAX_NUMERAL_KEY => Ok(Key::Numeral(n)),
                _ => Err(invalid()),
            },
            _ => Err(invalid()),
        }
    }
}

impl FromStr for Key {
    type Err = MachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::parse(s)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Letter(c) => write!(f, "{c}"),
            Key::Numeral(n) => write!(f, "{n}"),
        }
    }
}

/// A parsed `key#message` input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherInput {
    pub key: Key,
    /// The text after the first `#`, trimmed.
    pub message: String,
}

/// Parses a `key#message` string.
///
/// The first `#` separates the key from the message. Whitespace around the key and the
/// message is trimmed; whitespace inside the message is kept.
///
/// # Returns
///
/// * `Ok(CipherInput)` if the input has a separator and a valid key.
/// * `Err(MachineError::ParseError)` if there is no `#`.
/// * `Err(MachineError::InvalidKey)` if the key is malformed or out of range.
pub fn parse_input(input: &str) -> Result<CipherInput, MachineError> {
    let root = CipherInputParser::parse(Rule::input, input)
        .map_err(|e| MachineError::ParseError(Box::new(e)))?
        .next()
        .ok_or_else(|| parse_error("Empty input", input))?;

    let mut key = None;
    let mut message = None;

    for pair in root.into_inner() {
        match pair.as_rule() {
            Rule::key => key = Some(Key::parse(pair.as_str())?),
            Rule::message => message = Some(parse_message(pair)),
            _ => {} // SOI / EOI
        }
    }

    match (key, message) {
        (Some(key), Some(message)) => Ok(CipherInput { key, message }),
        _ => Err(parse_error("Expected `key#message`", input)),
    }
}

impl FromStr for CipherInput {
    type Err = MachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_input(s)
    }
}

fn parse_message(pair: Pair<Rule>) -> String {
    pair.as_str().trim().to_string()
}

/// Creates a `MachineError::ParseError` positioned at the start of `input`.
fn parse_error(msg: &str, input: &str) -> MachineError {
    MachineError::ParseError(Box::new(Error::new_from_pos(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        Position::from_start(input),
    )))
}
