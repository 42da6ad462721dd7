//! Machine definitions: the raw JSON configuration record and the validated, immutable
//! `MachineDefinition` the engine runs against.

use crate::analyzer::{analyze, unreachable_states};
use crate::table::TransitionTable;
use crate::types::{Direction, MachineError, Transition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The configuration record as it appears on disk.
///
/// Required fields are optional here so that every missing one can be reported by name
/// instead of failing on the first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineConfig {
    pub name: Option<String>,
    pub states: Option<Vec<String>>,
    pub input_alphabet: Option<Vec<char>>,
    pub tape_alphabet: Option<Vec<char>>,
    pub initial_state: Option<String>,
    pub accept_states: Option<Vec<String>>,
    /// Defaults to `_`.
    pub blank_symbol: Option<char>,
    /// Defaults to 1.
    pub num_tapes: Option<usize>,
    pub transitions: Option<Vec<TransitionConfig>>,
}

/// One transition record. Single-tape machines may use the scalar `read_symbol`,
/// `write_symbol` and `move` fields; multi-tape machines use the list forms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionConfig {
    pub current_state: Option<String>,
    pub read_symbol: Option<char>,
    pub read_symbols: Option<Vec<char>>,
    pub next_state: Option<String>,
    pub write_symbol: Option<char>,
    pub write_symbols: Option<Vec<char>>,
    #[serde(rename = "move")]
    pub movement: Option<Direction>,
    pub movements: Option<Vec<Direction>>,
}

impl TransitionConfig {
    /// Builds a single-tape record.
    pub fn single(
        current_state: &str,
        read: char,
        next_state: &str,
        write: char,
        movement: Direction,
    ) -> Self {
        Self {
            current_state: Some(current_state.to_string()),
            read_symbol: Some(read),
            next_state: Some(next_state.to_string()),
            write_symbol: Some(write),
            movement: Some(movement),
            ..Self::default()
        }
    }

    /// Builds a multi-tape record.
    pub fn multi(
        current_state: &str,
        read: &[char],
        next_state: &str,
        write: &[char],
        movements: &[Direction],
    ) -> Self {
        Self {
            current_state: Some(current_state.to_string()),
            read_symbols: Some(read.to_vec()),
            next_state: Some(next_state.to_string()),
            write_symbols: Some(write.to_vec()),
            movements: Some(movements.to_vec()),
            ..Self::default()
        }
    }
}

/// An immutable, validated description of one automaton.
///
/// Definitions hold no run-time state; any number of engines may borrow one at once.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineDefinition {
    name: String,
    states: BTreeSet<String>,
    input_alphabet: BTreeSet<char>,
    tape_alphabet: BTreeSet<char>,
    initial_state: String,
    accept_states: BTreeSet<String>,
    blank: char,
    tapes: usize,
    table: TransitionTable,
}

impl MachineDefinition {
    /// Validates `config` and builds the definition.
    ///
    /// All checks run eagerly: missing fields, unknown states, symbols outside the tape
    /// alphabet, tuple arity and duplicate keys are reported here, never at lookup time.
    pub fn from_config(config: MachineConfig) -> Result<Self, MachineError> {
        let checked = analyze(&config)?;

        let mut table = TransitionTable::new();
        for (state, transition) in checked.transitions {
            table.insert(state, transition)?;
        }

        let definition = Self {
            name: config.name.unwrap_or_else(|| "unnamed".to_string()),
            states: checked.states,
            input_alphabet: checked.input_alphabet,
            tape_alphabet: checked.tape_alphabet,
            initial_state: checked.initial_state,
            accept_states: checked.accept_states,
            blank: checked.blank,
            tapes: checked.tapes,
            table,
        };

        let unreachable = unreachable_states(&definition);
        if !unreachable.is_empty() {
            log::warn!(
                "machine '{}' has unreachable states: {:?}",
                definition.name,
                unreachable
            );
        }

        Ok(definition)
    }

    /// Parses a JSON document and validates it.
    pub fn from_json(content: &str) -> Result<Self, MachineError> {
        let config: MachineConfig = serde_json::from_str(content)?;
        Self::from_config(config)
    }

    /// Looks up the rule for `state` reading `symbols`. A pure function of its arguments.
    pub fn find_transition(&self, state: &str, symbols: &[char]) -> Option<&Transition> {
        self.table.find(state, symbols)
    }

    /// `true` if `state` is an accept state.
    pub fn is_accept_state(&self, state: &str) -> bool {
        self.accept_states.contains(state)
    }

    /// Returns the machine name, `unnamed` if the configuration had none.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Returns the declared states.
    pub fn states(&self) -> &BTreeSet<String> {
        &self.states
    }

    /// Returns the symbols an input may contain.
    pub fn input_alphabet(&self) -> &BTreeSet<char> {
        &self.input_alphabet
    }

    /// Returns every symbol that may appear on a tape, blank included.
    pub fn tape_alphabet(&self) -> &BTreeSet<char> {
        &self.tape_alphabet
    }

    /// Returns the state every run starts in.
    pub fn initial_state(&self) -> &str {
        &self.initial_state
    }

    /// Returns the accept states.
    pub fn accept_states(&self) -> &BTreeSet<String> {
        &self.accept_states
    }

    /// Returns the blank symbol.
    pub fn blank(&self) -> char {
        self.blank
    }

    /// Number of tapes. 1 for ordinary machines.
    pub fn tapes(&self) -> usize {
        self.tapes
    }

    /// Returns the transition table.
    pub fn table(&self) -> &TransitionTable {
        &self.table
    }
}

impl TryFrom<MachineConfig> for MachineDefinition {
    type Error = MachineError;

    fn try_from(config: MachineConfig) -> Result<Self, Self::Error> {
        Self::from_config(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REWRITE: &str = r#"{
        "name": "rewrite",
        "states": ["q0", "q_accept"],
        "input_alphabet": ["A"],
        "tape_alphabet": ["A", "B", "_"],
        "initial_state": "q0",
        "accept_states": ["q_accept"],
        "blank_symbol": "_",
        "description": "ignored",
        "transitions": [
            {"current_state": "q0", "read_symbol": "A", "next_state": "q0", "write_symbol": "B", "move": "R"},
            {"current_state": "q0", "read_symbol": "_", "next_state": "q_accept", "write_symbol": "_", "move": "N", "comment": "done"}
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let definition = MachineDefinition::from_json(REWRITE).unwrap();

        assert_eq!(definition.name(), "rewrite");
        assert_eq!(definition.initial_state(), "q0");
        assert_eq!(definition.blank(), '_');
        assert_eq!(definition.tapes(), 1);
        assert_eq!(definition.table().len(), 2);
        assert!(definition.is_accept_state("q_accept"));
        assert!(!definition.is_accept_state("q0"));

        let transition = definition.find_transition("q0", &['A']).unwrap();
        assert_eq!(transition.write, vec!['B']);
        assert_eq!(transition.directions, vec![Direction::Right]);
        assert!(definition.find_transition("q0", &['B']).is_none());
    }

    #[test]
    fn test_defaults_for_blank_and_tape_count() {
        let json = REWRITE.replace("\"blank_symbol\": \"_\",", "");
        let definition = MachineDefinition::from_json(&json).unwrap();

        assert_eq!(definition.blank(), '_');
        assert_eq!(definition.tapes(), 1);
    }

    #[test]
    fn test_missing_fields_are_named() {
        let result = MachineDefinition::from_json(r#"{"states": ["q0"], "initial_state": "q0"}"#);

        match result {
            Err(MachineError::MissingFields(fields)) => {
                assert_eq!(
                    fields,
                    vec![
                        "input_alphabet",
                        "tape_alphabet",
                        "accept_states",
                        "transitions"
                    ]
                );
            }
            other => panic!("Expected MissingFields, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_rule_is_config_error() {
        let json = REWRITE.replace(
            r#""transitions": ["#,
            r#""transitions": [
            {"current_state": "q0", "read_symbol": "A", "next_state": "q_accept", "write_symbol": "A", "move": "N"},"#,
        );

        let result = MachineDefinition::from_json(&json);
        assert!(matches!(
            result,
            Err(MachineError::DuplicateTransition { ref state, .. }) if state == "q0"
        ));
    }

    #[test]
    fn test_invalid_json() {
        let result = MachineDefinition::from_json("{ not json");
        assert!(matches!(result, Err(MachineError::JsonError(_))));

        // Symbols are single characters.
        let result = MachineDefinition::from_json(&REWRITE.replace(r#"["A"]"#, r#"["AB"]"#));
        assert!(matches!(result, Err(MachineError::JsonError(_))));
    }

    #[test]
    fn test_multi_tape_config() {
        let config = MachineConfig {
            name: Some("copy".into()),
            states: Some(vec!["copy".into(), "done".into()]),
            input_alphabet: Some(vec!['a', 'b']),
            tape_alphabet: Some(vec!['a', 'b', '_']),
            initial_state: Some("copy".into()),
            accept_states: Some(vec!["done".into()]),
            blank_symbol: None,
            num_tapes: Some(2),
            transitions: Some(vec![
                TransitionConfig::multi(
                    "copy",
                    &['a', '_'],
                    "copy",
                    &['a', 'a'],
                    &[Direction::Right, Direction::Right],
                ),
                TransitionConfig::multi(
                    "copy",
                    &['_', '_'],
                    "done",
                    &['_', '_'],
                    &[Direction::Stay, Direction::Stay],
                ),
            ]),
        };

        let definition = MachineDefinition::try_from(config).unwrap();
        assert_eq!(definition.tapes(), 2);
        assert!(definition.find_transition("copy", &['a', '_']).is_some());
        assert!(definition.find_transition("copy", &['a']).is_none());
    }
}
