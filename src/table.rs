//! The transition table: an exact-match lookup from `(state, symbols)` to one `Transition`.

use crate::types::{MachineError, Transition};
use std::collections::HashMap;

/// Maps a state and the tuple of symbols under the heads to at most one transition.
///
/// Rules are grouped by source state so a lookup borrows `&str` and `&[char]`
/// without building an owned key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionTable {
    rules: HashMap<String, HashMap<Vec<char>, Transition>>,
    len: usize,
}

impl TransitionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a rule for `state`, keyed by `transition.read`.
    ///
    /// A second rule for the same key is rejected: machines are deterministic.
    pub fn insert(&mut self, state: String, transition: Transition) -> Result<(), MachineError> {
        let by_symbols = self.rules.entry(state.clone()).or_default();

        if by_symbols.contains_key(&transition.read) {
            return Err(MachineError::DuplicateTransition {
                state,
                symbols: transition.read,
            });
        }

        by_symbols.insert(transition.read.clone(), transition);
        self.len += 1;

        Ok(())
    }

    /// Finds the transition for `state` reading `symbols`. `None` means reject.
    pub fn find(&self, state: &str, symbols: &[char]) -> Option<&Transition> {
        self.rules.get(state)?.get(symbols)
    }

    /// Iterates over every `(source state, transition)` pair.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Transition)> {
        self.rules.iter().flat_map(|(state, by_symbols)| {
            by_symbols
                .values()
                .map(move |transition| (state.as_str(), transition))
        })
    }

    /// Transitions leaving `state`.
    pub fn outgoing(&self, state: &str) -> impl Iterator<Item = &Transition> {
        self.rules
            .get(state)
            .into_iter()
            .flat_map(|by_symbols| by_symbols.values())
    }

    /// Returns the number of rules in the table.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if the table has no rules.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
