//! Step-by-step recordings of machine runs, for consumers that animate or inspect executions.
//! A trace is a projection of engine state; recording never changes how a run behaves.

use crate::types::Transition;
use serde::{Deserialize, Serialize};

/// The machine configuration after one step (or before the first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Number of steps executed when the snapshot was taken.
    pub step: usize,
    /// Contents of every tape, blanks included.
    pub tapes: Vec<String>,
    /// Head position on every tape.
    pub heads: Vec<usize>,
    /// Current state.
    pub state: String,
    /// The transition that produced this configuration. `None` for the initial snapshot.
    pub transition: Option<Transition>,
    /// Whether `state` is an accept state.
    pub accepting: bool,
}

/// An ordered list of snapshots for one run, labelled with the stage that produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// The stage that produced the run, e.g. `[3] add` or `key: letter->marks`.
    pub label: String,
    /// Snapshots in step order, starting with the initial configuration.
    pub snapshots: Vec<Snapshot>,
}

impl Trace {
    /// Creates an empty trace.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            snapshots: Vec::new(),
        }
    }

    /// Appends a snapshot.
    pub fn record(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    /// Returns the number of snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// The final recorded configuration.
    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Number of transitions applied, i.e. snapshots minus the initial one.
    pub fn transitions(&self) -> usize {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.transition.is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    fn snapshot(step: usize, transition: Option<Transition>) -> Snapshot {
        Snapshot {
            step,
            tapes: vec!["AB".to_string()],
            heads: vec![step],
            state: "q0".to_string(),
            transition,
            accepting: false,
        }
    }

    #[test]
    fn test_record_and_count() {
        let mut trace = Trace::new("rewrite");
        assert!(trace.is_empty());

        trace.record(snapshot(0, None));
        trace.record(snapshot(
            1,
            Some(Transition {
                read: vec!['A'],
                write: vec!['B'],
                directions: vec![Direction::Right],
                next_state: "q0".to_string(),
            }),
        ));

        assert_eq!(trace.label, "rewrite");
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.transitions(), 1);
        assert_eq!(trace.last().map(|s| s.step), Some(1));
    }

    #[test]
    fn test_trace_serializes() {
        let mut trace = Trace::new("stage");
        trace.record(snapshot(0, None));

        let json = serde_json::to_string(&trace).unwrap();
        let restored: Trace = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, trace);
    }
}
