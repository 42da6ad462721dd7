//! This module defines the `TuringMachine` struct, the run-time instance of a
//! `MachineDefinition`. It owns the tapes, head positions, current state and step counter,
//! and executes transitions one step at a time or until the run accepts, rejects,
//! or exhausts its step budget.
//!
//! Tapes grow on demand in both directions. Moving right past the end appends a blank;
//! moving left from cell 0 inserts a blank at the front and keeps the head at 0, so a
//! head never reads left of the tape's logical start and never re-reads a clamped cell.

use crate::definition::MachineDefinition;
use crate::trace::{Snapshot, Trace};
use crate::types::{
    Direction, Halt, MachineError, Outcome, Rejection, Step, TraceMode, Transition,
};

/// A single run of a Turing Machine.
///
/// The engine borrows its definition immutably and owns everything else. It is meant to be
/// used by one caller at a time and discarded once its result has been read.
#[derive(Debug, Clone)]
pub struct TuringMachine<'a> {
    definition: &'a MachineDefinition,
    state: String,
    tapes: Vec<Vec<char>>,
    heads: Vec<usize>,
    step_count: usize,
    halted: bool,
}

/// The result of `TuringMachine::execute`.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Tape 0 with trailing blanks removed. Leading blanks are kept.
    pub output: String,
    /// How the run ended.
    pub outcome: Outcome,
    /// Number of steps executed.
    pub steps: usize,
    /// Present when the run was executed with `TraceMode::Record`.
    pub trace: Option<Trace>,
}

impl<'a> TuringMachine<'a> {
    /// Creates a machine for `definition`, initialized with an empty input.
    pub fn new(definition: &'a MachineDefinition) -> Self {
        let mut machine = Self {
            definition,
            state: definition.initial_state().to_string(),
            tapes: Vec::new(),
            heads: Vec::new(),
            step_count: 0,
            halted: false,
        };
        machine.initialize("");
        machine
    }

    /// Resets the run: tape 0 holds `input`, other tapes are blank, every head is at 0,
    /// the state is the initial state and the step counter is 0.
    pub fn initialize(&mut self, input: &str) {
        let tapes = self.definition.tapes();

        self.tapes = vec![Vec::new(); tapes];
        self.tapes[0] = input.chars().collect();
        self.heads = vec![0; tapes];
        self.state = self.definition.initial_state().to_string();
        self.step_count = 0;
        self.halted = false;
    }

    /// Returns the symbols under every head, extending tapes with blanks where a head
    /// sits past the end. Never moves a head or changes the state.
    ///
    /// | a | b | c | tape 1
    /// | d | e |     tape 2
    ///   0   1   2   index
    ///
    /// heads [0, 2] will return ['a', '_'] and grow tape 2 to three cells.
    pub fn current_symbols(&mut self) -> Vec<char> {
        let blank = self.definition.blank();

        self.tapes
            .iter_mut()
            .zip(&self.heads)
            .map(|(tape, &head)| {
                if head >= tape.len() {
                    tape.resize(head + 1, blank);
                }
                tape[head]
            })
            .collect()
    }

    /// Executes a single step.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a transition was applied.
    /// * `Step::Halt(Halt::Halted)` if the machine had already halted.
    /// * `Step::Halt(Halt::Rejected(_))` if no rule matches; the machine halts and no tape,
    ///   head or state is modified.
    pub fn step(&mut self) -> Step {
        match self.advance() {
            Ok(_) => Step::Continue,
            Err(halt) => Step::Halt(halt),
        }
    }

    /// Applies the matching transition to every tape at once and returns it.
    fn advance(&mut self) -> Result<&'a Transition, Halt> {
        if self.halted {
            return Err(Halt::Halted);
        }

        let definition = self.definition;
        let symbols = self.current_symbols();

        let Some(transition) = definition.find_transition(&self.state, &symbols) else {
            log::trace!(
                "{}: no rule for ({}, {:?}), rejecting",
                definition.name(),
                self.state,
                symbols
            );
            self.halted = true;
            return Err(Halt::Rejected(Rejection {
                state: self.state.clone(),
                symbols,
            }));
        };

        log::trace!(
            "{}: step {} ({}, {:?}) -> ({}, {:?}, {:?})",
            definition.name(),
            self.step_count,
            self.state,
            symbols,
            transition.next_state,
            transition.write,
            transition.directions
        );

        let blank = definition.blank();
        for (i, tape) in self.tapes.iter_mut().enumerate() {
            tape[self.heads[i]] = transition.write[i];

            match transition.directions[i] {
                Direction::Left => {
                    if self.heads[i] == 0 {
                        // Extend tape to the left
                        tape.insert(0, blank);
                    } else {
                        self.heads[i] -= 1;
                    }
                }
                Direction::Right => {
                    self.heads[i] += 1;
                    if self.heads[i] >= tape.len() {
                        tape.push(blank);
                    }
                }
                Direction::Stay => {}
            }
        }

        self.state.clone_from(&transition.next_state);
        self.step_count += 1;

        Ok(transition)
    }

    /// `true` iff the current state is an accept state.
    pub fn is_accepting(&self) -> bool {
        self.definition.is_accept_state(&self.state)
    }

    /// Runs the machine on `input` until it accepts, rejects or executes `max_steps` steps,
    /// and returns tape 0 with trailing blanks trimmed.
    ///
    /// Exhausting the budget is not an error; use `outcome()` to tell the three endings apart.
    pub fn run(&mut self, input: &str, max_steps: usize) -> String {
        self.execute(input, max_steps, TraceMode::Off).output
    }

    /// Like `run`, but reports the outcome and step count, and records a trace when asked.
    pub fn execute(&mut self, input: &str, max_steps: usize, mode: TraceMode) -> Execution {
        self.initialize(input);

        let mut trace = match mode {
            TraceMode::Record => {
                let mut trace = Trace::new(self.definition.name());
                trace.record(self.snapshot(None));
                Some(trace)
            }
            TraceMode::Off => None,
        };

        loop {
            if self.is_accepting() {
                self.halted = true;
                break;
            }

            if self.step_count >= max_steps {
                break;
            }

            match self.advance() {
                Ok(transition) => {
                    if let Some(trace) = trace.as_mut() {
                        trace.record(self.snapshot(Some(transition)));
                    }
                }
                Err(_) => break,
            }
        }

        let outcome = self.outcome();
        match outcome {
            Outcome::Incomplete => log::warn!(
                "{}: step budget of {} exhausted in state {}",
                self.definition.name(),
                max_steps,
                self.state
            ),
            _ => log::debug!(
                "{}: {} after {} steps in state {}",
                self.definition.name(),
                outcome,
                self.step_count,
                self.state
            ),
        }

        Execution {
            output: self.output(),
            outcome,
            steps: self.step_count,
            trace,
        }
    }

    /// How the run currently stands: accepted, rejected (halted elsewhere) or incomplete.
    pub fn outcome(&self) -> Outcome {
        if self.is_accepting() {
            Outcome::Accepted
        } else if self.halted {
            Outcome::Rejected
        } else {
            Outcome::Incomplete
        }
    }

    /// Tape 0 as a string, trailing blanks trimmed.
    pub fn output(&self) -> String {
        let blank = self.definition.blank();
        let tape: String = self.tapes[0].iter().collect();
        tape.trim_end_matches(blank).to_string()
    }

    /// Captures the current configuration.
    pub fn snapshot(&self, transition: Option<&Transition>) -> Snapshot {
        Snapshot {
            step: self.step_count,
            tapes: self.tape_contents(),
            heads: self.heads.clone(),
            state: self.state.clone(),
            transition: transition.cloned(),
            accepting: self.is_accepting(),
        }
    }

    /// Returns the current state of the Turing Machine.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the total number of steps executed since the last `initialize`.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// `true` once the run has accepted or rejected. Further steps are no-ops.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Returns a slice of the machine's tapes.
    pub fn tapes(&self) -> &[Vec<char>] {
        &self.tapes
    }

    /// Every tape rendered as a string, blanks included.
    pub fn tape_contents(&self) -> Vec<String> {
        self.tapes.iter().map(|tape| tape.iter().collect()).collect()
    }

    /// Returns a slice of the machine's head positions for all tapes.
    pub fn heads(&self) -> &[usize] {
        &self.heads
    }

    /// Returns the definition this machine runs.
    pub fn definition(&self) -> &'a MachineDefinition {
        self.definition
    }

    /// Replaces the content of one tape without touching heads, state or counters.
    ///
    /// Useful for seeding auxiliary tapes of a multi-tape machine after `initialize`.
    pub fn set_tape_content(
        &mut self,
        tape_index: usize,
        content: &str,
    ) -> Result<(), MachineError> {
        let tape = self.tapes.get_mut(tape_index).ok_or_else(|| {
            MachineError::invalid(
                "tape_index",
                format!(
                    "{} is out of bounds (machine has {} tapes)",
                    tape_index,
                    self.definition.tapes()
                ),
            )
        })?;

        *tape = content.chars().collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{MachineConfig, TransitionConfig};
    use crate::types::Direction::{Left, Right, Stay};

    /// Rewrites every `A` to `B` moving right and accepts on the first blank.
    fn rewrite_machine() -> MachineDefinition {
        MachineDefinition::from_config(MachineConfig {
            name: Some("rewrite".into()),
            states: Some(vec!["q0".into(), "q_accept".into()]),
            input_alphabet: Some(vec!['A']),
            tape_alphabet: Some(vec!['A', 'B', '_']),
            initial_state: Some("q0".into()),
            accept_states: Some(vec!["q_accept".into()]),
            blank_symbol: Some('_'),
            num_tapes: None,
            transitions: Some(vec![
                TransitionConfig::single("q0", 'A', "q0", 'B', Right),
                TransitionConfig::single("q0", '_', "q_accept", '_', Stay),
            ]),
        })
        .unwrap()
    }

    /// Copies tape 0 onto tape 1.
    fn copy_machine() -> MachineDefinition {
        let mut transitions = Vec::new();
        for symbol in ['a', 'b'] {
            transitions.push(TransitionConfig::multi(
                "copy",
                &[symbol, '-'],
                "copy",
                &[symbol, symbol],
                &[Right, Right],
            ));
        }
        transitions.push(TransitionConfig::multi(
            "copy",
            &['-', '-'],
            "done",
            &['-', '-'],
            &[Stay, Stay],
        ));

        MachineDefinition::from_config(MachineConfig {
            name: Some("copy".into()),
            states: Some(vec!["copy".into(), "done".into()]),
            input_alphabet: Some(vec!['a', 'b']),
            tape_alphabet: Some(vec!['a', 'b', '-']),
            initial_state: Some("copy".into()),
            accept_states: Some(vec!["done".into()]),
            blank_symbol: Some('-'),
            num_tapes: Some(2),
            transitions: Some(transitions),
        })
        .unwrap()
    }

    /// Walks left from cell 0, marks the new cell, and accepts.
    fn left_walker() -> MachineDefinition {
        MachineDefinition::from_config(MachineConfig {
            name: Some("left".into()),
            states: Some(vec!["q0".into(), "q1".into(), "q_accept".into()]),
            input_alphabet: Some(vec!['x']),
            tape_alphabet: Some(vec!['x', 'y', '_']),
            initial_state: Some("q0".into()),
            accept_states: Some(vec!["q_accept".into()]),
            blank_symbol: None,
            num_tapes: None,
            transitions: Some(vec![
                TransitionConfig::single("q0", 'x', "q1", 'x', Left),
                TransitionConfig::single("q1", '_', "q_accept", 'y', Stay),
            ]),
        })
        .unwrap()
    }

    #[test]
    fn test_new_machine() {
        let definition = rewrite_machine();
        let machine = TuringMachine::new(&definition);

        assert_eq!(machine.state(), "q0");
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.heads(), &[0]);
        assert!(!machine.is_halted());
    }

    #[test]
    fn test_rewrite_run_accepts() {
        let definition = rewrite_machine();
        let mut machine = TuringMachine::new(&definition);

        let output = machine.run("AAA", 100);

        assert_eq!(output, "BBB");
        assert!(machine.is_accepting());
        assert!(machine.is_halted());
        assert_eq!(machine.outcome(), Outcome::Accepted);
        assert_eq!(machine.step_count(), 4);
    }

    #[test]
    fn test_step_budget_leaves_run_incomplete() {
        let definition = rewrite_machine();
        let mut machine = TuringMachine::new(&definition);

        let output = machine.run("AAA", 2);

        assert_eq!(output, "BBA");
        assert_eq!(machine.step_count(), 2);
        assert!(!machine.is_accepting());
        assert!(!machine.is_halted());
        assert_eq!(machine.outcome(), Outcome::Incomplete);
    }

    #[test]
    fn test_rejection_is_atomic() {
        let definition = rewrite_machine();
        let mut machine = TuringMachine::new(&definition);
        machine.initialize("AC");

        assert_eq!(machine.step(), Step::Continue);
        let tapes_before = machine.tapes().to_vec();

        match machine.step() {
            Step::Halt(Halt::Rejected(rejection)) => {
                assert_eq!(rejection.state, "q0");
                assert_eq!(rejection.symbols, vec!['C']);
            }
            other => panic!("Expected a rejection, got {:?}", other),
        }

        assert_eq!(machine.tapes(), tapes_before.as_slice());
        assert_eq!(machine.heads(), &[1]);
        assert_eq!(machine.step_count(), 1);
        assert!(machine.is_halted());
        assert_eq!(machine.outcome(), Outcome::Rejected);
    }

    #[test]
    fn test_step_after_halt_is_noop() {
        let definition = rewrite_machine();
        let mut machine = TuringMachine::new(&definition);
        machine.initialize("C");

        assert!(!machine.step().advanced());
        assert_eq!(machine.step(), Step::Halt(Halt::Halted));
        assert_eq!(machine.step(), Step::Halt(Halt::Halted));
        assert_eq!(machine.step_count(), 0);
    }

    #[test]
    fn test_run_rejects() {
        let definition = rewrite_machine();
        let mut machine = TuringMachine::new(&definition);

        let execution = machine.execute("ABA", 100, TraceMode::Off);

        assert_eq!(execution.outcome, Outcome::Rejected);
        assert_eq!(execution.steps, 1);
        assert_eq!(execution.output, "BBA");
        assert!(execution.trace.is_none());
    }

    #[test]
    fn test_initialize_resets_everything() {
        let definition = rewrite_machine();
        let mut machine = TuringMachine::new(&definition);
        machine.run("AAA", 100);

        machine.initialize("A");

        assert_eq!(machine.state(), "q0");
        assert_eq!(machine.tapes(), &[vec!['A']]);
        assert_eq!(machine.heads(), &[0]);
        assert_eq!(machine.step_count(), 0);
        assert!(!machine.is_halted());
    }

    #[test]
    fn test_reads_past_end_are_blank() {
        let definition = rewrite_machine();
        let mut machine = TuringMachine::new(&definition);

        assert_eq!(machine.current_symbols(), vec!['_']);
        assert_eq!(machine.tapes(), &[vec!['_']]);
        assert_eq!(machine.heads(), &[0]);
    }

    #[test]
    fn test_left_move_grows_tape() {
        let definition = left_walker();
        let mut machine = TuringMachine::new(&definition);

        let output = machine.run("x", 10);

        assert_eq!(output, "yx");
        assert_eq!(machine.heads(), &[0]);
        assert_eq!(machine.outcome(), Outcome::Accepted);
    }

    #[test]
    fn test_leading_blanks_are_kept() {
        let definition = left_walker();
        let mut machine = TuringMachine::new(&definition);
        machine.initialize("x");
        machine.step();

        assert_eq!(machine.tapes(), &[vec!['_', 'x']]);
        assert_eq!(machine.output(), "_x");
    }

    #[test]
    fn test_initial_accepting_state_takes_no_steps() {
        let mut config = MachineConfig {
            name: Some("accepting".into()),
            states: Some(vec!["q0".into()]),
            input_alphabet: Some(vec!['A']),
            tape_alphabet: Some(vec!['A', '_']),
            initial_state: Some("q0".into()),
            accept_states: Some(vec!["q0".into()]),
            ..MachineConfig::default()
        };
        config.transitions = Some(vec![TransitionConfig::single(
            "q0", 'A', "q0", 'A', Right,
        )]);
        let definition = MachineDefinition::from_config(config).unwrap();
        let mut machine = TuringMachine::new(&definition);

        let execution = machine.execute("AA", 10, TraceMode::Off);

        assert_eq!(execution.outcome, Outcome::Accepted);
        assert_eq!(execution.steps, 0);
        assert_eq!(execution.output, "AA");
    }

    #[test]
    fn test_multi_tape_copy() {
        let definition = copy_machine();
        let mut machine = TuringMachine::new(&definition);

        let execution = machine.execute("abba", 100, TraceMode::Off);

        assert_eq!(execution.outcome, Outcome::Accepted);
        assert_eq!(execution.output, "abba");
        assert_eq!(machine.tape_contents(), vec!["abba-", "abba-"]);
        assert_eq!(machine.heads(), &[4, 4]);
    }

    #[test]
    fn test_multi_tape_reads_all_heads() {
        let definition = copy_machine();
        let mut machine = TuringMachine::new(&definition);
        machine.initialize("ab");
        machine.set_tape_content(1, "x").unwrap();

        assert_eq!(machine.current_symbols(), vec!['a', 'x']);
        assert!(matches!(machine.step(), Step::Halt(Halt::Rejected(_))));
        assert_eq!(machine.tape_contents(), vec!["ab", "x"]);
    }

    #[test]
    fn test_set_tape_content_out_of_bounds() {
        let definition = rewrite_machine();
        let mut machine = TuringMachine::new(&definition);

        assert!(machine.set_tape_content(1, "A").is_err());
    }

    #[test]
    fn test_trace_recording() {
        let definition = rewrite_machine();
        let mut machine = TuringMachine::new(&definition);

        let execution = machine.execute("AA", 100, TraceMode::Record);
        let trace = execution.trace.unwrap();

        assert_eq!(trace.label, "rewrite");
        assert_eq!(trace.len(), execution.steps + 1);
        assert_eq!(trace.snapshots[0].transition, None);
        assert_eq!(trace.snapshots[0].tapes, vec!["AA"]);
        assert_eq!(trace.snapshots[1].tapes, vec!["BA"]);
        assert_eq!(trace.snapshots[1].heads, vec![1]);
        assert_eq!(
            trace.snapshots[1].transition.as_ref().map(|t| t.write.clone()),
            Some(vec!['B'])
        );

        let last = trace.last().unwrap();
        assert!(last.accepting);
        assert_eq!(last.state, "q_accept");
    }

    #[test]
    fn test_trace_does_not_change_result() {
        let definition = rewrite_machine();
        let mut machine = TuringMachine::new(&definition);

        let plain = machine.execute("AAAA", 3, TraceMode::Off);
        let traced = machine.execute("AAAA", 3, TraceMode::Record);

        assert_eq!(plain.output, traced.output);
        assert_eq!(plain.outcome, traced.outcome);
        assert_eq!(plain.steps, traced.steps);
    }
}
