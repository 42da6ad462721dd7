//! This module validates machine configurations before a `MachineDefinition` is built.
//! It checks that required fields are present, that every state and symbol a transition
//! mentions is declared, and that transition tuples match the tape count. It also finds
//! states that cannot be reached from the initial state.

use crate::definition::{MachineConfig, MachineDefinition, TransitionConfig};
use crate::types::{Direction, MachineError, Transition, DEFAULT_BLANK_SYMBOL};
use std::collections::{BTreeSet, HashSet};

/// The validated contents of a `MachineConfig`.
#[derive(Debug)]
pub(crate) struct Checked {
    pub states: BTreeSet<String>,
    pub input_alphabet: BTreeSet<char>,
    pub tape_alphabet: BTreeSet<char>,
    pub initial_state: String,
    pub accept_states: BTreeSet<String>,
    pub blank: char,
    pub tapes: usize,
    pub transitions: Vec<(String, Transition)>,
}

/// Analyzes a configuration for structural errors.
///
/// Checks run in order and the first failure is returned, except for missing fields,
/// which are all collected into one `MissingFields` error.
pub(crate) fn analyze(config: &MachineConfig) -> Result<Checked, MachineError> {
    let (
        Some(states),
        Some(input_alphabet),
        Some(tape_alphabet),
        Some(initial_state),
        Some(accept_states),
        Some(transitions),
    ) = (
        &config.states,
        &config.input_alphabet,
        &config.tape_alphabet,
        &config.initial_state,
        &config.accept_states,
        &config.transitions,
    )
    else {
        return Err(MachineError::MissingFields(missing_fields(config)));
    };

    let tapes = check_tape_count(config.num_tapes)?;
    let blank = config.blank_symbol.unwrap_or(DEFAULT_BLANK_SYMBOL);

    let states: BTreeSet<String> = states.iter().cloned().collect();
    let input_alphabet: BTreeSet<char> = input_alphabet.iter().copied().collect();
    let tape_alphabet: BTreeSet<char> = tape_alphabet.iter().copied().collect();
    let accept_states: BTreeSet<String> = accept_states.iter().cloned().collect();

    check_alphabets(&input_alphabet, &tape_alphabet, blank)?;
    check_states(&states, initial_state, &accept_states)?;

    let transitions = transitions
        .iter()
        .enumerate()
        .map(|(index, record)| resolve_transition(index, record, tapes, &states, &tape_alphabet))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Checked {
        states,
        input_alphabet,
        tape_alphabet,
        initial_state: initial_state.clone(),
        accept_states,
        blank,
        tapes,
        transitions,
    })
}

/// Names of the required fields that are absent. Blank symbol and tape count may default.
fn missing_fields(config: &MachineConfig) -> Vec<String> {
    [
        ("states", config.states.is_none()),
        ("input_alphabet", config.input_alphabet.is_none()),
        ("tape_alphabet", config.tape_alphabet.is_none()),
        ("initial_state", config.initial_state.is_none()),
        ("accept_states", config.accept_states.is_none()),
        ("transitions", config.transitions.is_none()),
    ]
    .into_iter()
    .filter(|(_, missing)| *missing)
    .map(|(field, _)| field.to_string())
    .collect()
}

fn check_tape_count(num_tapes: Option<usize>) -> Result<usize, MachineError> {
    match num_tapes.unwrap_or(1) {
        0 => Err(MachineError::invalid(
            "num_tapes",
            "a machine needs at least one tape",
        )),
        n => Ok(n),
    }
}

/// Checks that the tape alphabet contains the input alphabet and the blank,
/// and that the blank is not an input symbol.
fn check_alphabets(
    input_alphabet: &BTreeSet<char>,
    tape_alphabet: &BTreeSet<char>,
    blank: char,
) -> Result<(), MachineError> {
    if !tape_alphabet.contains(&blank) {
        return Err(MachineError::invalid(
            "tape_alphabet",
            format!("does not contain the blank symbol {blank:?}"),
        ));
    }

    if input_alphabet.contains(&blank) {
        return Err(MachineError::invalid(
            "input_alphabet",
            format!("contains the blank symbol {blank:?}"),
        ));
    }

    let outside: Vec<char> = input_alphabet.difference(tape_alphabet).copied().collect();
    if !outside.is_empty() {
        return Err(MachineError::invalid(
            "input_alphabet",
            format!("symbols {outside:?} are not in the tape alphabet"),
        ));
    }

    Ok(())
}

/// Checks that the initial state and the accept states are declared.
fn check_states(
    states: &BTreeSet<String>,
    initial_state: &str,
    accept_states: &BTreeSet<String>,
) -> Result<(), MachineError> {
    if states.is_empty() {
        return Err(MachineError::invalid("states", "no states declared"));
    }

    if !states.contains(initial_state) {
        return Err(MachineError::invalid(
            "initial_state",
            format!("{initial_state} is not a declared state"),
        ));
    }

    if accept_states.is_empty() {
        return Err(MachineError::invalid(
            "accept_states",
            "at least one accept state is required",
        ));
    }

    let undeclared: Vec<&String> = accept_states.difference(states).collect();
    if !undeclared.is_empty() {
        return Err(MachineError::invalid(
            "accept_states",
            format!("{undeclared:?} are not declared states"),
        ));
    }

    Ok(())
}

/// Turns one transition record into a `(source state, Transition)` pair.
fn resolve_transition(
    index: usize,
    record: &TransitionConfig,
    tapes: usize,
    states: &BTreeSet<String>,
    tape_alphabet: &BTreeSet<char>,
) -> Result<(String, Transition), MachineError> {
    let field = |name: &str| format!("transitions[{index}].{name}");

    let current_state = record
        .current_state
        .clone()
        .ok_or_else(|| MachineError::MissingFields(vec![field("current_state")]))?;
    let next_state = record
        .next_state
        .clone()
        .ok_or_else(|| MachineError::MissingFields(vec![field("next_state")]))?;

    for (name, state) in [("current_state", &current_state), ("next_state", &next_state)] {
        if !states.contains(state) {
            return Err(MachineError::invalid(
                &field(name),
                format!("{state} is not a declared state"),
            ));
        }
    }

    let read = pick(
        record.read_symbol,
        &record.read_symbols,
        tapes,
        &field("read_symbol"),
        &field("read_symbols"),
    )?;
    let write = pick(
        record.write_symbol,
        &record.write_symbols,
        tapes,
        &field("write_symbol"),
        &field("write_symbols"),
    )?;
    let directions: Vec<Direction> = pick(
        record.movement,
        &record.movements,
        tapes,
        &field("move"),
        &field("movements"),
    )?;

    for (name, symbols) in [("read", &read), ("write", &write)] {
        if let Some(symbol) = symbols.iter().find(|s| !tape_alphabet.contains(*s)) {
            return Err(MachineError::invalid(
                &field(name),
                format!("symbol {symbol:?} is not in the tape alphabet"),
            ));
        }
    }

    Ok((
        current_state,
        Transition {
            read,
            write,
            directions,
            next_state,
        },
    ))
}

/// Chooses between the scalar and the list form of a transition field.
///
/// The scalar form is only accepted for single-tape machines; the list form must have
/// exactly one entry per tape.
fn pick<T: Copy>(
    scalar: Option<T>,
    list: &Option<Vec<T>>,
    tapes: usize,
    scalar_name: &str,
    list_name: &str,
) -> Result<Vec<T>, MachineError> {
    match (scalar, list) {
        (Some(_), Some(_)) => Err(MachineError::invalid(
            scalar_name,
            format!("cannot be combined with {list_name}"),
        )),
        (Some(value), None) if tapes == 1 => Ok(vec![value]),
        (Some(_), None) => Err(MachineError::invalid(
            scalar_name,
            format!("a {tapes}-tape machine needs {list_name}"),
        )),
        (None, Some(values)) if values.len() == tapes => Ok(values.clone()),
        (None, Some(values)) => Err(MachineError::invalid(
            list_name,
            format!("expected {tapes} entries, found {}", values.len()),
        )),
        (None, None) => Err(MachineError::MissingFields(vec![if tapes == 1 {
            scalar_name.to_string()
        } else {
            list_name.to_string()
        }])),
    }
}

/// Returns the declared states that cannot be reached from the initial state,
/// found by a depth-first traversal over the transition table.
pub fn unreachable_states(definition: &MachineDefinition) -> Vec<String> {
    let mut visited = HashSet::new();
    let mut queue = vec![definition.initial_state()];

    while let Some(state) = queue.pop() {
        if !visited.insert(state) {
            continue;
        }

        for transition in definition.table().outgoing(state) {
            if !visited.contains(transition.next_state.as_str()) {
                queue.push(transition.next_state.as_str());
            }
        }
    }

    // `states()` is ordered, so the result is deterministic.
    definition
        .states()
        .iter()
        .filter(|state| !visited.contains(state.as_str()))
        .cloned()
        .collect()
}
