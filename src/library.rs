//! The standard machine library: the automata the cipher pipeline is composed from,
//! embedded as JSON and parsed once on first use.

use crate::definition::MachineDefinition;
use crate::types::MachineError;

// Embedded programs, by name
const PROGRAM_TEXTS: [(&str, &str); 5] = [
    (
        "letter_to_number",
        include_str!("../machines/letter_to_number.json"),
    ),
    (
        "number_to_letter",
        include_str!("../machines/number_to_letter.json"),
    ),
    ("add_unary", include_str!("../machines/add_unary.json")),
    (
        "subtract_unary",
        include_str!("../machines/subtract_unary.json"),
    ),
    (
        "numeral_to_letter",
        include_str!("../machines/numeral_to_letter.json"),
    ),
];

lazy_static::lazy_static! {
    /// Every embedded program that parsed and validated.
    pub static ref MACHINES: Vec<MachineDefinition> = load_embedded();
}

fn load_embedded() -> Vec<MachineDefinition> {
    PROGRAM_TEXTS
        .iter()
        .filter_map(|(name, text)| match MachineDefinition::from_json(text) {
            Ok(mut definition) => {
                definition.set_name(name.to_string());
                Some(definition)
            }
            Err(e) => {
                log::error!("Failed to load embedded machine '{}': {}", name, e);
                None
            }
        })
        .collect()
}

/// Read-only access to the embedded machines.
pub struct MachineLibrary;

impl MachineLibrary {
    /// Get a machine by its name.
    pub fn get(name: &str) -> Result<&'static MachineDefinition, MachineError> {
        MACHINES
            .iter()
            .find(|definition| definition.name() == name)
            .ok_or_else(|| MachineError::UnknownMachine(name.to_string()))
    }

    /// Get the number of available machines
    pub fn count() -> usize {
        MACHINES.len()
    }

    /// List all machine names
    pub fn names() -> Vec<&'static str> {
        MACHINES.iter().map(|definition| definition.name()).collect()
    }

    /// Search for machines by name, case-insensitively.
    pub fn search(query: &str) -> Vec<&'static str> {
        let query = query.to_lowercase();

        MACHINES
            .iter()
            .map(|definition| definition.name())
            .filter(|name| name.to_lowercase().contains(&query))
            .collect()
    }

    /// Get the JSON source of a machine.
    pub fn source(name: &str) -> Result<&'static str, MachineError> {
        PROGRAM_TEXTS
            .iter()
            .find(|(program, _)| *program == name)
            .map(|(_, text)| *text)
            .ok_or_else(|| MachineError::UnknownMachine(name.to_string()))
    }

    /// Get summary information about a machine.
    pub fn info(name: &str) -> Result<MachineInfo, MachineError> {
        let definition = Self::get(name)?;

        Ok(MachineInfo {
            name: definition.name().to_string(),
            initial_state: definition.initial_state().to_string(),
            state_count: definition.states().len(),
            transition_count: definition.table().len(),
            tapes: definition.tapes(),
        })
    }
}

/// Summary of a library machine, as returned by `MachineLibrary::info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineInfo {
    pub name: String,
    pub initial_state: String,
    /// Number of declared states.
    pub state_count: usize,
    /// Number of rules.
    pub transition_count: usize,
    pub tapes: usize,
}
