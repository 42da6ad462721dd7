//! This crate provides a Turing Machine execution engine and a Caesar cipher built entirely
//! from machine runs. It includes modules for defining and validating machines, running them
//! with step budgets and optional traces, loading definitions from JSON, and composing the
//! embedded machine library into unary arithmetic and the cipher pipeline.

pub mod analyzer;
pub mod config;
pub mod definition;
pub mod library;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod pipeline;
pub mod table;
pub mod trace;
pub mod types;
pub mod unary;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `unreachable_states` inspection from the analyzer module.
pub use analyzer::unreachable_states;
/// Re-exports the pipeline limits.
pub use config::PipelineConfig;
/// Re-exports the configuration record and the validated definition.
pub use definition::{MachineConfig, MachineDefinition, TransitionConfig};
/// Re-exports `MachineInfo`, `MachineLibrary`, and `MACHINES` from the library module.
pub use library::{MachineInfo, MachineLibrary, MACHINES};
/// Re-exports the `MachineLoader` struct from the loader module.
pub use loader::MachineLoader;
/// Re-exports the `TuringMachine` struct and its run result from the machine module.
pub use machine::{Execution, TuringMachine};
/// Re-exports the key and input parsing from the parser module.
pub use parser::{parse_input, CipherInput, Key};
/// Re-exports the composition driver.
pub use pipeline::{MachineSet, Pipeline, PipelineResult};
/// Re-exports the trace recording types.
pub use trace::{Snapshot, Trace};
/// Re-exports various types related to machine definition and execution from the types module.
pub use types::{
    Context, Direction, Halt, MachineError, Outcome, Rejection, Stage, Step, TraceMode,
    Transition, DEFAULT_BLANK_SYMBOL, MARK, MAX_EXECUTION_STEPS,
};
