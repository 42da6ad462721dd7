//! Run-time limits of the cipher pipeline.

use crate::types::{MachineError, MAX_EXECUTION_STEPS, MAX_MOD26_ITERATIONS};
use serde::{Deserialize, Serialize};

/// Limits applied to every machine run of a pipeline.
///
/// Missing fields fall back to their defaults, so `{}` is a valid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Step budget of each individual machine run. Add and subtract runs get at least the
    /// square of their input length.
    pub max_steps: usize,
    /// Ceiling on the subtractions performed while reducing a value mod 26.
    pub mod26_max_iterations: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_steps: MAX_EXECUTION_STEPS,
            mod26_max_iterations: MAX_MOD26_ITERATIONS,
        }
    }
}

impl PipelineConfig {
    /// Parses a JSON configuration and validates it.
    pub fn from_json(content: &str) -> Result<Self, MachineError> {
        let config: PipelineConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// A zero step budget would make every stage incomplete.
    pub fn validate(&self) -> Result<(), MachineError> {
        if self.max_steps == 0 {
            return Err(MachineError::invalid("max_steps", "must be at least 1"));
        }
        Ok(())
    }
}
