//! This module provides the `MachineLoader` struct, responsible for loading machine
//! definitions and pipeline configurations from JSON files and strings.

use crate::config::PipelineConfig;
use crate::definition::{MachineConfig, MachineDefinition};
use crate::types::MachineError;
use std::fs;
use std::path::{Path, PathBuf};

/// `MachineLoader` is a utility struct for loading machine definitions.
/// It provides methods to load definitions from individual files, from string content,
/// and to discover and load all `.json` files within a specified directory.
pub struct MachineLoader;

impl MachineLoader {
    /// Loads a single machine definition from the specified file path.
    ///
    /// A definition without a `name` is named after the file stem.
    ///
    /// # Returns
    ///
    /// * `Ok(MachineDefinition)` if the file is read, parsed and validated.
    /// * `Err(MachineError::FileError)` if the file cannot be read.
    /// * `Err(MachineError::JsonError)` if the file is not valid JSON.
    /// * Any validation error reported by `MachineDefinition::from_config`.
    pub fn load_definition(path: &Path) -> Result<MachineDefinition, MachineError> {
        let content = read(path)?;
        let mut config: MachineConfig = serde_json::from_str(&content)?;

        if config.name.is_none() {
            config.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
        }

        MachineDefinition::from_config(config)
    }

    /// Loads a single machine definition from the provided JSON content.
    pub fn load_definition_from_string(content: &str) -> Result<MachineDefinition, MachineError> {
        MachineDefinition::from_json(content)
    }

    /// Loads every `.json` definition in a directory.
    ///
    /// Directories and other files are skipped. Each element of the result is either the
    /// path and definition of a file that loaded, or the error it produced.
    pub fn load_definitions(
        directory: &Path,
    ) -> Vec<Result<(PathBuf, MachineDefinition), MachineError>> {
        if !directory.exists() {
            return vec![Err(MachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(MachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut paths: Vec<PathBuf> = Vec::new();
        let mut results = Vec::new();

        for entry in entries {
            match entry {
                Ok(entry) => paths.push(entry.path()),
                Err(e) => results.push(Err(MachineError::FileError(format!(
                    "Failed to read directory entry: {}",
                    e
                )))),
            }
        }

        // Directory order is platform dependent.
        paths.sort();

        for path in paths {
            if path.is_dir() || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }

            match Self::load_definition(&path) {
                Ok(definition) => results.push(Ok((path, definition))),
                Err(e) => {
                    log::warn!("Skipping machine {}: {}", path.display(), e);
                    results.push(Err(MachineError::FileError(format!(
                        "Failed to load machine from {}: {}",
                        path.display(),
                        e
                    ))))
                }
            }
        }

        results
    }

    /// Loads pipeline limits from a JSON file.
    pub fn load_config(path: &Path) -> Result<PipelineConfig, MachineError> {
        PipelineConfig::from_json(&read(path)?)
    }
}

fn read(path: &Path) -> Result<String, MachineError> {
    fs::read_to_string(path).map_err(|e| {
        MachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
    })
}
