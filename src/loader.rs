//! This module provides the `Loader` struct, responsible for reading trace
//! files and machine definitions from disk. It hands the rest of the crate
//! complete, in-memory strings; nothing else touches the filesystem.

use crate::parser::parse;
use crate::types::{MachineDef, MachineError, TraceError};
use std::fs;
use std::path::Path;

/// `Loader` is a utility struct for reading trace files (one trace per line,
/// UTF-8) and machine definition files.
pub struct Loader;

impl Loader {
    /// Reads a trace file into its lines. Works for raw traces and for
    /// tokenized (label) traces alike; the caller decides how to interpret
    /// each line.
    pub fn read_traces(path: &Path) -> Result<Vec<String>, TraceError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TraceError::File(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Ok(content.lines().map(str::to_string).collect())
    }

    /// Loads a machine definition from the specified file path.
    pub fn load_machine(path: &Path) -> Result<MachineDef, MachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            MachineError::File(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        parse(&content)
    }

    /// Loads a machine definition from the provided string content.
    ///
    /// This is useful for definitions that are not stored in files, e.g.
    /// embedded ones.
    pub fn load_machine_from_string(content: &str) -> Result<MachineDef, MachineError> {
        parse(content)
    }
}
