//! Embedded machine catalog: definitions compiled into the binary and a
//! registry for looking them up by name or index.

use crate::types::{MachineDef, MachineError};

use std::sync::RwLock;

// Default embedded machine definitions
const MACHINE_TEXTS: [&str; 2] = [
    include_str!("../machines/xor.tm"),
    include_str!("../machines/scan.tm"),
];

lazy_static::lazy_static! {
    pub static ref MACHINES: RwLock<Vec<MachineDef>> = RwLock::new(Vec::new());
}

/// Summary information about a catalog machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineInfo {
    pub index: usize,
    pub name: String,
    pub start: String,
    pub state_count: usize,
    pub rule_count: usize,
}

pub struct Catalog;

impl Catalog {
    /// Parse the embedded definitions into the registry.
    pub fn load() -> Result<(), MachineError> {
        let mut machines = Vec::new();

        for text in MACHINE_TEXTS {
            if let Ok(def) = crate::parser::parse(text) {
                machines.push(def);
            } else {
                eprintln!("Failed to parse embedded machine");
            }
        }

        if let Ok(mut write_guard) = MACHINES.write() {
            *write_guard = machines;
        } else {
            return Err(MachineError::File(
                "Failed to acquire write lock".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the number of available machines
    pub fn machine_count() -> usize {
        // Initialize with the embedded machines if not already initialized
        let _ = Self::load();

        MACHINES.read().map(|machines| machines.len()).unwrap_or(0)
    }

    /// Get a machine by its index
    pub fn get_machine_by_index(index: usize) -> Result<MachineDef, MachineError> {
        // Initialize with the embedded machines if not already initialized
        let _ = Self::load();

        MACHINES
            .read()
            .map_err(|_| MachineError::File("Failed to acquire read lock".to_string()))?
            .get(index)
            .cloned()
            .ok_or_else(|| {
                MachineError::Validation(format!("Machine index {} out of range", index))
            })
    }

    /// Get a machine by its name
    pub fn get_machine_by_name(name: &str) -> Result<MachineDef, MachineError> {
        // Initialize with the embedded machines if not already initialized
        let _ = Self::load();

        MACHINES
            .read()
            .map_err(|_| MachineError::File("Failed to acquire read lock".to_string()))?
            .iter()
            .find(|def| def.name == name)
            .cloned()
            .ok_or_else(|| MachineError::Validation(format!("Machine '{}' not found", name)))
    }

    /// List all machine names
    pub fn list_machine_names() -> Vec<String> {
        // Initialize with the embedded machines if not already initialized
        let _ = Self::load();

        MACHINES
            .read()
            .map(|machines| machines.iter().map(|def| def.name.clone()).collect())
            .unwrap_or_else(|_| Vec::new())
    }

    /// Get information about a machine by its index
    pub fn get_machine_info(index: usize) -> Result<MachineInfo, MachineError> {
        let def = Self::get_machine_by_index(index)?;

        Ok(MachineInfo {
            index,
            name: def.name.clone(),
            start: def.start.clone(),
            state_count: def.state_count(),
            rule_count: def.rule_count(),
        })
    }
}
