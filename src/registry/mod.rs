// src/registry/mod.rs
use crate::check::CheckConfig;
use std::sync::RwLock;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid check config: {0}")]
    InvalidConfig(&'static str),

    #[error("check \"{0}\" is already registered")]
    DuplicateName(String),
}

/// Holds the set of registered checks for the process lifetime. Registration
/// usually happens once at startup, but the lock keeps runtime registration
/// safe too. The runner only ever sees snapshots taken via `list`.
#[derive(Default)]
pub struct Registry {
    entries: RwLock<Vec<CheckConfig>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects empty names and duplicates; a rejected call leaves the
    /// registry untouched. Duplicates are an operator mistake we surface
    /// rather than silently overwriting.
    pub fn register(&self, config: CheckConfig) -> Result<(), RegistryError> {
        if config.name.is_empty() {
            return Err(RegistryError::InvalidConfig("check name must not be empty"));
        }

        let mut entries = self.entries.write().expect("registry lock poisoned");
        if entries.iter().any(|c| c.name == config.name) {
            return Err(RegistryError::DuplicateName(config.name));
        }

        debug!(name = %config.name, "registered health check");
        entries.push(config);
        Ok(())
    }

    /// Removes one check by name; returns whether it existed.
    pub fn unregister(&self, name: &str) -> bool {
        let mut entries = self.entries.write().expect("registry lock poisoned");
        let before = entries.len();
        entries.retain(|c| c.name != name);
        let removed = entries.len() < before;
        if removed {
            debug!(name, "unregistered health check");
        }
        removed
    }

    /// Snapshot of the registered checks in registration order.
    pub fn list(&self) -> Vec<CheckConfig> {
        self.entries.read().expect("registry lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
