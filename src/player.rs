//! Global player registry.
//!
//! Sessions draw their player names from here; names are unique.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Ordered list of unique player names.
///
/// Serializes as a plain JSON array of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct PlayerRegistry {
    names: Vec<String>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a player. The name is trimmed first.
    ///
    /// Rejects empty names and names already registered.
    pub fn add(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidPlayerName);
        }
        if self.contains(name) {
            return Err(EngineError::DuplicatePlayer {
                name: name.to_string(),
            });
        }
        self.names.push(name.to_string());
        Ok(())
    }

    /// Removes a player by name. Returns `false` if no such player existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|n| n != name);
        self.names.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl TryFrom<Vec<String>> for PlayerRegistry {
    type Error = EngineError;

    fn try_from(names: Vec<String>) -> Result<Self> {
        let mut registry = PlayerRegistry::new();
        for name in &names {
            registry.add(name)?;
        }
        Ok(registry)
    }
}

impl From<PlayerRegistry> for Vec<String> {
    fn from(registry: PlayerRegistry) -> Self {
        registry.names
    }
}
