//! User shortcut customization persistence.
//!
//! Handles loading and saving user binding overrides through a key-value store.
//! Fixed keys:
//! - `customizedShortcuts` - map of binding_id -> { accelerator, enabled }
//! - `lastFailedShortcuts` - names of shortcuts that failed the last pass
//! - `lastSuggestedAlternatives` - map of shortcut name -> suggested accelerator
//! - `lastFailureRecords` - the failure records of the last pass
//! - `firstSessionCompleted` - whether a registration pass ever succeeded

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::accelerator::AcceleratorError;
use crate::failure::FailureRecord;
use crate::store::KeyValueStore;

use super::types::Shortcut;

pub const CUSTOMIZED_SHORTCUTS_KEY: &str = "customizedShortcuts";
pub const LAST_FAILED_SHORTCUTS_KEY: &str = "lastFailedShortcuts";
pub const LAST_SUGGESTED_ALTERNATIVES_KEY: &str = "lastSuggestedAlternatives";
pub const LAST_FAILURE_RECORDS_KEY: &str = "lastFailureRecords";
pub const FIRST_SESSION_COMPLETED_KEY: &str = "firstSessionCompleted";

/// A user customization of one binding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingOverride {
    pub accelerator: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl From<&Shortcut> for BindingOverride {
    fn from(shortcut: &Shortcut) -> Self {
        Self {
            accelerator: shortcut.accelerator.to_canonical_string(),
            enabled: shortcut.enabled,
        }
    }
}

/// What the last registration pass left behind for the UI.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FailureSnapshot {
    pub failed_names: Vec<String>,
    pub suggestions: BTreeMap<String, String>,
    pub records: Vec<FailureRecord>,
}

impl FailureSnapshot {
    pub fn is_empty(&self) -> bool {
        self.failed_names.is_empty() && self.records.is_empty()
    }
}

/// Error that can occur when loading/saving shortcut state.
#[derive(Debug)]
pub enum PersistenceError {
    /// IO error reading/writing the store
    Io(std::io::Error),
    /// JSON parse error
    Json(serde_json::Error),
    /// Invalid accelerator string in stored overrides
    InvalidAccelerator {
        binding_id: String,
        accelerator: String,
        error: AcceleratorError,
    },
    /// Stored override names an accelerator the OS keeps for itself
    ReservedAccelerator {
        binding_id: String,
        accelerator: String,
    },
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Json(e) => write!(f, "JSON parse error: {}", e),
            Self::InvalidAccelerator {
                binding_id,
                accelerator,
                error,
            } => {
                write!(
                    f,
                    "Invalid accelerator '{}' for binding '{}': {}",
                    accelerator, binding_id, error
                )
            }
            Self::ReservedAccelerator {
                binding_id,
                accelerator,
            } => write!(
                f,
                "Accelerator '{}' for binding '{}' is reserved by the system",
                accelerator, binding_id
            ),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::InvalidAccelerator { error, .. } => Some(error),
            Self::ReservedAccelerator { .. } => None,
        }
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Durable load/save of user-customized bindings and failure records.
pub struct ShortcutStore {
    store: Box<dyn KeyValueStore>,
}

impl ShortcutStore {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    fn read<T: serde::de::DeserializeOwned + Default>(
        &self,
        key: &str,
    ) -> Result<T, PersistenceError> {
        match self.store.get(key)? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(T::default()),
        }
    }

    fn write<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), PersistenceError> {
        let value: Value = serde_json::to_value(value)?;
        self.store.set(key, value)
    }

    /// Load overrides. Returns an empty map if nothing was saved.
    pub fn load(&self) -> Result<HashMap<String, BindingOverride>, PersistenceError> {
        self.read(CUSTOMIZED_SHORTCUTS_KEY)
    }

    pub fn save(
        &mut self,
        overrides: &HashMap<String, BindingOverride>,
    ) -> Result<(), PersistenceError> {
        self.write(CUSTOMIZED_SHORTCUTS_KEY, overrides)
    }

    /// Clear all customization.
    pub fn clear(&mut self) -> Result<(), PersistenceError> {
        self.store.remove(CUSTOMIZED_SHORTCUTS_KEY)
    }

    pub fn save_failures(&mut self, snapshot: &FailureSnapshot) -> Result<(), PersistenceError> {
        self.write(LAST_FAILED_SHORTCUTS_KEY, &snapshot.failed_names)?;
        self.write(LAST_SUGGESTED_ALTERNATIVES_KEY, &snapshot.suggestions)?;
        self.write(LAST_FAILURE_RECORDS_KEY, &snapshot.records)
    }

    pub fn last_failures(&self) -> Result<FailureSnapshot, PersistenceError> {
        Ok(FailureSnapshot {
            failed_names: self.read(LAST_FAILED_SHORTCUTS_KEY)?,
            suggestions: self.read(LAST_SUGGESTED_ALTERNATIVES_KEY)?,
            records: self.read(LAST_FAILURE_RECORDS_KEY)?,
        })
    }

    pub fn clear_failures(&mut self) -> Result<(), PersistenceError> {
        self.store.remove(LAST_FAILED_SHORTCUTS_KEY)?;
        self.store.remove(LAST_SUGGESTED_ALTERNATIVES_KEY)?;
        self.store.remove(LAST_FAILURE_RECORDS_KEY)
    }

    pub fn first_session_completed(&self) -> Result<bool, PersistenceError> {
        self.read(FIRST_SESSION_COMPLETED_KEY)
    }

    pub fn mark_first_session_completed(&mut self) -> Result<(), PersistenceError> {
        self.write(FIRST_SESSION_COMPLETED_KEY, &true)
    }
}
