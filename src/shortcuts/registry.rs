//! Deterministic shortcut registry with Vec storage.
//!
//! Uses Vec for deterministic iteration order and HashMap for O(1) lookup.
//! The registry only owns the *desired* table; whether a binding is live at
//! the OS level is tracked by the engine.

use std::collections::HashMap;

use crate::accelerator::{validate, Accelerator};
use crate::error::ShortcutError;

use super::conflict::{is_reserved, ConflictResolver};
use super::persistence::{BindingOverride, PersistenceError};
use super::types::{Shortcut, ShortcutCategory};

/// Central registry of all named shortcuts.
#[derive(Clone, Debug, Default)]
pub struct ShortcutRegistry {
    defaults: Vec<Shortcut>,
    shortcuts: Vec<Shortcut>,
    id_to_index: HashMap<String, usize>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the registry from a compiled-in default table.
    ///
    /// Defaults are trusted: accelerator collisions between them are not
    /// rejected here and surface during registration instead.
    pub fn with_defaults(defaults: Vec<Shortcut>) -> Result<Self, ShortcutError> {
        let mut registry = Self::new();
        for shortcut in &defaults {
            registry.seed(shortcut.clone())?;
        }
        registry.defaults = defaults;
        Ok(registry)
    }

    fn seed(&mut self, shortcut: Shortcut) -> Result<(), ShortcutError> {
        if self.id_to_index.contains_key(&shortcut.id) {
            return Err(ShortcutError::DuplicateId(shortcut.id));
        }
        let index = self.shortcuts.len();
        self.id_to_index.insert(shortcut.id.clone(), index);
        self.shortcuts.push(shortcut);
        Ok(())
    }

    /// Add a shortcut at runtime.
    ///
    /// Rejects duplicate ids, reserved combinations and, for enabled
    /// shortcuts, accelerators already owned by another enabled shortcut.
    pub fn add(
        &mut self,
        shortcut: Shortcut,
        resolved: &HashMap<String, Accelerator>,
    ) -> Result<(), ShortcutError> {
        if self.id_to_index.contains_key(&shortcut.id) {
            return Err(ShortcutError::DuplicateId(shortcut.id));
        }
        if is_reserved(&shortcut.accelerator) {
            return Err(ShortcutError::Reserved {
                accelerator: shortcut.accelerator.to_canonical_string(),
            });
        }
        if shortcut.enabled {
            self.ensure_free(&shortcut.accelerator, &shortcut.id, resolved)?;
        }
        self.seed(shortcut)
    }

    pub fn get(&self, id: &str) -> Option<&Shortcut> {
        self.id_to_index.get(id).and_then(|&i| self.shortcuts.get(i))
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Shortcut, ShortcutError> {
        self.id_to_index
            .get(id)
            .and_then(|&i| self.shortcuts.get_mut(i))
            .ok_or_else(|| ShortcutError::UnknownShortcut(id.to_string()))
    }

    pub fn shortcuts(&self) -> &[Shortcut] {
        &self.shortcuts
    }

    pub fn enabled(&self) -> impl Iterator<Item = &Shortcut> {
        self.shortcuts.iter().filter(|s| s.enabled)
    }

    pub fn len(&self) -> usize {
        self.shortcuts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shortcuts.is_empty()
    }

    pub fn resolver<'a>(
        &'a self,
        resolved: &'a HashMap<String, Accelerator>,
    ) -> ConflictResolver<'a> {
        ConflictResolver::new(&self.shortcuts, resolved)
    }

    fn ensure_free(
        &self,
        accelerator: &Accelerator,
        id: &str,
        resolved: &HashMap<String, Accelerator>,
    ) -> Result<(), ShortcutError> {
        match self.resolver(resolved).owner_of(accelerator, id) {
            Some(owner) => Err(ShortcutError::Conflict {
                accelerator: accelerator.to_canonical_string(),
                owner_id: owner.id.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Change a shortcut's accelerator.
    ///
    /// Validates the string, refuses reserved combinations and accelerators
    /// owned by another enabled shortcut. On any error the table is untouched.
    /// Returns the previous accelerator.
    pub fn rebind(
        &mut self,
        id: &str,
        new_accelerator: &str,
        resolved: &HashMap<String, Accelerator>,
    ) -> Result<Accelerator, ShortcutError> {
        let accelerator = validate(new_accelerator)?;
        if self.get(id).is_none() {
            return Err(ShortcutError::UnknownShortcut(id.to_string()));
        }
        if is_reserved(&accelerator) {
            return Err(ShortcutError::Reserved {
                accelerator: accelerator.to_canonical_string(),
            });
        }
        self.ensure_free(&accelerator, id, resolved)?;

        let shortcut = self.get_mut(id)?;
        Ok(std::mem::replace(&mut shortcut.accelerator, accelerator))
    }

    /// Flip `enabled`. Enabling fails if the accelerator is now owned by
    /// another enabled shortcut. Returns the new value.
    pub fn toggle(
        &mut self,
        id: &str,
        resolved: &HashMap<String, Accelerator>,
    ) -> Result<bool, ShortcutError> {
        let shortcut = self
            .get(id)
            .ok_or_else(|| ShortcutError::UnknownShortcut(id.to_string()))?;
        if !shortcut.enabled {
            let accelerator = shortcut.accelerator.clone();
            self.ensure_free(&accelerator, id, resolved)?;
        }

        let shortcut = self.get_mut(id)?;
        shortcut.enabled = !shortcut.enabled;
        Ok(shortcut.enabled)
    }

    pub fn by_category(&self, category: ShortcutCategory) -> Vec<&Shortcut> {
        self.shortcuts
            .iter()
            .filter(|s| s.category == category)
            .collect()
    }

    /// Case-insensitive substring search over name, description and accelerator.
    pub fn search(&self, text: &str) -> Vec<&Shortcut> {
        self.shortcuts.iter().filter(|s| s.matches(text)).collect()
    }

    /// Shortcut whose effective accelerator is `accelerator` and that is enabled.
    pub fn find_by_accelerator<'a>(
        &'a self,
        accelerator: &Accelerator,
        resolved: &'a HashMap<String, Accelerator>,
    ) -> Option<&'a Shortcut> {
        self.resolver(resolved).owner_of(accelerator, "")
    }

    /// Apply persisted overrides on top of the current table.
    ///
    /// Returns errors for entries that could not be applied (but still applies valid ones).
    /// Entries naming a reserved accelerator are skipped whole.
    pub fn apply_overrides(
        &mut self,
        overrides: &HashMap<String, BindingOverride>,
    ) -> Vec<PersistenceError> {
        let mut errors = Vec::new();

        // Sorted so that the outcome does not depend on map iteration order
        let mut ids: Vec<&String> = overrides.keys().collect();
        ids.sort();

        for id in ids {
            let entry = &overrides[id];
            let accelerator = match Accelerator::parse_lenient(&entry.accelerator) {
                Ok(accelerator) => accelerator,
                Err(error) => {
                    errors.push(PersistenceError::InvalidAccelerator {
                        binding_id: id.clone(),
                        accelerator: entry.accelerator.clone(),
                        error,
                    });
                    continue;
                }
            };
            if is_reserved(&accelerator) {
                errors.push(PersistenceError::ReservedAccelerator {
                    binding_id: id.clone(),
                    accelerator: accelerator.to_canonical_string(),
                });
                continue;
            }
            match self.get_mut(id) {
                Ok(shortcut) => {
                    shortcut.accelerator = accelerator;
                    shortcut.enabled = entry.enabled;
                }
                Err(_) => {
                    tracing::warn!(
                        category = "SHORTCUT",
                        shortcut_id = %id,
                        "Ignoring override for unknown shortcut"
                    );
                }
            }
        }

        errors
    }

    /// Export entries that differ from the compiled-in defaults.
    pub fn export_overrides(&self) -> HashMap<String, BindingOverride> {
        self.shortcuts
            .iter()
            .filter(|shortcut| {
                match self.defaults.iter().find(|d| d.id == shortcut.id) {
                    Some(default) => {
                        default.accelerator != shortcut.accelerator
                            || default.enabled != shortcut.enabled
                    }
                    // Shortcuts added at runtime are always customization
                    None => true,
                }
            })
            .map(|shortcut| (shortcut.id.clone(), BindingOverride::from(shortcut)))
            .collect()
    }

    /// Restore the compiled-in default table, dropping runtime additions.
    pub fn reset_to_defaults(&mut self) {
        let defaults = std::mem::take(&mut self.defaults);
        self.shortcuts.clear();
        self.id_to_index.clear();
        for shortcut in &defaults {
            // Defaults were de-duplicated when first seeded
            let _ = self.seed(shortcut.clone());
        }
        self.defaults = defaults;
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod registry_tests;
