//! Conflict detection and alternative suggestions.
//!
//! A conflict is two *enabled* shortcuts sharing an effective accelerator.
//! The effective accelerator of a placeholder shortcut is whatever it was
//! resolved to; every other shortcut uses its stored accelerator.

use std::collections::HashMap;

use crate::accelerator::{Accelerator, Modifiers};

use super::types::Shortcut;

/// Combinations the operating system keeps for itself.
pub const RESERVED_ACCELERATORS: &[&str] = &[
    "CommandOrControl+Space",
    "CommandOrControl+Tab",
    "CommandOrControl+Shift+Tab",
    "CommandOrControl+Q",
    "CommandOrControl+W",
    "CommandOrControl+A",
    "CommandOrControl+C",
    "CommandOrControl+V",
    "CommandOrControl+X",
    "CommandOrControl+Z",
    "CommandOrControl+S",
    "CommandOrControl+Shift+3",
    "CommandOrControl+Shift+4",
    "CommandOrControl+Shift+5",
    "Alt+Tab",
];

pub fn is_reserved(accelerator: &Accelerator) -> bool {
    let canonical = accelerator.to_canonical_string();
    RESERVED_ACCELERATORS.contains(&canonical.as_str())
}

/// Two enabled shortcuts bound to the same accelerator.
///
/// The winner is the one that comes first in table order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortcutConflict {
    pub accelerator: Accelerator,
    pub winner_id: String,
    pub loser_id: String,
}

/// Outcome of looking for an alternative binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Alternative {
    Found(Accelerator),
    /// Every candidate tried was taken, reserved, or illegal.
    Exhausted { attempts: usize },
}

impl Alternative {
    pub fn found(&self) -> Option<&Accelerator> {
        match self {
            Self::Found(accelerator) => Some(accelerator),
            Self::Exhausted { .. } => None,
        }
    }
}

/// Read-only view over the shortcut table used to answer conflict questions.
pub struct ConflictResolver<'a> {
    shortcuts: &'a [Shortcut],
    resolved: &'a HashMap<String, Accelerator>,
}

impl<'a> ConflictResolver<'a> {
    pub fn new(shortcuts: &'a [Shortcut], resolved: &'a HashMap<String, Accelerator>) -> Self {
        Self {
            shortcuts,
            resolved,
        }
    }

    pub fn effective_accelerator(&self, shortcut: &'a Shortcut) -> &'a Accelerator {
        if shortcut.accelerator.is_placeholder() {
            if let Some(resolved) = self.resolved.get(&shortcut.id) {
                return resolved;
            }
        }
        &shortcut.accelerator
    }

    /// The enabled shortcut (other than `exclude_id`) that owns `accelerator`.
    pub fn owner_of(&self, accelerator: &Accelerator, exclude_id: &str) -> Option<&'a Shortcut> {
        self.shortcuts.iter().find(|shortcut| {
            shortcut.enabled
                && shortcut.id != exclude_id
                && self.effective_accelerator(shortcut) == accelerator
        })
    }

    /// True iff no *other enabled* shortcut currently owns `accelerator`.
    pub fn is_free(&self, accelerator: &Accelerator, exclude_id: &str) -> bool {
        self.owner_of(accelerator, exclude_id).is_none()
    }

    /// Pick a concrete accelerator for a placeholder shortcut.
    ///
    /// Walks `candidates` in order and returns the first one that is free.
    /// When all are taken the first candidate is returned anyway; the
    /// registration attempt that follows surfaces the collision.
    /// Non-placeholder shortcuts resolve to their own accelerator.
    pub fn resolve_placeholder(
        &self,
        shortcut_id: &str,
        candidates: &[Accelerator],
    ) -> Option<Accelerator> {
        let shortcut = self.shortcuts.iter().find(|s| s.id == shortcut_id)?;
        if !shortcut.accelerator.is_placeholder() {
            return Some(shortcut.accelerator.clone());
        }

        let chosen = candidates
            .iter()
            .find(|candidate| self.is_free(candidate, shortcut_id))
            .or_else(|| candidates.first())?;

        if !self.is_free(chosen, shortcut_id) {
            tracing::warn!(
                category = "SHORTCUT",
                shortcut_id,
                accelerator = %chosen,
                "Every placeholder candidate is taken, falling back to the first"
            );
        }
        Some(chosen.clone())
    }

    /// Propose a structurally different, valid and free accelerator.
    ///
    /// Candidates promote or add a modifier tier (insert `Shift`, swap
    /// `Shift` for `Alt`, add `Alt`, add `CommandOrControl`, all three).
    /// At most `max_attempts` candidates are checked.
    pub fn suggest_alternative(
        &self,
        accelerator: &Accelerator,
        exclude_id: &str,
        max_attempts: usize,
    ) -> Alternative {
        let mut attempts = 0;
        for candidate in alternative_candidates(accelerator)
            .into_iter()
            .take(max_attempts)
        {
            attempts += 1;
            if is_reserved(&candidate) {
                continue;
            }
            if self.is_free(&candidate, exclude_id) {
                return Alternative::Found(candidate);
            }
        }
        Alternative::Exhausted { attempts }
    }

    /// Find all pairs of enabled shortcuts sharing an effective accelerator.
    pub fn find_conflicts(&self) -> Vec<ShortcutConflict> {
        let mut owners: HashMap<&Accelerator, &str> = HashMap::new();
        let mut conflicts = Vec::new();

        for shortcut in self.shortcuts.iter().filter(|s| s.enabled) {
            let accelerator = self.effective_accelerator(shortcut);
            match owners.get(accelerator) {
                Some(winner) => conflicts.push(ShortcutConflict {
                    accelerator: accelerator.clone(),
                    winner_id: winner.to_string(),
                    loser_id: shortcut.id.clone(),
                }),
                None => {
                    owners.insert(accelerator, &shortcut.id);
                }
            }
        }

        conflicts
    }
}

/// Candidate alternatives for `accelerator`, in preference order.
fn alternative_candidates(accelerator: &Accelerator) -> Vec<Accelerator> {
    let m = accelerator.modifiers();
    let mut tiers: Vec<Modifiers> = Vec::new();

    if !m.shift {
        tiers.push(Modifiers { shift: true, ..m });
    }
    if m.shift && !m.alt {
        tiers.push(Modifiers {
            shift: false,
            alt: true,
            ..m
        });
    }
    if !m.alt {
        tiers.push(Modifiers { alt: true, ..m });
    }
    if !m.command_or_control {
        tiers.push(Modifiers {
            command_or_control: true,
            ..m
        });
    }
    tiers.push(Modifiers {
        command_or_control: true,
        shift: true,
        alt: true,
    });

    let mut candidates: Vec<Accelerator> = Vec::new();
    for tier in tiers {
        if let Some(candidate) = accelerator.with_modifiers(tier) {
            if &candidate != accelerator && !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}
