//! Named shortcut table.
//!
//! This module provides:
//! - The compiled-in default shortcuts
//! - A registry with rebind/toggle/search operations
//! - Conflict detection and alternative suggestions
//! - User customization persistence
//!
//! # Example
//!
//! ```ignore
//! use accelerator_kit::shortcuts::{default_shortcuts, ShortcutRegistry};
//!
//! let mut registry = ShortcutRegistry::with_defaults(default_shortcuts())?;
//! registry.rebind("toggle-recording", "CommandOrControl+Alt+R", &resolved)?;
//! ```

mod conflict;
mod defaults;
mod persistence;
mod registry;
mod types;

pub use conflict::{is_reserved, Alternative, ConflictResolver, ShortcutConflict, RESERVED_ACCELERATORS};
pub use defaults::{
    default_shortcuts, find_preset, parse_candidates, ShortcutPreset, DEFAULT_PLACEHOLDER_CANDIDATES,
    PRESETS,
};
pub use persistence::{BindingOverride, FailureSnapshot, PersistenceError, ShortcutStore};
pub use registry::ShortcutRegistry;
pub use types::{BindingState, Shortcut, ShortcutAction, ShortcutCategory};
