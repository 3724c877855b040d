//! Accelerator Kit - global keyboard shortcut engine
//!
//! Owns a table of named shortcuts, validates and persists user
//! customization, binds them as OS-wide hotkeys, and turns registration
//! failures into a single remediation signal.

pub mod accelerator;
pub mod binding;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod failure;
pub mod logging;
pub mod shortcuts;
pub mod store;

pub use accelerator::{Accelerator, AcceleratorError, Modifiers};
pub use engine::{AcceleratorEngine, CancellationToken, EngineSettings, ShortcutStatus};
pub use error::{BindingError, EngineError, ShortcutError};
pub use events::{AppEvent, EventBus, EventKind};
pub use failure::{FailureClassifier, FailureReason, RegistrationReport, Remediation};
