use thiserror::Error;
use tracing::{error, warn};

use crate::accelerator::AcceleratorError;
use crate::shortcuts::PersistenceError;

/// Rejections of a requested registry mutation.
///
/// These are surfaced synchronously and leave the registry untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShortcutError {
    #[error("invalid accelerator: {0}")]
    Validation(#[from] AcceleratorError),

    #[error("'{accelerator}' is already used by '{owner_id}'")]
    Conflict {
        accelerator: String,
        owner_id: String,
    },

    #[error("'{accelerator}' is reserved by the operating system")]
    Reserved { accelerator: String },

    #[error("unknown shortcut '{0}'")]
    UnknownShortcut(String),

    #[error("a shortcut with id '{0}' already exists")]
    DuplicateId(String),

    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
}

impl ShortcutError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Structured outcome of a failed OS binding call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("the operating system denied hotkey access")]
    PermissionDenied,

    #[error("the combination is already bound by another application")]
    AlreadyBoundElsewhere,

    #[error("key '{0}' cannot be bound on this platform")]
    UnsupportedKey(String),

    #[error("hotkey registration failed: {0}")]
    Unknown(String),
}

impl BindingError {
    /// Coarse signal distinguishing permission-like failures from the rest.
    pub fn is_permission_like(&self) -> bool {
        matches!(self, Self::PermissionDenied)
    }
}

/// Errors from engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Shortcut(#[from] ShortcutError),

    #[error("registration pass was cancelled")]
    Cancelled,

    #[error("binding store error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("could not read bindings: {0}")]
    Import(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the user doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use accelerator_kit::error::ResultExt;
///
/// // Fall back to defaults if the store cannot be read
/// let overrides = store.load().log_err().unwrap_or_default();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = %err,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = %err,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation warning"
                );
                None
            }
        }
    }
}
