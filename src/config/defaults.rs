//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Default config file location (tilde-expanded at load time)
pub const DEFAULT_CONFIG_PATH: &str = "~/.accelerator-kit/config.json";

/// Directory under the home dir holding the binding store and logs
pub const DEFAULT_DATA_DIR_NAME: &str = ".accelerator-kit";

/// Skip disruptive system shortcuts (hide/minimize/reload window)
pub const DEFAULT_SAFE_MODE: bool = false;

/// Failure ratio above which a pass is treated as a permission problem
pub const DEFAULT_PERMISSION_FAILURE_THRESHOLD: f64 = 0.5;

/// Candidates checked by `suggest_alternative` before giving up
pub const DEFAULT_MAX_SUGGESTION_ATTEMPTS: usize = 4;

/// Bound of the OS trigger queue
pub const DEFAULT_TRIGGER_QUEUE_CAPACITY: usize = 32;

/// Default tracing filter directive
pub const DEFAULT_LOG_FILTER: &str = "info";
