//! Configuration module - Engine settings
//!
//! This module provides functionality for:
//! - Loading configuration from ~/.accelerator-kit/config.json
//! - Default values for all settings
//! - Type definitions for config structures
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions
//! - `loader` - File system loading and parsing

pub mod defaults;
mod loader;
mod types;

// Re-export types that are used externally
pub use types::Config;

// Re-export loader
pub use loader::{default_config_path, load_config, load_config_from};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
