//! Configuration loading from file system
//!
//! Handles reading and parsing the config.json file.

use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use super::defaults::DEFAULT_CONFIG_PATH;
use super::types::Config;

pub fn default_config_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde(DEFAULT_CONFIG_PATH).as_ref())
}

/// Load configuration from ~/.accelerator-kit/config.json
///
/// Returns Config::default() if the file is missing or malformed.
pub fn load_config() -> Config {
    load_config_from(&default_config_path())
}

/// Load configuration from `path`, falling back to defaults on any error.
#[instrument(name = "load_config", fields(path = %path.display()))]
pub fn load_config_from(path: &Path) -> Config {
    // Check if config file exists
    if !path.exists() {
        info!("Config file not found, using defaults");
        return Config::default();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(error = %e, "Failed to read config file, using defaults");
            return Config::default();
        }
    };

    match serde_json::from_str::<Config>(&content) {
        Ok(config) => {
            info!("Successfully loaded config");
            config
        }
        Err(e) => {
            // Provide helpful error message for common config mistakes
            let error_hint = if e.to_string().contains("placeholderCandidates") {
                "\n\nHint: 'placeholderCandidates' must be an array of accelerator strings, e.g. [\"Alt+Space\"]"
            } else if e.to_string().contains("permissionFailureThreshold") {
                "\n\nHint: 'permissionFailureThreshold' is a ratio between 0.0 and 1.0"
            } else {
                ""
            };

            warn!(
                error = %e,
                hint = %error_hint,
                "Failed to parse config JSON, using defaults"
            );
            Config::default()
        }
    }
}
