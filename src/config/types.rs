//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use super::defaults::*;
use crate::accelerator::Accelerator;
use crate::shortcuts::{parse_candidates, DEFAULT_PLACEHOLDER_CANDIDATES};

/// Engine configuration. Every field is optional; accessors apply defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Skip hide/minimize/reload system shortcuts (default: false)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_mode: Option<bool>,
    /// Failure ratio above which a pass suggests a permission check (default: 0.5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_failure_threshold: Option<f64>,
    /// Candidates checked when suggesting an alternative accelerator (default: 4)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_suggestion_attempts: Option<usize>,
    /// Ordered concrete accelerators for the `Fn` placeholder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder_candidates: Option<Vec<String>>,
    /// Store and log directory (default: ~/.accelerator-kit)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// tracing EnvFilter directive, e.g. "info,accelerator_kit=debug"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
    /// Bound of the OS trigger queue (default: 32)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_queue_capacity: Option<usize>,
}

impl Config {
    pub fn get_safe_mode(&self) -> bool {
        self.safe_mode.unwrap_or(DEFAULT_SAFE_MODE)
    }

    /// Returns the threshold clamped to [0.0, 1.0]
    pub fn get_permission_failure_threshold(&self) -> f64 {
        match self.permission_failure_threshold {
            Some(t) if t.is_finite() => t.clamp(0.0, 1.0),
            Some(t) => {
                warn!(threshold = t, "Ignoring non-finite permissionFailureThreshold");
                DEFAULT_PERMISSION_FAILURE_THRESHOLD
            }
            None => DEFAULT_PERMISSION_FAILURE_THRESHOLD,
        }
    }

    pub fn get_max_suggestion_attempts(&self) -> usize {
        self.max_suggestion_attempts
            .unwrap_or(DEFAULT_MAX_SUGGESTION_ATTEMPTS)
    }

    /// Parsed placeholder candidates. Falls back to the built-in list when
    /// none are configured or none of the configured ones are usable.
    pub fn get_placeholder_candidates(&self) -> Vec<Accelerator> {
        if let Some(configured) = &self.placeholder_candidates {
            let parsed = parse_candidates(configured);
            if !parsed.is_empty() {
                return parsed;
            }
            warn!("No usable placeholderCandidates configured, using defaults");
        }
        parse_candidates(DEFAULT_PLACEHOLDER_CANDIDATES)
    }

    /// `dataDir` with `~` expanded, else `~/.accelerator-kit`
    pub fn get_data_dir(&self) -> PathBuf {
        match self.data_dir.as_deref() {
            Some(dir) => PathBuf::from(shellexpand::tilde(dir).as_ref()),
            None => dirs::home_dir()
                .map(|home| home.join(DEFAULT_DATA_DIR_NAME))
                .unwrap_or_else(|| std::env::temp_dir().join("accelerator-kit")),
        }
    }

    pub fn get_log_filter(&self) -> String {
        self.log_filter
            .clone()
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
    }

    /// Never zero; `async_channel::bounded` panics on a zero capacity
    pub fn get_trigger_queue_capacity(&self) -> usize {
        self.trigger_queue_capacity
            .unwrap_or(DEFAULT_TRIGGER_QUEUE_CAPACITY)
            .max(1)
    }

    pub fn store_path(&self) -> PathBuf {
        self.get_data_dir().join("store.json")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.get_data_dir().join("logs")
    }
}
