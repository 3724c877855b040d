//! Registration outcome aggregation and remediation selection.
//!
//! Individual registration failures are never surfaced one by one. A pass
//! collects them into a `RegistrationReport`, and `FailureClassifier` turns
//! the aggregate into exactly one remediation signal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BindingError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureReason {
    Permission,
    Conflict,
    Unknown,
}

impl From<&BindingError> for FailureReason {
    fn from(error: &BindingError) -> Self {
        match error {
            BindingError::PermissionDenied => Self::Permission,
            BindingError::AlreadyBoundElsewhere => Self::Conflict,
            BindingError::UnsupportedKey(_) | BindingError::Unknown(_) => Self::Unknown,
        }
    }
}

/// One failed binding from a registration pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureRecord {
    pub shortcut_id: String,
    pub reason: FailureReason,
    pub timestamp: DateTime<Utc>,
}

impl FailureRecord {
    pub fn new(shortcut_id: impl Into<String>, reason: FailureReason) -> Self {
        Self {
            shortcut_id: shortcut_id.into(),
            reason,
            timestamp: Utc::now(),
        }
    }
}

/// Outcome of one `register_all` pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistrationReport {
    /// Enabled shortcuts the pass attempted (safe-mode skips excluded)
    pub total: usize,
    /// Ids bound at the OS level, in table order
    pub registered: Vec<String>,
    pub failures: Vec<FailureRecord>,
    /// Ids skipped by safe mode
    pub skipped: Vec<String>,
    pub cancelled: bool,
}

impl RegistrationReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        !self.cancelled && self.failures.is_empty()
    }

    pub fn failure_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.failed() as f64 / self.total as f64
        }
    }
}

/// Which remediation flow a failed pass should trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Remediation {
    /// No session has ever completed; onboarding takes precedence
    FirstLaunchWizard,
    /// Too many failures to be binding-level conflicts
    PermissionCheck,
    /// Offer per-shortcut alternatives
    ConflictSuggestions,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FailureClassifier {
    threshold: f64,
}

impl Default for FailureClassifier {
    fn default() -> Self {
        Self::new(crate::config::defaults::DEFAULT_PERMISSION_FAILURE_THRESHOLD)
    }
}

impl FailureClassifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Pick the remediation for `failed` of `total` bindings.
    ///
    /// Returns `None` when nothing failed.
    pub fn classify(
        &self,
        failed: usize,
        total: usize,
        session_completed: bool,
    ) -> Option<Remediation> {
        if failed == 0 {
            return None;
        }
        if !session_completed {
            return Some(Remediation::FirstLaunchWizard);
        }
        // A zero total with failures cannot happen in a pass; treat it as systemic
        let ratio = if total == 0 {
            1.0
        } else {
            failed as f64 / total as f64
        };
        if ratio > self.threshold {
            Some(Remediation::PermissionCheck)
        } else {
            Some(Remediation::ConflictSuggestions)
        }
    }
}
