//! Accelerator validation.
//!
//! A string is a legal binding iff either:
//! - it has at least two tokens, at least one modifier and exactly one key, or
//! - it is a single token from the standalone allow-list (media keys,
//!   `F13`-`F20`, `CapsLock`, the `Fn` placeholder).
//!
//! Validation runs before any registry mutation is attempted.

use super::types::{Accelerator, AcceleratorError};

/// Validate a wire-format accelerator, returning its canonical form.
pub fn validate(s: &str) -> Result<Accelerator, AcceleratorError> {
    Accelerator::parse(s)
}

pub fn is_valid(s: &str) -> bool {
    validate(s).is_ok()
}
