//! Accelerator wire format.
//!
//! This module provides:
//! - `Accelerator` - a validated, canonically ordered key combination
//! - `Modifiers` - the three canonical modifier tiers
//! - `KeyEvent` / `KeyRecorder` - raw key input turned into accelerators
//! - Validation against the accelerator grammar
//!
//! # Wire format
//!
//! Tokens are joined by `+`. Modifiers always come first, in the fixed order
//! `CommandOrControl`, `Shift`, `Alt`, followed by exactly one key token:
//!
//! ```ignore
//! use accelerator_kit::accelerator::Accelerator;
//!
//! let accel: Accelerator = "Shift+CommandOrControl+R".parse()?;
//! assert_eq!(accel.to_string(), "CommandOrControl+Shift+R");
//! ```

mod keys;
mod parser;
mod types;
mod validator;


pub use keys::{
    is_key_token, is_standalone_key, translate_key, NAMED_KEYS, STANDALONE_KEYS,
    FUNCTION_KEY_PLACEHOLDER,
};
pub use parser::{is_modifier_key, KeyEvent, KeyRecorder};
pub use types::{Accelerator, AcceleratorError, Modifiers, ALT, COMMAND_OR_CONTROL, SHIFT};
pub use validator::{is_valid, validate};
