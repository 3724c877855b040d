//! Core accelerator types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::keys::{is_key_token, is_standalone_key, translate_key, FUNCTION_KEY_PLACEHOLDER};

pub const COMMAND_OR_CONTROL: &str = "CommandOrControl";
pub const SHIFT: &str = "Shift";
pub const ALT: &str = "Alt";

/// Errors that can occur when validating an accelerator string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcceleratorError {
    #[error("accelerator is empty")]
    Empty,
    #[error("accelerator '{0}' contains an empty token")]
    EmptyToken(String),
    #[error("unknown token '{0}' in accelerator")]
    UnknownToken(String),
    #[error("modifier '{0}' appears more than once")]
    DuplicateModifier(String),
    #[error("accelerator has no key, only modifiers")]
    MissingKey,
    #[error("accelerator has more than one key ('{first}' and '{second}')")]
    MultipleKeys { first: String, second: String },
    #[error("key '{0}' needs at least one modifier")]
    BareKey(String),
    #[error("placeholder '{0}' cannot be combined with modifiers")]
    PlaceholderWithModifiers(String),
}

/// Modifier tiers of an accelerator.
///
/// `command_or_control` is the platform primary modifier:
/// - On macOS: Command (⌘)
/// - On Windows/Linux: Ctrl
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifiers {
    #[serde(default)]
    pub command_or_control: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
}

impl Modifiers {
    pub fn command_or_control() -> Self {
        Self {
            command_or_control: true,
            ..Default::default()
        }
    }
    pub fn any(&self) -> bool {
        self.command_or_control || self.shift || self.alt
    }
    pub fn none(&self) -> bool {
        !self.any()
    }
    pub fn count(&self) -> usize {
        [self.command_or_control, self.shift, self.alt]
            .iter()
            .filter(|held| **held)
            .count()
    }

    /// Tokens in canonical order.
    pub fn tokens(&self) -> Vec<&'static str> {
        let mut tokens = Vec::with_capacity(3);
        if self.command_or_control {
            tokens.push(COMMAND_OR_CONTROL);
        }
        if self.shift {
            tokens.push(SHIFT);
        }
        if self.alt {
            tokens.push(ALT);
        }
        tokens
    }

    /// Set the flag for a canonical modifier token. Returns false if already set.
    fn set_token(&mut self, token: &str) -> bool {
        let slot = match token {
            COMMAND_OR_CONTROL => &mut self.command_or_control,
            SHIFT => &mut self.shift,
            ALT => &mut self.alt,
            _ => return false,
        };
        !std::mem::replace(slot, true)
    }
}

fn is_modifier_token(token: &str) -> bool {
    matches!(token, COMMAND_OR_CONTROL | SHIFT | ALT)
}

/// Map legacy modifier spellings onto canonical tokens.
fn canonical_modifier_alias(token: &str) -> Option<&'static str> {
    match token.to_lowercase().as_str() {
        "commandorcontrol" | "commandorctrl" | "cmdorctrl" | "cmdorcontrol" | "cmd"
        | "command" | "ctrl" | "control" | "meta" | "super" | "⌘" => Some(COMMAND_OR_CONTROL),
        "shift" | "⇧" => Some(SHIFT),
        "alt" | "option" | "opt" | "⌥" => Some(ALT),
        _ => None,
    }
}

/// A validated key combination in canonical form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Accelerator {
    modifiers: Modifiers,
    key: String,
}

impl Accelerator {
    /// Build an accelerator from parts, checking the combination is legal.
    pub fn new(modifiers: Modifiers, key: impl Into<String>) -> Result<Self, AcceleratorError> {
        let key = key.into();
        if is_modifier_token(&key) {
            return Err(AcceleratorError::MissingKey);
        }
        if !is_key_token(&key) {
            return Err(AcceleratorError::UnknownToken(key));
        }
        if key == FUNCTION_KEY_PLACEHOLDER && modifiers.any() {
            return Err(AcceleratorError::PlaceholderWithModifiers(key));
        }
        if modifiers.none() && !is_standalone_key(&key) {
            return Err(AcceleratorError::BareKey(key));
        }
        Ok(Self { modifiers, key })
    }

    /// Parse a wire-format string. Modifier order is free, spelling is exact.
    pub fn parse(s: &str) -> Result<Self, AcceleratorError> {
        Self::parse_with(s, |token| {
            if is_modifier_token(token) {
                Some(Token::Modifier(token.to_string()))
            } else if is_key_token(token) {
                Some(Token::Key(token.to_string()))
            } else {
                None
            }
        })
    }

    /// Parse a stored accelerator that may use legacy spellings
    /// (`Cmd+Shift+K`, `ctrl+alt+space`, `Option+Space`).
    pub fn parse_lenient(s: &str) -> Result<Self, AcceleratorError> {
        Self::parse_with(s, |token| {
            if let Some(modifier) = canonical_modifier_alias(token) {
                Some(Token::Modifier(modifier.to_string()))
            } else {
                translate_key(token).map(Token::Key)
            }
        })
    }

    fn parse_with(
        s: &str,
        classify: impl Fn(&str) -> Option<Token>,
    ) -> Result<Self, AcceleratorError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AcceleratorError::Empty);
        }

        let mut modifiers = Modifiers::default();
        let mut key: Option<String> = None;

        for part in s.split('+') {
            let token = part.trim();
            if token.is_empty() {
                return Err(AcceleratorError::EmptyToken(s.to_string()));
            }
            match classify(token) {
                Some(Token::Modifier(modifier)) => {
                    if !modifiers.set_token(&modifier) {
                        return Err(AcceleratorError::DuplicateModifier(modifier));
                    }
                }
                Some(Token::Key(k)) => {
                    if let Some(first) = key.take() {
                        return Err(AcceleratorError::MultipleKeys { first, second: k });
                    }
                    key = Some(k);
                }
                None => return Err(AcceleratorError::UnknownToken(token.to_string())),
            }
        }

        let key = key.ok_or(AcceleratorError::MissingKey)?;
        Self::new(modifiers, key)
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// True for the "use platform default" placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.key == FUNCTION_KEY_PLACEHOLDER
    }

    /// Same key with a different modifier set, if that combination is legal.
    pub fn with_modifiers(&self, modifiers: Modifiers) -> Option<Self> {
        Self::new(modifiers, self.key.clone()).ok()
    }

    pub fn to_canonical_string(&self) -> String {
        let mut parts: Vec<&str> = self.modifiers.tokens();
        parts.push(&self.key);
        parts.join("+")
    }
}

enum Token {
    Modifier(String),
    Key(String),
}

impl fmt::Display for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl FromStr for Accelerator {
    type Err = AcceleratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Accelerator {
    type Error = AcceleratorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Accelerator> for String {
    fn from(accelerator: Accelerator) -> Self {
        accelerator.to_canonical_string()
    }
}
