//! Raw key input to canonical accelerators.
//!
//! Modifier tokens are always emitted as `CommandOrControl`, `Shift`, `Alt`,
//! whatever order they were physically pressed in, so two recordings of the
//! same combination always normalize identically.

use tracing::debug;

use super::keys::translate_key;
use super::types::{Accelerator, AcceleratorError, Modifiers};

/// Check if a raw key identifier names a modifier key.
pub fn is_modifier_key(key: &str) -> bool {
    matches!(
        key.to_lowercase().as_str(),
        "shift"
            | "control"
            | "ctrl"
            | "alt"
            | "option"
            | "opt"
            | "meta"
            | "command"
            | "cmd"
            | "super"
            | "win"
            | "os"
            | "altgraph"
    )
}

/// A raw key-press event: modifier flags plus the key identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyEvent {
    /// Command key (macOS) / Super key
    pub meta: bool,
    pub ctrl: bool,
    pub shift: bool,
    /// Option/Alt key
    pub alt: bool,
    pub key: String,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// Meta and Control both collapse into `CommandOrControl`.
    pub fn modifiers(&self) -> Modifiers {
        Modifiers {
            command_or_control: self.meta || self.ctrl,
            shift: self.shift,
            alt: self.alt,
        }
    }

    pub fn to_accelerator(&self) -> Result<Accelerator, AcceleratorError> {
        if self.key.trim().is_empty() && self.key != " " {
            return Err(AcceleratorError::MissingKey);
        }
        if is_modifier_key(&self.key) {
            return Err(AcceleratorError::MissingKey);
        }
        let key = translate_key(&self.key)
            .ok_or_else(|| AcceleratorError::UnknownToken(self.key.clone()))?;
        Accelerator::new(self.modifiers(), key)
    }
}

/// Records a combination from a stream of key-down/key-up events.
///
/// Each physical modifier is tracked on its own while held, so releasing
/// Meta does not drop a Control that is still down. The first non-modifier
/// key completes the recording.
#[derive(Clone, Debug, Default)]
pub struct KeyRecorder {
    pressed: KeyEvent,
}

impl KeyRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently held modifiers (for live display before the final key).
    pub fn held(&self) -> Modifiers {
        self.pressed.modifiers()
    }

    /// Feed a key-down. Returns the recorded accelerator once a non-modifier
    /// key arrives, or `None` while only modifiers are held.
    pub fn key_down(&mut self, key: &str) -> Option<Result<Accelerator, AcceleratorError>> {
        if let Some(slot) = self.modifier_slot(key) {
            *slot = true;
            debug!(
                category = "SHORTCUT",
                key,
                held = ?self.held(),
                "Modifier key pressed"
            );
            return None;
        }

        let event = KeyEvent {
            key: key.to_string(),
            ..std::mem::take(&mut self.pressed)
        };
        let result = event.to_accelerator();
        if let Ok(ref accelerator) = result {
            debug!(category = "SHORTCUT", accelerator = %accelerator, "Recorded accelerator");
        }
        Some(result)
    }

    pub fn key_up(&mut self, key: &str) {
        if let Some(slot) = self.modifier_slot(key) {
            *slot = false;
        }
    }

    pub fn clear(&mut self) {
        self.pressed = KeyEvent::default();
    }

    fn modifier_slot(&mut self, key: &str) -> Option<&mut bool> {
        if !is_modifier_key(key) {
            return None;
        }
        Some(match key.to_lowercase().as_str() {
            "shift" => &mut self.pressed.shift,
            "alt" | "option" | "opt" | "altgraph" => &mut self.pressed.alt,
            "control" | "ctrl" => &mut self.pressed.ctrl,
            _ => &mut self.pressed.meta,
        })
    }
}
