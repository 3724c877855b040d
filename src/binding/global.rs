use global_hotkey::{
    hotkey::{Code, HotKey, Modifiers},
    Error as HotkeyError, GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

use crate::accelerator::{Accelerator, FUNCTION_KEY_PLACEHOLDER};
use crate::error::BindingError;

use super::{HotkeyBackend, TriggerCallback};

/// Hotkey id -> (accelerator, callback), shared with the listener thread.
type TriggerMap = HashMap<u32, (Accelerator, TriggerCallback)>;

/// Registers accelerators with the OS through `global-hotkey`.
///
/// NOTE: On macOS the manager must be created on the main thread and events
/// are only delivered while that thread runs an event loop.
pub struct GlobalHotkeyBackend {
    manager: GlobalHotKeyManager,
    /// Accelerator -> HotKey object (needed for proper unregistration)
    hotkeys: HashMap<Accelerator, HotKey>,
    triggers: Arc<RwLock<TriggerMap>>,
}

impl GlobalHotkeyBackend {
    pub fn new() -> Result<Self, BindingError> {
        let manager = GlobalHotKeyManager::new().map_err(|e| map_hotkey_error(&e))?;
        let triggers = Arc::new(RwLock::new(HashMap::new()));
        spawn_listener(Arc::downgrade(&triggers));
        info!(category = "HOTKEY", "Global hotkey manager ready");
        Ok(Self {
            manager,
            hotkeys: HashMap::new(),
            triggers,
        })
    }

    pub fn is_registered(&self, accelerator: &Accelerator) -> bool {
        self.hotkeys.contains_key(accelerator)
    }
}

impl HotkeyBackend for GlobalHotkeyBackend {
    fn register(
        &mut self,
        accelerator: &Accelerator,
        on_trigger: TriggerCallback,
    ) -> Result<(), BindingError> {
        let hotkey = to_hotkey(accelerator)?;
        let hotkey_id = hotkey.id();

        self.manager
            .register(hotkey)
            .map_err(|e| map_hotkey_error(&e))?;

        self.hotkeys.insert(accelerator.clone(), hotkey);
        self.triggers
            .write()
            .insert(hotkey_id, (accelerator.clone(), on_trigger));

        debug!(
            category = "HOTKEY",
            accelerator = %accelerator,
            hotkey_id,
            "Registered global hotkey"
        );
        Ok(())
    }

    fn unregister(&mut self, accelerator: &Accelerator) -> Result<(), BindingError> {
        let Some(hotkey) = self.hotkeys.remove(accelerator) else {
            return Ok(());
        };
        self.triggers.write().remove(&hotkey.id());

        // Internal tracking is already updated; the OS call failing only leaves a dead hotkey
        if let Err(e) = self.manager.unregister(hotkey) {
            warn!(
                category = "HOTKEY",
                accelerator = %accelerator,
                error = %e,
                "Failed to unregister hotkey"
            );
            return Err(map_hotkey_error(&e));
        }
        debug!(category = "HOTKEY", accelerator = %accelerator, "Unregistered global hotkey");
        Ok(())
    }

    fn unregister_all(&mut self) -> Result<(), BindingError> {
        let hotkeys: Vec<HotKey> = self.hotkeys.drain().map(|(_, hotkey)| hotkey).collect();
        self.triggers.write().clear();
        if hotkeys.is_empty() {
            return Ok(());
        }
        let count = hotkeys.len();
        let mut first_error = None;
        for hotkey in hotkeys {
            if let Err(e) = self.manager.unregister(hotkey) {
                warn!(
                    category = "HOTKEY",
                    hotkey_id = hotkey.id(),
                    error = %e,
                    "Failed to unregister hotkey"
                );
                first_error.get_or_insert_with(|| map_hotkey_error(&e));
            }
        }
        info!(category = "HOTKEY", count, "Unregistered all global hotkeys");
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "global-hotkey"
    }
}

impl Drop for GlobalHotkeyBackend {
    fn drop(&mut self) {
        if let Err(e) = self.unregister_all() {
            warn!(category = "HOTKEY", error = %e, "Failed to release hotkeys on drop");
        }
    }
}

/// Forward pressed events to the callback of the matching hotkey.
///
/// Exits once the backend owning `triggers` is dropped.
fn spawn_listener(triggers: Weak<RwLock<TriggerMap>>) {
    std::thread::spawn(move || {
        let receiver = GlobalHotKeyEvent::receiver();
        while let Ok(event) = receiver.recv() {
            // Only respond to key PRESS, not release
            if event.state != HotKeyState::Pressed {
                continue;
            }
            let Some(triggers) = triggers.upgrade() else {
                break;
            };
            let entry = triggers.read().get(&event.id).cloned();
            match entry {
                Some((accelerator, callback)) => {
                    debug!(category = "HOTKEY", accelerator = %accelerator, "Hotkey pressed");
                    callback(&accelerator);
                }
                None => debug!(category = "HOTKEY", hotkey_id = event.id, "Unknown hotkey id"),
            }
        }
        debug!(category = "HOTKEY", "Hotkey listener stopped");
    });
}

/// Map a `global-hotkey` error to a structured outcome.
fn map_hotkey_error(e: &HotkeyError) -> BindingError {
    match e {
        HotkeyError::AlreadyRegistered(_) => BindingError::AlreadyBoundElsewhere,
        HotkeyError::FailedToRegister(msg) => {
            // macOS and X11 report a grab held by another client this way
            BindingError::Unknown(msg.clone())
        }
        HotkeyError::OsError(os_err) if os_err.kind() == std::io::ErrorKind::PermissionDenied => {
            BindingError::PermissionDenied
        }
        other => BindingError::Unknown(other.to_string()),
    }
}

/// CommandOrControl is Cmd on macOS and Ctrl elsewhere.
fn primary_modifier() -> Modifiers {
    if cfg!(target_os = "macos") {
        Modifiers::META
    } else {
        Modifiers::CONTROL
    }
}

fn to_hotkey(accelerator: &Accelerator) -> Result<HotKey, BindingError> {
    let code = key_code(accelerator.key())
        .ok_or_else(|| BindingError::UnsupportedKey(accelerator.key().to_string()))?;

    let m = accelerator.modifiers();
    let mut modifiers = Modifiers::empty();
    if m.command_or_control {
        modifiers |= primary_modifier();
    }
    if m.shift {
        modifiers |= Modifiers::SHIFT;
    }
    if m.alt {
        modifiers |= Modifiers::ALT;
    }

    let modifiers = if modifiers.is_empty() {
        None
    } else {
        Some(modifiers)
    };
    Ok(HotKey::new(modifiers, code))
}

const LETTER_CODES: [Code; 26] = [
    Code::KeyA,
    Code::KeyB,
    Code::KeyC,
    Code::KeyD,
    Code::KeyE,
    Code::KeyF,
    Code::KeyG,
    Code::KeyH,
    Code::KeyI,
    Code::KeyJ,
    Code::KeyK,
    Code::KeyL,
    Code::KeyM,
    Code::KeyN,
    Code::KeyO,
    Code::KeyP,
    Code::KeyQ,
    Code::KeyR,
    Code::KeyS,
    Code::KeyT,
    Code::KeyU,
    Code::KeyV,
    Code::KeyW,
    Code::KeyX,
    Code::KeyY,
    Code::KeyZ,
];

const DIGIT_CODES: [Code; 10] = [
    Code::Digit0,
    Code::Digit1,
    Code::Digit2,
    Code::Digit3,
    Code::Digit4,
    Code::Digit5,
    Code::Digit6,
    Code::Digit7,
    Code::Digit8,
    Code::Digit9,
];

/// Convert a canonical key token to a `global_hotkey` code.
///
/// The `Fn` placeholder has no code; it must be resolved before registration.
fn key_code(key: &str) -> Option<Code> {
    if key == FUNCTION_KEY_PLACEHOLDER {
        return None;
    }
    if let [c] = key.as_bytes() {
        return match c {
            b'A'..=b'Z' => Some(LETTER_CODES[(c - b'A') as usize]),
            b'0'..=b'9' => Some(DIGIT_CODES[(c - b'0') as usize]),
            _ => None,
        };
    }
    let code = match key {
        "Space" => Code::Space,
        "Comma" => Code::Comma,
        "Period" => Code::Period,
        "Slash" => Code::Slash,
        "Semicolon" => Code::Semicolon,
        "Quote" => Code::Quote,
        "BracketLeft" => Code::BracketLeft,
        "BracketRight" => Code::BracketRight,
        "Backslash" => Code::Backslash,
        "Minus" => Code::Minus,
        "Equal" => Code::Equal,
        "Backquote" => Code::Backquote,
        "Up" => Code::ArrowUp,
        "Down" => Code::ArrowDown,
        "Left" => Code::ArrowLeft,
        "Right" => Code::ArrowRight,
        "Return" => Code::Enter,
        "Backspace" => Code::Backspace,
        "Delete" => Code::Delete,
        "Escape" => Code::Escape,
        "Tab" => Code::Tab,
        "MediaPlayPause" => Code::MediaPlayPause,
        "MediaNextTrack" => Code::MediaTrackNext,
        "MediaPreviousTrack" => Code::MediaTrackPrevious,
        "MediaStop" => Code::MediaStop,
        "F13" => Code::F13,
        "F14" => Code::F14,
        "F15" => Code::F15,
        "F16" => Code::F16,
        "F17" => Code::F17,
        "F18" => Code::F18,
        "F19" => Code::F19,
        "F20" => Code::F20,
        "CapsLock" => Code::CapsLock,
        _ => return None,
    };
    Some(code)
}
