//! Key token tables.

/// Named key tokens that may follow one or more modifiers.
pub const NAMED_KEYS: &[&str] = &[
    "Space",
    "Comma",
    "Period",
    "Slash",
    "Semicolon",
    "Quote",
    "BracketLeft",
    "BracketRight",
    "Backslash",
    "Minus",
    "Equal",
    "Backquote",
    "Up",
    "Down",
    "Left",
    "Right",
    "Return",
    "Backspace",
    "Delete",
    "Escape",
    "Tab",
];

/// Placeholder meaning "use the platform default binding".
///
/// Legal on its own, never registered as-is: it is resolved to a concrete
/// candidate before reaching the OS.
pub const FUNCTION_KEY_PLACEHOLDER: &str = "Fn";

/// Keys that are legal without any modifier.
pub const STANDALONE_KEYS: &[&str] = &[
    "MediaPlayPause",
    "MediaNextTrack",
    "MediaPreviousTrack",
    "MediaStop",
    "F13",
    "F14",
    "F15",
    "F16",
    "F17",
    "F18",
    "F19",
    "F20",
    "CapsLock",
    FUNCTION_KEY_PLACEHOLDER,
];

/// A single uppercase ASCII letter or a digit.
fn is_single_char_key(token: &str) -> bool {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.is_ascii_uppercase() || c.is_ascii_digit(),
        _ => false,
    }
}

pub fn is_standalone_key(token: &str) -> bool {
    STANDALONE_KEYS.contains(&token)
}

/// Check if a token is a legal key position token in the wire format.
pub fn is_key_token(token: &str) -> bool {
    NAMED_KEYS.contains(&token) || is_standalone_key(token) || is_single_char_key(token)
}

/// Translate a raw key identifier (as reported by a key event) into a wire token.
///
/// Returns `None` when the key has no representation in the wire format.
pub fn translate_key(raw: &str) -> Option<String> {
    // Space is reported as a literal blank by most event sources
    if raw == " " {
        return Some("Space".to_string());
    }
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let lower = raw.to_lowercase();
    let mapped = match lower.as_str() {
        "space" | "spacebar" => "Space",
        "," | "comma" => "Comma",
        "." | "period" | "dot" => "Period",
        "/" | "slash" | "forwardslash" => "Slash",
        ";" | "semicolon" => "Semicolon",
        "'" | "quote" | "apostrophe" => "Quote",
        "[" | "bracketleft" | "leftbracket" => "BracketLeft",
        "]" | "bracketright" | "rightbracket" => "BracketRight",
        "\\" | "backslash" => "Backslash",
        "-" | "minus" | "dash" | "hyphen" => "Minus",
        "=" | "equal" | "equals" => "Equal",
        "`" | "backquote" | "backtick" | "grave" => "Backquote",
        "arrowup" | "up" | "uparrow" => "Up",
        "arrowdown" | "down" | "downarrow" => "Down",
        "arrowleft" | "left" | "leftarrow" => "Left",
        "arrowright" | "right" | "rightarrow" => "Right",
        "enter" | "return" => "Return",
        "backspace" | "back" => "Backspace",
        "delete" | "del" => "Delete",
        "escape" | "esc" => "Escape",
        "tab" => "Tab",
        "mediaplaypause" => "MediaPlayPause",
        "mediatracknext" | "medianexttrack" => "MediaNextTrack",
        "mediatrackprevious" | "mediaprevioustrack" => "MediaPreviousTrack",
        "mediastop" => "MediaStop",
        "capslock" => "CapsLock",
        "fn" | "function" => FUNCTION_KEY_PLACEHOLDER,
        "f13" => "F13",
        "f14" => "F14",
        "f15" => "F15",
        "f16" => "F16",
        "f17" => "F17",
        "f18" => "F18",
        "f19" => "F19",
        "f20" => "F20",
        _ => {
            let upper = raw.to_uppercase();
            // DOM-style codes: KeyA, Digit1
            let stripped = upper
                .strip_prefix("KEY")
                .or_else(|| upper.strip_prefix("DIGIT"))
                .filter(|rest| rest.chars().count() == 1)
                .unwrap_or(&upper);
            return is_single_char_key(stripped).then(|| stripped.to_string());
        }
    };
    Some(mapped.to_string())
}
