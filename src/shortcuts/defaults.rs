//! Compiled-in default shortcut table and named presets.

use std::collections::HashMap;

use serde::Serialize;

use crate::accelerator::Accelerator;

use super::persistence::BindingOverride;
use super::types::{Shortcut, ShortcutAction, ShortcutCategory};

/// (id, name, description, accelerator, category, action)
const DEFAULT_TABLE: &[(
    &str,
    &str,
    &str,
    &str,
    ShortcutCategory,
    ShortcutAction,
)] = &[
    (
        "toggle-recording",
        "Toggle Recording",
        "Start or stop recording",
        "CommandOrControl+Shift+R",
        ShortcutCategory::Recording,
        ShortcutAction::ToggleRecording,
    ),
    (
        "quick-transcribe",
        "Quick Transcribe",
        "Dictate into the focused application",
        "Fn",
        ShortcutCategory::Recording,
        ShortcutAction::QuickTranscribe,
    ),
    (
        "open-ai-assistant",
        "Open AI Assistant",
        "Open the assistant panel",
        "CommandOrControl+Shift+A",
        ShortcutCategory::Navigation,
        ShortcutAction::OpenAiAssistant,
    ),
    (
        "switch-to-history",
        "Show History",
        "Switch to the transcription history",
        "CommandOrControl+Alt+1",
        ShortcutCategory::Navigation,
        ShortcutAction::SwitchToHistory,
    ),
    (
        "switch-to-models",
        "Show Models",
        "Switch to model management",
        "CommandOrControl+Alt+2",
        ShortcutCategory::Navigation,
        ShortcutAction::SwitchToModels,
    ),
    (
        "switch-to-settings",
        "Show Settings",
        "Switch to settings",
        "CommandOrControl+Alt+Comma",
        ShortcutCategory::Navigation,
        ShortcutAction::SwitchToSettings,
    ),
    (
        "copy-transcription",
        "Copy Transcription",
        "Copy the latest transcription to the clipboard",
        "CommandOrControl+Shift+C",
        ShortcutCategory::Editing,
        ShortcutAction::CopyTranscription,
    ),
    (
        "export-transcription",
        "Export Transcription",
        "Export the latest transcription to a file",
        "CommandOrControl+Shift+E",
        ShortcutCategory::Editing,
        ShortcutAction::ExportTranscription,
    ),
    (
        "toggle-window",
        "Show/Hide Window",
        "Hide or reveal the main window",
        "CommandOrControl+Shift+H",
        ShortcutCategory::System,
        ShortcutAction::ToggleWindow,
    ),
    (
        "minimize-window",
        "Minimize Window",
        "Minimize the main window",
        "CommandOrControl+Shift+M",
        ShortcutCategory::System,
        ShortcutAction::MinimizeWindow,
    ),
    (
        "reload-window",
        "Reload Window",
        "Reload the main window",
        "CommandOrControl+Shift+Alt+R",
        ShortcutCategory::System,
        ShortcutAction::ReloadWindow,
    ),
];

/// Ordered candidates tried for the `Fn` placeholder.
pub const DEFAULT_PLACEHOLDER_CANDIDATES: &[&str] = &[
    "Alt+Space",
    "CommandOrControl+Alt+Space",
    "CommandOrControl+Shift+Space",
];

/// A named binding scheme applied on top of the compiled-in defaults.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// (shortcut id, accelerator)
    pub bindings: &'static [(&'static str, &'static str)],
    /// Shortcuts not listed in `bindings` are disabled
    pub exclusive: bool,
}

impl ShortcutPreset {
    /// Overrides that turn `table` (the defaults) into this preset.
    pub fn overrides(&self, table: &[Shortcut]) -> HashMap<String, BindingOverride> {
        let mut overrides: HashMap<String, BindingOverride> = self
            .bindings
            .iter()
            .map(|(id, accelerator)| {
                (
                    id.to_string(),
                    BindingOverride {
                        accelerator: accelerator.to_string(),
                        enabled: true,
                    },
                )
            })
            .collect();

        if self.exclusive {
            for shortcut in table {
                overrides
                    .entry(shortcut.id.clone())
                    .or_insert_with(|| BindingOverride {
                        enabled: false,
                        ..BindingOverride::from(shortcut)
                    });
            }
        }
        overrides
    }
}

pub const PRESETS: &[ShortcutPreset] = &[
    ShortcutPreset {
        id: "professional",
        name: "Professional",
        description: "The full recording shortcut set",
        bindings: &[("toggle-recording", "CommandOrControl+Shift+R")],
        exclusive: false,
    },
    ShortcutPreset {
        id: "minimal",
        name: "Minimal",
        description: "A single recording key for new users",
        bindings: &[("toggle-recording", "F13")],
        exclusive: true,
    },
    ShortcutPreset {
        id: "gaming",
        name: "Gaming",
        description: "Function keys that stay out of the way of game controls",
        bindings: &[("toggle-recording", "F14"), ("quick-transcribe", "F15")],
        exclusive: false,
    },
    ShortcutPreset {
        id: "media",
        name: "Media Production",
        description: "Podcast and video editing",
        bindings: &[
            ("toggle-recording", "CommandOrControl+R"),
            ("quick-transcribe", "CommandOrControl+T"),
        ],
        exclusive: false,
    },
    ShortcutPreset {
        id: "office",
        name: "Office",
        description: "Meeting recording and voice notes",
        bindings: &[
            ("toggle-recording", "CommandOrControl+Alt+R"),
            ("quick-transcribe", "CommandOrControl+Alt+S"),
        ],
        exclusive: false,
    },
];

pub fn find_preset(id: &str) -> Option<&'static ShortcutPreset> {
    PRESETS.iter().find(|preset| preset.id == id)
}

/// Build the default shortcut set.
pub fn default_shortcuts() -> Vec<Shortcut> {
    DEFAULT_TABLE
        .iter()
        .filter_map(|(id, name, description, accelerator, category, action)| {
            match Accelerator::parse(accelerator) {
                Ok(accelerator) => Some(
                    Shortcut::new(*id, *name, accelerator, *category, *action)
                        .with_description(*description),
                ),
                Err(e) => {
                    tracing::error!(shortcut_id = *id, error = %e, "Invalid default accelerator");
                    None
                }
            }
        })
        .collect()
}

/// Parse a list of candidate strings, dropping any that are not concrete.
pub fn parse_candidates<S: AsRef<str>>(candidates: &[S]) -> Vec<Accelerator> {
    candidates
        .iter()
        .filter_map(|candidate| match Accelerator::parse(candidate.as_ref()) {
            Ok(accelerator) if !accelerator.is_placeholder() => Some(accelerator),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(
                    candidate = candidate.as_ref(),
                    error = %e,
                    "Ignoring invalid placeholder candidate"
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_default_parses() {
        assert_eq!(default_shortcuts().len(), DEFAULT_TABLE.len());
    }

    #[test]
    fn default_ids_and_accelerators_are_distinct() {
        let defaults = default_shortcuts();
        let ids: HashSet<_> = defaults.iter().map(|s| s.id.clone()).collect();
        let accels: HashSet<_> = defaults.iter().map(|s| s.accelerator.clone()).collect();
        assert_eq!(ids.len(), defaults.len());
        assert_eq!(accels.len(), defaults.len());
    }

    #[test]
    fn preset_bindings_parse_and_name_default_shortcuts() {
        let defaults = default_shortcuts();
        for preset in PRESETS {
            for (id, accelerator) in preset.bindings {
                assert!(
                    defaults.iter().any(|s| s.id == *id),
                    "{} binds unknown shortcut {}",
                    preset.id,
                    id
                );
                assert!(Accelerator::parse(accelerator).is_ok(), "{accelerator}");
            }
        }
        assert!(find_preset("gaming").is_some());
        assert!(find_preset("nope").is_none());
    }

    #[test]
    fn exclusive_preset_disables_unlisted_shortcuts() {
        let defaults = default_shortcuts();
        let overrides = find_preset("minimal").unwrap().overrides(&defaults);

        assert_eq!(overrides.len(), defaults.len());
        assert!(overrides["toggle-recording"].enabled);
        assert_eq!(overrides["toggle-recording"].accelerator, "F13");
        let history = &overrides["switch-to-history"];
        assert!(!history.enabled);
        assert_eq!(history.accelerator, "CommandOrControl+Alt+1");
    }

    #[test]
    fn placeholder_candidates_are_concrete() {
        let parsed = parse_candidates(DEFAULT_PLACEHOLDER_CANDIDATES);
        assert_eq!(parsed.len(), DEFAULT_PLACEHOLDER_CANDIDATES.len());
        assert!(parse_candidates(&["Fn", "Space"]).is_empty());
    }
}
