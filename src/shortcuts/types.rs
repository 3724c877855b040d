//! Shortcut data model.

use serde::{Deserialize, Serialize};

use crate::accelerator::Accelerator;
use crate::events::AppEvent;

/// Category for grouping shortcuts and for safe-mode filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortcutCategory {
    Recording,
    Navigation,
    Editing,
    System,
}

impl ShortcutCategory {
    pub const ALL: [ShortcutCategory; 4] = [
        ShortcutCategory::Recording,
        ShortcutCategory::Navigation,
        ShortcutCategory::Editing,
        ShortcutCategory::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recording => "recording",
            Self::Navigation => "navigation",
            Self::Editing => "editing",
            Self::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

/// What a shortcut does when its accelerator fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShortcutAction {
    ToggleRecording,
    QuickTranscribe,
    OpenAiAssistant,
    SwitchToHistory,
    SwitchToModels,
    SwitchToSettings,
    CopyTranscription,
    ExportTranscription,
    ToggleWindow,
    MinimizeWindow,
    ReloadWindow,
}

impl ShortcutAction {
    /// The semantic event published when this action runs.
    pub fn event(&self) -> AppEvent {
        match self {
            Self::ToggleRecording => AppEvent::ToggleRecording,
            Self::QuickTranscribe => AppEvent::QuickTranscribe,
            Self::OpenAiAssistant => AppEvent::OpenAiAssistant,
            Self::SwitchToHistory => AppEvent::SwitchToHistory,
            Self::SwitchToModels => AppEvent::SwitchToModels,
            Self::SwitchToSettings => AppEvent::SwitchToSettings,
            Self::CopyTranscription => AppEvent::CopyTranscription,
            Self::ExportTranscription => AppEvent::ExportTranscription,
            Self::ToggleWindow => AppEvent::ToggleWindow,
            Self::MinimizeWindow => AppEvent::MinimizeWindow,
            Self::ReloadWindow => AppEvent::ReloadWindow,
        }
    }

    /// Actions that hide, minimize, or reload the application window.
    pub fn is_disruptive(&self) -> bool {
        matches!(
            self,
            Self::ToggleWindow | Self::MinimizeWindow | Self::ReloadWindow
        )
    }
}

/// A named shortcut: an accelerator bound to an action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    pub id: String,
    pub name: String,
    pub description: String,
    pub accelerator: Accelerator,
    pub category: ShortcutCategory,
    pub enabled: bool,
    pub action: ShortcutAction,
}

impl Shortcut {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        accelerator: Accelerator,
        category: ShortcutCategory,
        action: ShortcutAction,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            accelerator,
            category,
            enabled: true,
            action,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Skipped when safe mode is on.
    pub fn is_safe_mode_restricted(&self) -> bool {
        self.category == ShortcutCategory::System && self.action.is_disruptive()
    }

    /// Case-insensitive substring match over name, description and accelerator.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self
                .accelerator
                .to_canonical_string()
                .to_lowercase()
                .contains(&needle)
    }
}

/// Per-binding OS state.
///
/// `Unregistered -> Registered | RegistrationFailed`, and back to
/// `Unregistered` on disable or before a retry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "kebab-case")]
pub enum BindingState {
    #[default]
    Unregistered,
    Registered,
    RegistrationFailed(crate::failure::FailureReason),
}
