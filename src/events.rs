//! Typed application events and the bus that dispatches them.
//!
//! Handlers subscribe per event kind. `emit` calls them one at a time in
//! subscription order on the emitting thread. The handler list is snapshotted
//! before dispatch, so a handler may subscribe, unsubscribe or re-enter the
//! engine without deadlocking.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;

/// Events published to the rest of the application.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum AppEvent {
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
    ShowFirstLaunchWizard,
    SuggestPermissionCheck {
        failed: usize,
        total: usize,
    },
    ShortcutConflictsDetected {
        /// Names of the shortcuts that failed to register
        failed: Vec<String>,
        /// Shortcut name -> suggested accelerator
        suggestions: BTreeMap<String, String>,
    },
}

/// Discriminant of `AppEvent`, used as the subscription key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
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
    ShowFirstLaunchWizard,
    SuggestPermissionCheck,
    ShortcutConflictsDetected,
}

impl EventKind {
    pub const ALL: [EventKind; 14] = [
        EventKind::ToggleRecording,
        EventKind::QuickTranscribe,
        EventKind::OpenAiAssistant,
        EventKind::SwitchToHistory,
        EventKind::SwitchToModels,
        EventKind::SwitchToSettings,
        EventKind::CopyTranscription,
        EventKind::ExportTranscription,
        EventKind::ToggleWindow,
        EventKind::MinimizeWindow,
        EventKind::ReloadWindow,
        EventKind::ShowFirstLaunchWizard,
        EventKind::SuggestPermissionCheck,
        EventKind::ShortcutConflictsDetected,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ToggleRecording => "toggle-recording",
            Self::QuickTranscribe => "quick-transcribe",
            Self::OpenAiAssistant => "open-ai-assistant",
            Self::SwitchToHistory => "switch-to-history",
            Self::SwitchToModels => "switch-to-models",
            Self::SwitchToSettings => "switch-to-settings",
            Self::CopyTranscription => "copy-transcription",
            Self::ExportTranscription => "export-transcription",
            Self::ToggleWindow => "toggle-window",
            Self::MinimizeWindow => "minimize-window",
            Self::ReloadWindow => "reload-window",
            Self::ShowFirstLaunchWizard => "show-first-launch-wizard",
            Self::SuggestPermissionCheck => "suggest-permission-check",
            Self::ShortcutConflictsDetected => "shortcut-conflicts-detected",
        }
    }
}

impl AppEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ToggleRecording => EventKind::ToggleRecording,
            Self::QuickTranscribe => EventKind::QuickTranscribe,
            Self::OpenAiAssistant => EventKind::OpenAiAssistant,
            Self::SwitchToHistory => EventKind::SwitchToHistory,
            Self::SwitchToModels => EventKind::SwitchToModels,
            Self::SwitchToSettings => EventKind::SwitchToSettings,
            Self::CopyTranscription => EventKind::CopyTranscription,
            Self::ExportTranscription => EventKind::ExportTranscription,
            Self::ToggleWindow => EventKind::ToggleWindow,
            Self::MinimizeWindow => EventKind::MinimizeWindow,
            Self::ReloadWindow => EventKind::ReloadWindow,
            Self::ShowFirstLaunchWizard => EventKind::ShowFirstLaunchWizard,
            Self::SuggestPermissionCheck { .. } => EventKind::SuggestPermissionCheck,
            Self::ShortcutConflictsDetected { .. } => EventKind::ShortcutConflictsDetected,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// True for the remediation signals produced after a registration pass.
    pub fn is_remediation(&self) -> bool {
        matches!(
            self,
            Self::ShowFirstLaunchWizard
                | Self::SuggestPermissionCheck { .. }
                | Self::ShortcutConflictsDetected { .. }
        )
    }
}

pub type EventHandler = Arc<dyn Fn(&AppEvent) + Send + Sync>;

/// Returned by `EventBus::on`; pass to `off` to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Ordered publish/subscribe dispatch.
///
/// Cloning yields another handle to the same subscriptions.
#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Arc<RwLock<HashMap<EventKind, Vec<(HandlerId, EventHandler)>>>>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to events of `kind`.
    pub fn on<F>(&self, kind: EventKind, handler: F) -> HandlerId
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn off(&self, kind: EventKind, id: HandlerId) -> bool {
        let mut handlers = self.handlers.write();
        let Some(list) = handlers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(existing, _)| *existing != id);
        list.len() != before
    }

    /// Call every handler for the event's kind, sequentially, in subscription order.
    ///
    /// Returns the number of handlers invoked.
    pub fn emit(&self, event: &AppEvent) -> usize {
        let snapshot: Vec<EventHandler> = self
            .handlers
            .read()
            .get(&event.kind())
            .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();

        debug!(
            category = "EVENT",
            event = event.name(),
            handlers = snapshot.len(),
            "Emitting event"
        );

        for handler in &snapshot {
            handler(event);
        }
        snapshot.len()
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.read().get(&kind).map_or(0, Vec::len)
    }

    pub fn clear(&self) {
        self.handlers.write().clear();
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handlers = self.handlers.read();
        f.debug_struct("EventBus")
            .field("kinds", &handlers.len())
            .field(
                "handlers",
                &handlers.values().map(Vec::len).sum::<usize>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn handlers_run_in_subscription_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for n in 0..3 {
            let log = Arc::clone(&log);
            bus.on(EventKind::ToggleRecording, move |_| log.lock().push(n));
        }

        assert_eq!(bus.emit(&AppEvent::ToggleRecording), 3);
        assert_eq!(*log.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn emit_only_reaches_matching_kind() {
        let bus = EventBus::new();
        let hits = Arc::new(Mutex::new(0));
        let hits_clone = Arc::clone(&hits);
        bus.on(EventKind::CopyTranscription, move |_| *hits_clone.lock() += 1);

        assert_eq!(bus.emit(&AppEvent::ExportTranscription), 0);
        assert_eq!(*hits.lock(), 0);
    }

    #[test]
    fn off_removes_only_that_handler() {
        let bus = EventBus::new();
        let first = bus.on(EventKind::QuickTranscribe, |_| {});
        bus.on(EventKind::QuickTranscribe, |_| {});

        assert!(bus.off(EventKind::QuickTranscribe, first));
        assert!(!bus.off(EventKind::QuickTranscribe, first));
        assert_eq!(bus.handler_count(EventKind::QuickTranscribe), 1);
    }

    #[test]
    fn handler_can_subscribe_during_emit() {
        let bus = EventBus::new();
        let inner = bus.clone();
        bus.on(EventKind::ShowFirstLaunchWizard, move |_| {
            inner.on(EventKind::ShowFirstLaunchWizard, |_| {});
        });

        // Snapshot semantics: the new handler is not called in this emit
        assert_eq!(bus.emit(&AppEvent::ShowFirstLaunchWizard), 1);
        assert_eq!(bus.handler_count(EventKind::ShowFirstLaunchWizard), 2);
    }

    #[test]
    fn payload_reaches_handler() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(None));
        let seen_clone = Arc::clone(&seen);
        bus.on(EventKind::SuggestPermissionCheck, move |event| {
            *seen_clone.lock() = Some(event.clone());
        });

        bus.emit(&AppEvent::SuggestPermissionCheck { failed: 6, total: 10 });

        assert_eq!(
            *seen.lock(),
            Some(AppEvent::SuggestPermissionCheck { failed: 6, total: 10 })
        );
    }

    #[test]
    fn serialized_names_match_kind_names() {
        let event = AppEvent::ShortcutConflictsDetected {
            failed: vec!["Toggle Recording".into()],
            suggestions: BTreeMap::new(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "shortcut-conflicts-detected");
        assert_eq!(json["event"], event.name());

        let json = serde_json::to_value(AppEvent::OpenAiAssistant).unwrap();
        assert_eq!(json["event"], "open-ai-assistant");
    }

    #[test]
    fn every_kind_has_a_distinct_name() {
        let names: std::collections::HashSet<_> = EventKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), EventKind::ALL.len());
    }

    #[test]
    fn only_pass_outcomes_are_remediation() {
        assert!(AppEvent::ShowFirstLaunchWizard.is_remediation());
        assert!(AppEvent::SuggestPermissionCheck { failed: 6, total: 10 }.is_remediation());
        assert!(AppEvent::ShortcutConflictsDetected {
            failed: Vec::new(),
            suggestions: BTreeMap::new(),
        }
        .is_remediation());
        assert!(!AppEvent::ToggleRecording.is_remediation());
        assert!(!AppEvent::ReloadWindow.is_remediation());
    }
}
