use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tempfile::tempdir;

use super::*;
use crate::binding::FakeBackend;
use crate::error::BindingError;
use crate::events::EventKind;
use crate::shortcuts::ShortcutAction;
use crate::store::{JsonFileStore, KeyValueStore, MemoryStore};

const REMEDIATION_KINDS: &[EventKind] = &[
    EventKind::ShowFirstLaunchWizard,
    EventKind::SuggestPermissionCheck,
    EventKind::ShortcutConflictsDetected,
];

fn accel(s: &str) -> Accelerator {
    Accelerator::parse(s).unwrap()
}

fn settings() -> EngineSettings {
    EngineSettings {
        safe_mode: false,
        ..EngineSettings::default()
    }
}

/// A store where a session has already completed, so failures are classified.
fn seasoned_store() -> ShortcutStore {
    let mut store = ShortcutStore::new(MemoryStore::new());
    store.mark_first_session_completed().unwrap();
    store
}

fn engine(backend: &FakeBackend) -> AcceleratorEngine {
    AcceleratorEngine::new(backend.clone(), seasoned_store(), settings()).unwrap()
}

fn table(n: u8) -> Vec<Shortcut> {
    (0..n)
        .map(|i| {
            let key = (b'A' + i) as char;
            Shortcut::new(
                format!("s{}", i),
                format!("Shortcut {}", key),
                accel(&format!("CommandOrControl+Alt+{}", key)),
                ShortcutCategory::Editing,
                ShortcutAction::CopyTranscription,
            )
        })
        .collect()
}

fn record(engine: &AcceleratorEngine, kinds: &[EventKind]) -> Arc<Mutex<Vec<AppEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    for kind in kinds {
        let seen = Arc::clone(&seen);
        engine
            .events()
            .on(*kind, move |event| seen.lock().push(event.clone()));
    }
    seen
}

// ---------------------------------------------------------------------------
// Registration pass
// ---------------------------------------------------------------------------

#[test]
fn register_all_binds_every_enabled_default() {
    let backend = FakeBackend::new();
    let engine = engine(&backend);
    let seen = record(&engine, REMEDIATION_KINDS);

    let report = engine.register_all();

    assert!(report.is_clean());
    assert_eq!(report.total, 11);
    assert_eq!(report.registered.len(), 11);
    assert_eq!(backend.bound().len(), 11);
    assert_eq!(engine.registered_count(), 11);
    assert_eq!(
        engine.binding_state("toggle-recording"),
        BindingState::Registered
    );
    assert!(seen.lock().is_empty());
}

#[test]
fn placeholder_resolves_to_first_free_candidate() {
    let backend = FakeBackend::new();
    let engine = engine(&backend);
    engine.register_all();

    assert!(backend.is_bound(&accel("Alt+Space")));
    let status = engine
        .status()
        .into_iter()
        .find(|s| s.id == "quick-transcribe")
        .unwrap();
    assert_eq!(status.accelerator, "Alt+Space");
    assert_eq!(status.state, BindingState::Registered);
}

#[test]
fn colliding_defaults_register_exactly_one() {
    let backend = FakeBackend::new();
    let mut shortcuts = table(2);
    shortcuts[1].accelerator = shortcuts[0].accelerator.clone();
    let engine =
        AcceleratorEngine::with_shortcuts(shortcuts, backend.clone(), seasoned_store(), settings())
            .unwrap();

    let report = engine.register_all();

    assert_eq!(report.registered, vec!["s0".to_string()]);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].shortcut_id, "s1");
    assert_eq!(report.failures[0].reason, FailureReason::Conflict);
    assert_eq!(backend.bound(), vec![accel("CommandOrControl+Alt+A")]);
    assert_eq!(engine.find_conflicts().len(), 1);
}

#[test]
fn safe_mode_skips_disruptive_system_shortcuts() {
    let backend = FakeBackend::new();
    let engine = AcceleratorEngine::new(
        backend.clone(),
        seasoned_store(),
        EngineSettings {
            safe_mode: true,
            ..EngineSettings::default()
        },
    )
    .unwrap();

    let report = engine.register_all();

    assert_eq!(report.skipped.len(), 3);
    assert_eq!(report.total, 8);
    assert!(report.is_clean());
    assert!(!backend.is_bound(&accel("CommandOrControl+Shift+H")));
    assert_eq!(engine.binding_state("toggle-window"), BindingState::Unregistered);
}

#[test]
fn register_all_twice_does_not_double_bind() {
    let backend = FakeBackend::new();
    let engine = engine(&backend);
    engine.register_all();
    let report = engine.register_all();

    assert!(report.is_clean());
    assert_eq!(backend.bound().len(), 11);
}

// ---------------------------------------------------------------------------
// Failure classification
// ---------------------------------------------------------------------------

#[test]
fn first_launch_failures_show_wizard() {
    let backend = FakeBackend::new();
    backend.fail_on(
        &accel("CommandOrControl+Shift+R"),
        BindingError::AlreadyBoundElsewhere,
    );
    let engine = AcceleratorEngine::new(
        backend.clone(),
        ShortcutStore::new(MemoryStore::new()),
        settings(),
    )
    .unwrap();
    let seen = record(&engine, REMEDIATION_KINDS);

    engine.register_all();

    assert_eq!(*seen.lock(), vec![AppEvent::ShowFirstLaunchWizard]);
}

#[test]
fn wizard_only_until_a_session_completes() {
    let backend = FakeBackend::new();
    backend.fail_on(
        &accel("CommandOrControl+Shift+R"),
        BindingError::AlreadyBoundElsewhere,
    );
    let engine = AcceleratorEngine::new(
        backend.clone(),
        ShortcutStore::new(MemoryStore::new()),
        settings(),
    )
    .unwrap();
    let seen = record(&engine, REMEDIATION_KINDS);

    engine.register_all();
    engine.unregister_all();
    engine.register_all();

    let seen = seen.lock();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], AppEvent::ShowFirstLaunchWizard);
    assert_eq!(seen[1].kind(), EventKind::ShortcutConflictsDetected);
}

#[test]
fn six_of_ten_failing_suggests_permission_check() {
    let backend = FakeBackend::new();
    for key in ["A", "B", "C", "D", "E", "F"] {
        backend.fail_on(
            &accel(&format!("CommandOrControl+Alt+{}", key)),
            BindingError::PermissionDenied,
        );
    }
    let engine =
        AcceleratorEngine::with_shortcuts(table(10), backend.clone(), seasoned_store(), settings())
            .unwrap();
    let seen = record(&engine, REMEDIATION_KINDS);

    let report = engine.register_all();

    assert_eq!(report.failed(), 6);
    assert_eq!(
        *seen.lock(),
        vec![AppEvent::SuggestPermissionCheck {
            failed: 6,
            total: 10
        }]
    );
}

#[test]
fn everything_failing_is_one_event_not_many() {
    let backend = FakeBackend::new();
    backend.fail_all(BindingError::PermissionDenied);
    let engine = engine(&backend);
    let seen = record(&engine, REMEDIATION_KINDS);

    let report = engine.register_all();

    assert_eq!(report.failed(), 11);
    assert_eq!(seen.lock().len(), 1);
    assert_eq!(seen.lock()[0].kind(), EventKind::SuggestPermissionCheck);
}

#[test]
fn isolated_failure_offers_suggestions_and_persists_them() {
    let backend = FakeBackend::new();
    backend.fail_on(
        &accel("CommandOrControl+Shift+R"),
        BindingError::AlreadyBoundElsewhere,
    );
    let engine = engine(&backend);
    let seen = record(&engine, REMEDIATION_KINDS);

    engine.register_all();

    let seen = seen.lock();
    let AppEvent::ShortcutConflictsDetected {
        failed,
        suggestions,
    } = &seen[0]
    else {
        panic!("expected conflict suggestions, got {:?}", seen[0]);
    };
    assert_eq!(failed, &vec!["Toggle Recording".to_string()]);
    let suggestion = &suggestions["Toggle Recording"];
    assert_ne!(suggestion, "CommandOrControl+Shift+R");
    assert!(Accelerator::parse(suggestion).is_ok());

    let persisted = engine.last_failures().unwrap();
    assert_eq!(persisted.failed_names, vec!["Toggle Recording".to_string()]);
    assert_eq!(&persisted.suggestions, suggestions);
    assert_eq!(persisted.records[0].reason, FailureReason::Conflict);
    assert_eq!(
        engine.binding_state("toggle-recording"),
        BindingState::RegistrationFailed(FailureReason::Conflict)
    );
}

#[test]
fn clean_pass_clears_persisted_failures() {
    let backend = FakeBackend::new();
    backend.fail_on(
        &accel("CommandOrControl+Shift+R"),
        BindingError::AlreadyBoundElsewhere,
    );
    let engine = engine(&backend);
    engine.register_all();
    assert!(!engine.last_failures().unwrap().is_empty());

    backend.clear_failures();
    engine.unregister_all();
    let report = engine.register_all();

    assert!(report.is_clean());
    assert!(engine.last_failures().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Cancels the engine's pass once `after` registrations have been attempted.
struct CancelAfter {
    inner: FakeBackend,
    token: Arc<Mutex<Option<CancellationToken>>>,
    after: usize,
    seen: usize,
}

impl HotkeyBackend for CancelAfter {
    fn register(
        &mut self,
        accelerator: &Accelerator,
        on_trigger: TriggerCallback,
    ) -> std::result::Result<(), BindingError> {
        let result = self.inner.register(accelerator, on_trigger);
        self.seen += 1;
        if self.seen == self.after {
            if let Some(token) = self.token.lock().as_ref() {
                token.cancel();
            }
        }
        result
    }

    fn unregister(&mut self, accelerator: &Accelerator) -> std::result::Result<(), BindingError> {
        self.inner.unregister(accelerator)
    }

    fn unregister_all(&mut self) -> std::result::Result<(), BindingError> {
        self.inner.unregister_all()
    }

    fn name(&self) -> &'static str {
        "cancel-after"
    }
}

#[test]
fn cancelled_pass_rolls_back_its_registrations() {
    let fake = FakeBackend::new();
    let token = Arc::new(Mutex::new(None));
    let backend = CancelAfter {
        inner: fake.clone(),
        token: Arc::clone(&token),
        after: 3,
        seen: 0,
    };
    let engine = AcceleratorEngine::new(backend, seasoned_store(), settings()).unwrap();
    *token.lock() = Some(engine.cancel_handle());
    let seen = record(&engine, REMEDIATION_KINDS);

    let report = engine.register_all();

    assert!(report.cancelled);
    assert_eq!(report.registered.len(), 3);
    assert!(fake.bound().is_empty());
    assert_eq!(engine.registered_count(), 0);
    assert_eq!(
        engine.binding_state("toggle-recording"),
        BindingState::Unregistered
    );
    assert!(seen.lock().is_empty());
}

#[test]
fn unregister_all_releases_everything_and_rearms() {
    let backend = FakeBackend::new();
    let engine = engine(&backend);
    engine.register_all();

    engine.unregister_all();
    assert!(backend.bound().is_empty());
    assert_eq!(engine.registered_count(), 0);

    let report = engine.register_all();
    assert!(!report.cancelled);
    assert_eq!(report.registered.len(), 11);
}

#[test]
fn external_cancel_stops_the_next_pass() {
    let backend = FakeBackend::new();
    let engine = engine(&backend);
    engine.cancel_handle().cancel();

    let report = engine.register_all();

    assert!(report.cancelled);
    assert!(report.registered.is_empty());
    assert!(backend.bound().is_empty());
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

#[test]
fn toggle_twice_restores_registration() {
    let backend = FakeBackend::new();
    let engine = engine(&backend);
    engine.register_all();
    let copy = accel("CommandOrControl+Shift+C");

    assert!(!engine.toggle("copy-transcription").unwrap());
    assert!(!backend.is_bound(&copy));
    assert_eq!(
        engine.binding_state("copy-transcription"),
        BindingState::Unregistered
    );

    assert!(engine.toggle("copy-transcription").unwrap());
    assert!(backend.is_bound(&copy));
    assert_eq!(
        engine.binding_state("copy-transcription"),
        BindingState::Registered
    );
}

#[test]
fn toggle_unknown_is_rejected() {
    let engine = engine(&FakeBackend::new());
    assert!(matches!(
        engine.toggle("nope"),
        Err(EngineError::Shortcut(ShortcutError::UnknownShortcut(_)))
    ));
}

#[test]
fn rebind_moves_the_os_binding() {
    let backend = FakeBackend::new();
    let engine = engine(&backend);
    engine.register_all();

    let state = engine
        .rebind("toggle-recording", "CommandOrControl+Alt+R")
        .unwrap();

    assert_eq!(state, BindingState::Registered);
    assert!(!backend.is_bound(&accel("CommandOrControl+Shift+R")));
    assert!(backend.is_bound(&accel("CommandOrControl+Alt+R")));
}

#[test]
fn rebind_onto_resolved_placeholder_conflicts() {
    let backend = FakeBackend::new();
    let engine = engine(&backend);
    engine.register_all();

    let err = engine.rebind("toggle-recording", "Alt+Space").unwrap_err();

    match err {
        EngineError::Shortcut(ShortcutError::Conflict { owner_id, .. }) => {
            assert_eq!(owner_id, "quick-transcribe")
        }
        other => panic!("expected conflict, got {:?}", other),
    }
    assert!(backend.is_bound(&accel("CommandOrControl+Shift+R")));
}

#[test]
fn rebind_reports_os_failure_in_state() {
    let backend = FakeBackend::new();
    backend.fail_on(
        &accel("CommandOrControl+Alt+R"),
        BindingError::PermissionDenied,
    );
    let engine = engine(&backend);
    engine.register_all();

    let state = engine
        .rebind("toggle-recording", "CommandOrControl+Alt+R")
        .unwrap();

    assert_eq!(
        state,
        BindingState::RegistrationFailed(FailureReason::Permission)
    );
}

#[test]
fn add_registers_enabled_shortcut() {
    let backend = FakeBackend::new();
    let engine = engine(&backend);
    engine.register_all();

    let state = engine
        .add(Shortcut::new(
            "paste-last",
            "Paste Last",
            accel("CommandOrControl+Alt+V"),
            ShortcutCategory::Editing,
            ShortcutAction::CopyTranscription,
        ))
        .unwrap();

    assert_eq!(state, BindingState::Registered);
    assert!(backend.is_bound(&accel("CommandOrControl+Alt+V")));
}

#[test]
fn read_only_store_does_not_fail_mutations() {
    let backend = FakeBackend::new();
    let engine = AcceleratorEngine::new(
        backend.clone(),
        ShortcutStore::new(MemoryStore::read_only()),
        settings(),
    )
    .unwrap();
    engine.register_all();

    assert!(!engine.toggle("copy-transcription").unwrap());
    assert!(engine
        .rebind("toggle-recording", "CommandOrControl+Alt+R")
        .is_ok());
}

#[test]
fn customizations_survive_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");

    {
        let store = ShortcutStore::new(JsonFileStore::open(&path).unwrap());
        let engine = AcceleratorEngine::new(FakeBackend::new(), store, settings()).unwrap();
        engine
            .rebind("toggle-recording", "CommandOrControl+Alt+R")
            .unwrap();
        engine.toggle("copy-transcription").unwrap();
    }

    let store = ShortcutStore::new(JsonFileStore::open(&path).unwrap());
    let engine = AcceleratorEngine::new(FakeBackend::new(), store, settings()).unwrap();
    let recording = engine.get("toggle-recording").unwrap();
    assert_eq!(recording.accelerator, accel("CommandOrControl+Alt+R"));
    assert!(!engine.get("copy-transcription").unwrap().enabled);
}

#[test]
fn saved_reserved_override_is_never_bound() {
    let mut store = seasoned_store();
    let mut overrides = HashMap::new();
    overrides.insert(
        "toggle-recording".to_string(),
        BindingOverride {
            accelerator: "Cmd+Q".to_string(),
            enabled: true,
        },
    );
    store.save(&overrides).unwrap();
    let backend = FakeBackend::new();
    let engine = AcceleratorEngine::new(backend.clone(), store, settings()).unwrap();

    let report = engine.register_all();

    assert!(report.is_clean());
    assert!(!backend.is_bound(&accel("CommandOrControl+Q")));
    assert!(backend.is_bound(&accel("CommandOrControl+Shift+R")));
    assert_eq!(
        engine.get("toggle-recording").unwrap().accelerator,
        accel("CommandOrControl+Shift+R")
    );
}

#[test]
fn by_category_and_search_reflect_table() {
    let engine = engine(&FakeBackend::new());
    assert_eq!(engine.by_category(ShortcutCategory::System).len(), 3);
    assert!(engine
        .search("transcri")
        .iter()
        .any(|s| s.id == "copy-transcription"));
}

// ---------------------------------------------------------------------------
// Import / export / reset
// ---------------------------------------------------------------------------

#[test]
fn export_lists_only_customizations() {
    let engine = engine(&FakeBackend::new());
    assert_eq!(engine.export_bindings().unwrap().trim(), "{}");

    engine
        .rebind("toggle-recording", "CommandOrControl+Alt+R")
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&engine.export_bindings().unwrap()).unwrap();
    assert_eq!(
        json["toggle-recording"]["accelerator"],
        "CommandOrControl+Alt+R"
    );
    assert_eq!(json.as_object().unwrap().len(), 1);
}

#[test]
fn import_applies_and_registers() {
    let backend = FakeBackend::new();
    let engine = engine(&backend);
    engine.register_all();

    let report = engine
        .import_bindings(
            r#"{"toggle-recording": {"accelerator": "CommandOrControl+Alt+R", "enabled": true}}"#,
        )
        .unwrap();

    assert!(report.is_clean());
    assert!(backend.is_bound(&accel("CommandOrControl+Alt+R")));
    assert!(!backend.is_bound(&accel("CommandOrControl+Shift+R")));
}

#[test]
fn import_is_all_or_nothing() {
    let backend = FakeBackend::new();
    let engine = engine(&backend);
    engine.register_all();

    let err = engine
        .import_bindings(
            r#"{
                "toggle-recording": {"accelerator": "CommandOrControl+Alt+R"},
                "copy-transcription": {"accelerator": "Shift+Banana"}
            }"#,
        )
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::Shortcut(ShortcutError::Validation(_))
    ));
    assert_eq!(
        engine.get("toggle-recording").unwrap().accelerator,
        accel("CommandOrControl+Shift+R")
    );
    assert_eq!(backend.bound().len(), 11);
}

#[test]
fn import_rejects_conflicts_and_unknown_ids() {
    let engine = engine(&FakeBackend::new());

    let conflict = engine.import_bindings(
        r#"{"toggle-recording": {"accelerator": "CommandOrControl+Shift+C"}}"#,
    );
    assert!(matches!(
        conflict,
        Err(EngineError::Shortcut(ShortcutError::Conflict { .. }))
    ));

    let unknown = engine.import_bindings(r#"{"nope": {"accelerator": "Alt+K"}}"#);
    assert!(matches!(
        unknown,
        Err(EngineError::Shortcut(ShortcutError::UnknownShortcut(_)))
    ));

    let reserved = engine.import_bindings(
        r#"{"toggle-recording": {"accelerator": "CommandOrControl+Q"}}"#,
    );
    assert!(matches!(
        reserved,
        Err(EngineError::Shortcut(ShortcutError::Reserved { .. }))
    ));

    assert!(matches!(
        engine.import_bindings("not json"),
        Err(EngineError::Import(_))
    ));
}

#[test]
fn reset_restores_defaults_and_rebinds() {
    let backend = FakeBackend::new();
    let engine = engine(&backend);
    engine.register_all();
    engine
        .rebind("toggle-recording", "CommandOrControl+Alt+R")
        .unwrap();
    engine.toggle("copy-transcription").unwrap();

    let report = engine.reset_to_defaults().unwrap();

    assert!(report.is_clean());
    assert_eq!(report.registered.len(), 11);
    assert!(backend.is_bound(&accel("CommandOrControl+Shift+R")));
    assert!(!backend.is_bound(&accel("CommandOrControl+Alt+R")));
    assert_eq!(engine.export_bindings().unwrap().trim(), "{}");
}

#[test]
fn preset_rebinds_and_registers() {
    let backend = FakeBackend::new();
    let engine = engine(&backend);
    engine.register_all();
    engine
        .rebind("copy-transcription", "CommandOrControl+Alt+C")
        .unwrap();

    let report = engine.apply_preset("gaming").unwrap();

    assert!(report.is_clean());
    assert_eq!(report.registered.len(), 11);
    assert!(backend.is_bound(&accel("F14")));
    assert!(backend.is_bound(&accel("F15")));
    assert!(!backend.is_bound(&accel("CommandOrControl+Shift+R")));
    assert!(!backend.is_bound(&accel("Alt+Space")));
    // Earlier customization is replaced, not merged
    assert!(backend.is_bound(&accel("CommandOrControl+Shift+C")));
    assert!(!backend.is_bound(&accel("CommandOrControl+Alt+C")));

    let json: serde_json::Value = serde_json::from_str(&engine.export_bindings().unwrap()).unwrap();
    assert_eq!(json["toggle-recording"]["accelerator"], "F14");
    assert_eq!(json.as_object().unwrap().len(), 2);
}

#[test]
fn exclusive_preset_leaves_one_binding() {
    let backend = FakeBackend::new();
    let engine = engine(&backend);
    engine.register_all();

    let report = engine.apply_preset("minimal").unwrap();

    assert_eq!(report.registered, vec!["toggle-recording".to_string()]);
    assert_eq!(backend.bound(), vec![accel("F13")]);
    assert!(!engine.get("copy-transcription").unwrap().enabled);
}

#[test]
fn unknown_preset_leaves_table_untouched() {
    let backend = FakeBackend::new();
    let engine = engine(&backend);
    engine.register_all();

    let err = engine.apply_preset("streaming").unwrap_err();

    assert!(matches!(
        err,
        EngineError::Shortcut(ShortcutError::UnknownPreset(ref id)) if id == "streaming"
    ));
    assert_eq!(backend.bound().len(), 11);
    assert_eq!(engine.export_bindings().unwrap().trim(), "{}");
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

/// Records every backend call and holds each registration for `delay`.
struct SlowBackend {
    inner: FakeBackend,
    delay: Duration,
    log: Arc<Mutex<Vec<String>>>,
}

impl SlowBackend {
    fn new(inner: &FakeBackend, delay: Duration) -> (Self, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let backend = Self {
            inner: inner.clone(),
            delay,
            log: Arc::clone(&log),
        };
        (backend, log)
    }
}

impl HotkeyBackend for SlowBackend {
    fn register(
        &mut self,
        accelerator: &Accelerator,
        on_trigger: TriggerCallback,
    ) -> std::result::Result<(), BindingError> {
        self.log.lock().push(format!("register {}", accelerator));
        thread::sleep(self.delay);
        self.inner.register(accelerator, on_trigger)
    }

    fn unregister(&mut self, accelerator: &Accelerator) -> std::result::Result<(), BindingError> {
        self.log.lock().push(format!("unregister {}", accelerator));
        self.inner.unregister(accelerator)
    }

    fn unregister_all(&mut self) -> std::result::Result<(), BindingError> {
        self.log.lock().push("unregister-all".to_string());
        self.inner.unregister_all()
    }

    fn name(&self) -> &'static str {
        "slow"
    }
}

#[test]
fn unregister_all_from_another_thread_cancels_the_pass() {
    let fake = FakeBackend::new();
    let (backend, _log) = SlowBackend::new(&fake, Duration::from_millis(40));
    let engine = Arc::new(AcceleratorEngine::new(backend, seasoned_store(), settings()).unwrap());
    let seen = record(&engine, REMEDIATION_KINDS);

    let pass = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || engine.register_all())
    };
    thread::sleep(Duration::from_millis(100));
    engine.unregister_all();
    let report = pass.join().unwrap();

    assert!(report.cancelled);
    assert!(report.registered.len() < 11);
    assert!(fake.bound().is_empty());
    assert_eq!(engine.registered_count(), 0);
    assert!(seen.lock().is_empty());

    let report = engine.register_all();
    assert!(!report.cancelled);
    assert_eq!(report.registered.len(), 11);
    assert_eq!(fake.bound().len(), 11);
}

#[test]
fn rebind_waits_for_an_in_flight_pass() {
    let fake = FakeBackend::new();
    let (backend, log) = SlowBackend::new(&fake, Duration::from_millis(20));
    let engine = Arc::new(AcceleratorEngine::new(backend, seasoned_store(), settings()).unwrap());

    let pass = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || engine.register_all())
    };
    thread::sleep(Duration::from_millis(50));
    let state = engine
        .rebind("toggle-recording", "CommandOrControl+Alt+R")
        .unwrap();
    let report = pass.join().unwrap();

    assert!(report.is_clean());
    assert_eq!(state, BindingState::Registered);

    let log = log.lock();
    let pass_end = log
        .iter()
        .rposition(|entry| entry == "register CommandOrControl+Shift+Alt+R")
        .unwrap();
    let rebind_start = log
        .iter()
        .position(|entry| entry == "unregister CommandOrControl+Shift+R")
        .unwrap();
    assert!(rebind_start > pass_end, "rebind interleaved with the pass: {:?}", *log);
    assert_eq!(log.last().unwrap(), "register CommandOrControl+Alt+R");
    assert!(fake.is_bound(&accel("CommandOrControl+Alt+R")));
    assert!(!fake.is_bound(&accel("CommandOrControl+Shift+R")));
}

// ---------------------------------------------------------------------------
// Trigger dispatch
// ---------------------------------------------------------------------------

#[test]
fn fired_accelerator_publishes_action_event() {
    let backend = FakeBackend::new();
    let engine = engine(&backend);
    engine.register_all();
    let seen = record(&engine, &[EventKind::ToggleRecording]);

    assert!(backend.fire(&accel("CommandOrControl+Shift+R")));
    assert_eq!(engine.dispatch_pending(), 1);

    assert_eq!(*seen.lock(), vec![AppEvent::ToggleRecording]);
    let status = engine
        .status()
        .into_iter()
        .find(|s| s.id == "toggle-recording")
        .unwrap();
    assert_eq!(status.triggers.count, 1);
    assert!(status.triggers.last_fired.is_some());
}

#[test]
fn stale_trigger_is_ignored() {
    let backend = FakeBackend::new();
    let engine = engine(&backend);
    engine.register_all();
    assert!(backend.fire(&accel("CommandOrControl+Shift+R")));

    engine.unregister_all();

    assert_eq!(engine.dispatch_pending(), 0);
    assert!(engine
        .handle_trigger(&accel("CommandOrControl+Shift+R"))
        .is_none());
}

#[test]
fn handlers_may_reenter_the_engine() {
    let backend = FakeBackend::new();
    let engine = Arc::new(engine(&backend));
    engine.register_all();

    let weak = Arc::downgrade(&engine);
    let observed = Arc::new(Mutex::new(None));
    let observed_clone = Arc::clone(&observed);
    engine.events().on(EventKind::CopyTranscription, move |_| {
        if let Some(engine) = weak.upgrade() {
            *observed_clone.lock() = Some(engine.registered_count());
        }
    });

    engine.handle_trigger(&accel("CommandOrControl+Shift+C"));

    assert_eq!(*observed.lock(), Some(11));
}

#[test]
fn outcomes_not_recorded_when_disabled() {
    let backend = FakeBackend::new();
    backend.fail_all(BindingError::PermissionDenied);
    let engine = AcceleratorEngine::new(
        backend.clone(),
        ShortcutStore::new(MemoryStore::new()),
        EngineSettings {
            record_outcomes: false,
            ..settings()
        },
    )
    .unwrap();
    let seen = record(&engine, REMEDIATION_KINDS);

    let report = engine.register_all();

    assert_eq!(report.failed(), 11);
    assert!(seen.lock().is_empty());
    assert!(engine.last_failures().unwrap().is_empty());
}

#[test]
fn unreadable_failure_record_is_a_store_error() {
    let mut raw = MemoryStore::new();
    raw.set("lastFailedShortcuts", serde_json::json!({"not": "a list"}))
        .unwrap();
    let engine = AcceleratorEngine::new(
        FakeBackend::new(),
        ShortcutStore::new(raw),
        settings(),
    )
    .unwrap();

    assert!(matches!(
        engine.last_failures(),
        Err(EngineError::Persistence(PersistenceError::Json(_)))
    ));
}
