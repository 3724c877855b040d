//! The accelerator engine: one owned service around the shortcut table.
//!
//! All mutation and every registration pass go through a single mutex, so a
//! rebind that arrives during `register_all` waits for the pass to finish.
//! Events are emitted only after the lock is released; handlers may call
//! back into the engine.
//!
//! OS callbacks never touch the table. They push the accelerator onto a
//! bounded queue that the owning context drains with `dispatch_pending` (or
//! by reading `trigger_receiver` and calling `handle_trigger`).

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_channel::{Receiver, Sender, TrySendError};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::accelerator::Accelerator;
use crate::binding::{HotkeyBackend, TriggerCallback};
use crate::config::Config;
use crate::error::{EngineError, Result, ResultExt, ShortcutError};
use crate::events::{AppEvent, EventBus};
use crate::failure::{FailureClassifier, FailureReason, FailureRecord, RegistrationReport, Remediation};
use crate::logging;
use crate::shortcuts::{
    default_shortcuts, find_preset, Alternative, BindingOverride, BindingState, FailureSnapshot,
    PersistenceError, Shortcut, ShortcutCategory, ShortcutConflict, ShortcutRegistry,
    ShortcutStore,
};

/// Shared flag that stops an in-flight registration pass between bindings.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Engine policy, usually derived from `Config`.
#[derive(Clone, Debug)]
pub struct EngineSettings {
    pub safe_mode: bool,
    pub classifier: FailureClassifier,
    pub max_suggestion_attempts: usize,
    pub placeholder_candidates: Vec<Accelerator>,
    pub trigger_queue_capacity: usize,
    /// Persist failures and first-session state after each pass. Off for
    /// tooling that runs passes against a fake backend.
    pub record_outcomes: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for EngineSettings {
    fn from(config: &Config) -> Self {
        Self {
            safe_mode: config.get_safe_mode(),
            classifier: FailureClassifier::new(config.get_permission_failure_threshold()),
            max_suggestion_attempts: config.get_max_suggestion_attempts(),
            placeholder_candidates: config.get_placeholder_candidates(),
            trigger_queue_capacity: config.get_trigger_queue_capacity(),
            record_outcomes: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerStats {
    pub count: u64,
    pub last_fired: Option<DateTime<Utc>>,
}

/// Snapshot of one shortcut for status displays.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutStatus {
    pub id: String,
    pub name: String,
    pub category: ShortcutCategory,
    /// The accelerator actually used, after placeholder resolution
    pub accelerator: String,
    pub enabled: bool,
    pub state: BindingState,
    pub triggers: TriggerStats,
}

enum BindOutcome {
    Registered,
    Failed(FailureReason),
    Skipped,
}

struct EngineState {
    registry: ShortcutRegistry,
    /// Accelerator -> owning shortcut id, for every binding live at the OS level
    registered: HashMap<Accelerator, String>,
    states: HashMap<String, BindingState>,
    /// Placeholder shortcut id -> concrete accelerator chosen for it
    resolved: HashMap<String, Accelerator>,
    triggers: HashMap<String, TriggerStats>,
    backend: Box<dyn HotkeyBackend>,
    store: ShortcutStore,
}

impl EngineState {
    fn set_state(&mut self, id: &str, state: BindingState) {
        self.states.insert(id.to_string(), state);
    }

    fn registered_accelerator(&self, id: &str) -> Option<Accelerator> {
        self.registered
            .iter()
            .find(|(_, owner)| owner.as_str() == id)
            .map(|(accelerator, _)| accelerator.clone())
    }

    fn effective_accelerator(&self, shortcut: &Shortcut) -> Accelerator {
        self.registry
            .resolver(&self.resolved)
            .effective_accelerator(shortcut)
            .clone()
    }

    fn persist(&mut self) {
        let overrides = self.registry.export_overrides();
        self.store.save(&overrides).log_err();
    }
}

pub struct AcceleratorEngine {
    state: Mutex<EngineState>,
    bus: EventBus,
    settings: EngineSettings,
    cancel: CancellationToken,
    trigger_tx: Sender<Accelerator>,
    trigger_rx: Receiver<Accelerator>,
}

impl AcceleratorEngine {
    /// Build the engine over the compiled-in defaults and any saved overrides.
    pub fn new(
        backend: impl HotkeyBackend + 'static,
        store: ShortcutStore,
        settings: EngineSettings,
    ) -> Result<Self> {
        Self::with_shortcuts(default_shortcuts(), backend, store, settings)
    }

    /// Build the engine over a custom default table.
    ///
    /// A store that cannot be read is logged and the session runs on the
    /// defaults alone.
    pub fn with_shortcuts(
        defaults: Vec<Shortcut>,
        backend: impl HotkeyBackend + 'static,
        store: ShortcutStore,
        settings: EngineSettings,
    ) -> Result<Self> {
        let mut registry = ShortcutRegistry::with_defaults(defaults)?;

        match store.load() {
            Ok(overrides) => {
                for error in registry.apply_overrides(&overrides) {
                    warn!(category = "SHORTCUT", error = %error, "Skipping saved override");
                }
                debug!(category = "SHORTCUT", count = overrides.len(), "Applied saved overrides");
            }
            Err(e) => logging::log_error(
                "SHORTCUT",
                &e.to_string(),
                Some("loading saved overrides, using defaults"),
            ),
        }

        info!(
            category = "SHORTCUT",
            backend = backend.name(),
            shortcuts = registry.len(),
            safe_mode = settings.safe_mode,
            failure_threshold = settings.classifier.threshold(),
            "Accelerator engine ready"
        );

        let (trigger_tx, trigger_rx) = async_channel::bounded(settings.trigger_queue_capacity.max(1));
        Ok(Self {
            state: Mutex::new(EngineState {
                registry,
                registered: HashMap::new(),
                states: HashMap::new(),
                resolved: HashMap::new(),
                triggers: HashMap::new(),
                backend: Box::new(backend),
                store,
            }),
            bus: EventBus::new(),
            settings,
            cancel: CancellationToken::new(),
            trigger_tx,
            trigger_rx,
        })
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Token that stops an in-flight `register_all` between bindings.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn trigger_receiver(&self) -> Receiver<Accelerator> {
        self.trigger_rx.clone()
    }

    // ---------------------------------------------------------------------
    // Read-only views
    // ---------------------------------------------------------------------

    pub fn get(&self, id: &str) -> Option<Shortcut> {
        self.state.lock().registry.get(id).cloned()
    }

    pub fn shortcuts(&self) -> Vec<Shortcut> {
        self.state.lock().registry.shortcuts().to_vec()
    }

    pub fn by_category(&self, category: ShortcutCategory) -> Vec<Shortcut> {
        self.state
            .lock()
            .registry
            .by_category(category)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn search(&self, text: &str) -> Vec<Shortcut> {
        self.state
            .lock()
            .registry
            .search(text)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn binding_state(&self, id: &str) -> BindingState {
        self.state.lock().states.get(id).cloned().unwrap_or_default()
    }

    /// Whether `accelerator` is bound at the OS level right now.
    pub fn is_registered(&self, accelerator: &Accelerator) -> bool {
        self.state.lock().registered.contains_key(accelerator)
    }

    pub fn registered_count(&self) -> usize {
        self.state.lock().registered.len()
    }

    pub fn status(&self) -> Vec<ShortcutStatus> {
        let state = self.state.lock();
        state
            .registry
            .shortcuts()
            .iter()
            .map(|shortcut| ShortcutStatus {
                id: shortcut.id.clone(),
                name: shortcut.name.clone(),
                category: shortcut.category,
                accelerator: state.effective_accelerator(shortcut).to_canonical_string(),
                enabled: shortcut.enabled,
                state: state.states.get(&shortcut.id).cloned().unwrap_or_default(),
                triggers: state.triggers.get(&shortcut.id).cloned().unwrap_or_default(),
            })
            .collect()
    }

    pub fn find_conflicts(&self) -> Vec<ShortcutConflict> {
        let state = self.state.lock();
        state.registry.resolver(&state.resolved).find_conflicts()
    }

    /// Failures and suggestions persisted by the last registration pass.
    pub fn last_failures(&self) -> Result<FailureSnapshot> {
        Ok(self.state.lock().store.last_failures()?)
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Add a shortcut at runtime. An enabled shortcut is registered at once.
    pub fn add(&self, shortcut: Shortcut) -> Result<BindingState> {
        let id = shortcut.id.clone();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        state.registry.add(shortcut, &state.resolved)?;
        let enabled = state.registry.get(&id).is_some_and(|s| s.enabled);
        if enabled {
            self.bind(state, &id);
        }
        state.persist();
        Ok(state.states.get(&id).cloned().unwrap_or_default())
    }

    /// Point `id` at a new accelerator and re-register that one binding.
    ///
    /// Validation and conflict errors leave the table untouched. The returned
    /// state reports whether the new binding took at the OS level.
    #[instrument(skip(self), fields(category = "SHORTCUT"))]
    pub fn rebind(&self, id: &str, accelerator: &str) -> Result<BindingState> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let old = state.registry.rebind(id, accelerator, &state.resolved)?;
        info!(
            shortcut_id = id,
            from = %old,
            to = %accelerator,
            "Rebound shortcut"
        );

        let enabled = state.registry.get(id).is_some_and(|s| s.enabled);
        self.unbind(state, id);
        if enabled {
            self.bind(state, id);
        }
        state.persist();
        Ok(state.states.get(id).cloned().unwrap_or_default())
    }

    /// Flip `enabled`. Enabling registers, disabling unregisters. Returns the
    /// new `enabled` value.
    #[instrument(skip(self), fields(category = "SHORTCUT"))]
    pub fn toggle(&self, id: &str) -> Result<bool> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let enabled = state.registry.toggle(id, &state.resolved)?;
        if enabled {
            self.bind(state, id);
        } else {
            self.unbind(state, id);
        }
        state.persist();
        info!(shortcut_id = id, enabled, "Toggled shortcut");
        Ok(enabled)
    }

    /// Register every enabled shortcut, one at a time, in table order.
    ///
    /// Outcomes are aggregated into one remediation event. A cancelled pass
    /// rolls back what it registered and emits nothing.
    pub fn register_all(&self) -> RegistrationReport {
        let (report, events) = {
            let mut guard = self.state.lock();
            self.register_pass(&mut guard)
        };
        self.emit_all(&events);
        report
    }

    /// Release every OS binding and stop any in-flight pass.
    pub fn unregister_all(&self) {
        self.cancel.cancel();
        let mut guard = self.state.lock();
        // The lock is ours, so any in-flight pass has already rolled back
        self.cancel.reset();
        self.release_all(&mut guard);
    }

    /// Apply a JSON map of `{ id: { accelerator, enabled } }` atomically.
    ///
    /// Every entry is validated and the result is checked for conflicts
    /// before anything changes. Entries merge over the current table.
    pub fn import_bindings(&self, json: &str) -> Result<RegistrationReport> {
        let overrides: HashMap<String, BindingOverride> = serde_json::from_str(json)?;

        let (report, events) = {
            let mut guard = self.state.lock();
            let state = &mut *guard;

            let candidate = build_import_candidate(&state.registry, &state.resolved, &overrides)?;

            self.release_all(state);
            state.registry = candidate;
            state.persist();
            info!(category = "SHORTCUT", count = overrides.len(), "Imported bindings");
            self.register_pass(state)
        };
        self.finish_pass(report, &events)
    }

    /// Replace all customization with a built-in preset and re-register.
    ///
    /// The preset is laid over the compiled-in defaults and validated like an
    /// import, so a rejected preset leaves the table untouched.
    #[instrument(skip(self), fields(category = "SHORTCUT"))]
    pub fn apply_preset(&self, preset_id: &str) -> Result<RegistrationReport> {
        let preset = find_preset(preset_id)
            .ok_or_else(|| ShortcutError::UnknownPreset(preset_id.to_string()))?;

        let (report, events) = {
            let mut guard = self.state.lock();
            let state = &mut *guard;

            let mut base = state.registry.clone();
            base.reset_to_defaults();
            let overrides = preset.overrides(base.shortcuts());
            let candidate = build_import_candidate(&base, &HashMap::new(), &overrides)?;

            self.release_all(state);
            state.registry = candidate;
            state.resolved.clear();
            state.states.clear();
            state.persist();
            info!(
                preset = preset.id,
                bindings = preset.bindings.len(),
                exclusive = preset.exclusive,
                "Applied shortcut preset"
            );
            self.register_pass(state)
        };
        self.finish_pass(report, &events)
    }

    /// Pretty JSON of every customized binding, keyed by id.
    pub fn export_bindings(&self) -> Result<String> {
        let overrides: BTreeMap<String, BindingOverride> = self
            .state
            .lock()
            .registry
            .export_overrides()
            .into_iter()
            .collect();
        Ok(serde_json::to_string_pretty(&overrides)?)
    }

    /// Drop all customization and re-register the compiled-in table.
    pub fn reset_to_defaults(&self) -> Result<RegistrationReport> {
        let (report, events) = {
            let mut guard = self.state.lock();
            let state = &mut *guard;

            self.release_all(state);
            state.registry.reset_to_defaults();
            state.resolved.clear();
            state.states.clear();
            state.store.clear().log_err();
            state.store.clear_failures().log_err();
            info!(category = "SHORTCUT", "Reset shortcuts to defaults");
            self.register_pass(state)
        };
        self.finish_pass(report, &events)
    }

    // ---------------------------------------------------------------------
    // Trigger dispatch
    // ---------------------------------------------------------------------

    /// Resolve a fired accelerator to its shortcut and publish the action's event.
    ///
    /// Stale triggers (binding released after the press was queued) are ignored.
    pub fn handle_trigger(&self, accelerator: &Accelerator) -> Option<AppEvent> {
        let event = {
            let mut guard = self.state.lock();
            let state = &mut *guard;

            let Some(id) = state.registered.get(accelerator).cloned() else {
                debug!(category = "HOTKEY", accelerator = %accelerator, "Ignoring stale trigger");
                return None;
            };
            let shortcut = state.registry.get(&id).filter(|s| s.enabled)?;
            let event = shortcut.action.event();

            let stats = state.triggers.entry(id.clone()).or_default();
            stats.count += 1;
            stats.last_fired = Some(Utc::now());
            debug!(
                category = "HOTKEY",
                shortcut_id = %id,
                event = event.name(),
                count = stats.count,
                "Shortcut triggered"
            );
            event
        };

        self.bus.emit(&event);
        Some(event)
    }

    /// Drain the trigger queue without blocking. Returns how many events fired.
    pub fn dispatch_pending(&self) -> usize {
        let mut dispatched = 0;
        while let Ok(accelerator) = self.trigger_rx.try_recv() {
            if self.handle_trigger(&accelerator).is_some() {
                dispatched += 1;
            }
        }
        dispatched
    }

    // ---------------------------------------------------------------------
    // Internals (caller holds the lock)
    // ---------------------------------------------------------------------

    fn trigger_callback(&self) -> TriggerCallback {
        let tx = self.trigger_tx.clone();
        Arc::new(move |accelerator: &Accelerator| {
            match tx.try_send(accelerator.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(category = "HOTKEY", accelerator = %accelerator, "Trigger queue full, dropping press");
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(category = "HOTKEY", "Trigger queue closed");
                }
            }
        })
    }

    fn is_skipped(&self, shortcut: &Shortcut) -> bool {
        self.settings.safe_mode && shortcut.is_safe_mode_restricted()
    }

    /// Attempt the OS binding for one enabled shortcut.
    fn bind(&self, state: &mut EngineState, id: &str) -> BindOutcome {
        let Some(shortcut) = state.registry.get(id).cloned() else {
            return BindOutcome::Failed(FailureReason::Unknown);
        };
        if self.is_skipped(&shortcut) {
            debug!(category = "SHORTCUT", shortcut_id = id, "Safe mode, skipping");
            state.set_state(id, BindingState::Unregistered);
            return BindOutcome::Skipped;
        }

        if shortcut.accelerator.is_placeholder() {
            let chosen = state
                .registry
                .resolver(&state.resolved)
                .resolve_placeholder(id, &self.settings.placeholder_candidates);
            match chosen {
                Some(accelerator) => {
                    state.resolved.insert(id.to_string(), accelerator);
                }
                None => {
                    state.resolved.remove(id);
                }
            }
        }
        let accelerator = state.effective_accelerator(&shortcut);

        if state.registered.get(&accelerator).map(String::as_str) == Some(id) {
            state.set_state(id, BindingState::Registered);
            return BindOutcome::Registered;
        }

        if let Some(owner) = self.conflicting_owner(state, &shortcut, &accelerator) {
            warn!(
                category = "SHORTCUT",
                shortcut_id = id,
                owner_id = %owner,
                accelerator = %accelerator,
                "Accelerator already claimed by another shortcut"
            );
            state.set_state(id, BindingState::RegistrationFailed(FailureReason::Conflict));
            return BindOutcome::Failed(FailureReason::Conflict);
        }

        match state.backend.register(&accelerator, self.trigger_callback()) {
            Ok(()) => {
                state.registered.insert(accelerator.clone(), id.to_string());
                state.set_state(id, BindingState::Registered);
                debug!(category = "SHORTCUT", shortcut_id = id, accelerator = %accelerator, "Registered");
                BindOutcome::Registered
            }
            Err(e) => {
                let reason = FailureReason::from(&e);
                warn!(
                    category = "SHORTCUT",
                    shortcut_id = id,
                    accelerator = %accelerator,
                    error = %e,
                    "Registration failed"
                );
                state.set_state(id, BindingState::RegistrationFailed(reason));
                BindOutcome::Failed(reason)
            }
        }
    }

    /// Another shortcut that holds, or takes precedence over, `accelerator`.
    ///
    /// A live binding always wins; otherwise the earlier shortcut in table
    /// order does, so colliding defaults resolve deterministically.
    fn conflicting_owner(
        &self,
        state: &EngineState,
        shortcut: &Shortcut,
        accelerator: &Accelerator,
    ) -> Option<String> {
        if let Some(owner) = state.registered.get(accelerator) {
            if owner != &shortcut.id {
                return Some(owner.clone());
            }
        }
        let resolver = state.registry.resolver(&state.resolved);
        state
            .registry
            .shortcuts()
            .iter()
            .take_while(|other| other.id != shortcut.id)
            .find(|other| {
                other.enabled
                    && !self.is_skipped(other)
                    && resolver.effective_accelerator(other) == accelerator
            })
            .map(|other| other.id.clone())
    }

    fn unbind(&self, state: &mut EngineState, id: &str) {
        if let Some(accelerator) = state.registered_accelerator(id) {
            state.registered.remove(&accelerator);
            if let Err(e) = state.backend.unregister(&accelerator) {
                warn!(
                    category = "SHORTCUT",
                    shortcut_id = id,
                    accelerator = %accelerator,
                    error = %e,
                    "Failed to unregister"
                );
            }
        }
        state.set_state(id, BindingState::Unregistered);
    }

    fn release_all(&self, state: &mut EngineState) {
        state.backend.unregister_all().log_err();
        state.registered.clear();
        for binding in state.states.values_mut() {
            *binding = BindingState::Unregistered;
        }
        info!(category = "SHORTCUT", "Unregistered all shortcuts");
    }

    fn register_pass(&self, state: &mut EngineState) -> (RegistrationReport, Vec<AppEvent>) {
        let mut report = RegistrationReport::default();
        let previously_registered: HashSet<String> = state.registered.values().cloned().collect();
        let ids: Vec<String> = state.registry.enabled().map(|s| s.id.clone()).collect();

        for id in &ids {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            match self.bind(state, id) {
                BindOutcome::Registered => report.registered.push(id.clone()),
                BindOutcome::Failed(reason) => {
                    report.failures.push(FailureRecord::new(id.clone(), reason))
                }
                BindOutcome::Skipped => report.skipped.push(id.clone()),
            }
        }
        report.total = report.registered.len() + report.failures.len();

        if report.cancelled {
            for id in &report.registered {
                if !previously_registered.contains(id) {
                    self.unbind(state, id);
                }
            }
            info!(
                category = "SHORTCUT",
                rolled_back = report.registered.len(),
                "Registration pass cancelled"
            );
            return (report, Vec::new());
        }

        info!(
            category = "SHORTCUT",
            total = report.total,
            registered = report.registered.len(),
            failed = report.failed(),
            skipped = report.skipped.len(),
            "Registration pass finished"
        );

        if !self.settings.record_outcomes {
            return (report, Vec::new());
        }
        let events = self.record_outcome(state, &report);
        (report, events)
    }

    /// Persist the pass outcome and pick the remediation event, if any.
    fn record_outcome(&self, state: &mut EngineState, report: &RegistrationReport) -> Vec<AppEvent> {
        let session_completed = state
            .store
            .first_session_completed()
            .warn_on_err()
            .unwrap_or(false);
        if !report.registered.is_empty() && !session_completed {
            state.store.mark_first_session_completed().log_err();
        }

        if report.failures.is_empty() {
            state.store.clear_failures().log_err();
            return Vec::new();
        }

        let snapshot = self.failure_snapshot(state, report);
        state.store.save_failures(&snapshot).log_err();

        let remediation =
            self.settings
                .classifier
                .classify(report.failed(), report.total, session_completed);
        let event = match remediation {
            None => return Vec::new(),
            Some(Remediation::FirstLaunchWizard) => AppEvent::ShowFirstLaunchWizard,
            Some(Remediation::PermissionCheck) => AppEvent::SuggestPermissionCheck {
                failed: report.failed(),
                total: report.total,
            },
            Some(Remediation::ConflictSuggestions) => AppEvent::ShortcutConflictsDetected {
                failed: snapshot.failed_names.clone(),
                suggestions: snapshot.suggestions.clone(),
            },
        };
        logging::log(
            "SHORTCUT",
            &format!(
                "{} of {} shortcuts failed to register: {}",
                report.failed(),
                report.total,
                event.name()
            ),
        );
        vec![event]
    }

    fn failure_snapshot(&self, state: &EngineState, report: &RegistrationReport) -> FailureSnapshot {
        let mut failed_names = Vec::with_capacity(report.failures.len());
        let mut suggestions = BTreeMap::new();
        let resolver = state.registry.resolver(&state.resolved);

        for record in &report.failures {
            let Some(shortcut) = state.registry.get(&record.shortcut_id) else {
                continue;
            };
            failed_names.push(shortcut.name.clone());

            let accelerator = resolver.effective_accelerator(shortcut);
            match resolver.suggest_alternative(
                accelerator,
                &shortcut.id,
                self.settings.max_suggestion_attempts,
            ) {
                Alternative::Found(alternative) => {
                    suggestions.insert(shortcut.name.clone(), alternative.to_canonical_string());
                }
                Alternative::Exhausted { attempts } => {
                    debug!(
                        category = "SHORTCUT",
                        shortcut_id = %shortcut.id,
                        attempts,
                        "No free alternative found"
                    );
                }
            }
        }

        FailureSnapshot {
            failed_names,
            suggestions,
            records: report.failures.clone(),
        }
    }

    fn emit_all(&self, events: &[AppEvent]) {
        for event in events {
            self.bus.emit(event);
        }
    }

    /// Publish a table-replacing pass's events; a cancelled pass is an error.
    fn finish_pass(
        &self,
        report: RegistrationReport,
        events: &[AppEvent],
    ) -> Result<RegistrationReport> {
        self.emit_all(events);
        if report.cancelled {
            return Err(EngineError::Cancelled);
        }
        Ok(report)
    }
}

impl Drop for AcceleratorEngine {
    fn drop(&mut self) {
        self.trigger_tx.close();
    }
}

/// Validate `overrides` against `registry` and return the table they produce.
fn build_import_candidate(
    registry: &ShortcutRegistry,
    resolved: &HashMap<String, Accelerator>,
    overrides: &HashMap<String, BindingOverride>,
) -> std::result::Result<ShortcutRegistry, ShortcutError> {
    let mut ids: Vec<&String> = overrides.keys().collect();
    ids.sort();

    if let Some(id) = ids.iter().find(|id| registry.get(id).is_none()) {
        return Err(ShortcutError::UnknownShortcut(id.to_string()));
    }

    let mut candidate = registry.clone();
    for error in candidate.apply_overrides(overrides) {
        match error {
            PersistenceError::InvalidAccelerator { error, .. } => {
                return Err(ShortcutError::Validation(error));
            }
            PersistenceError::ReservedAccelerator { accelerator, .. } => {
                return Err(ShortcutError::Reserved { accelerator });
            }
            other => warn!(category = "SHORTCUT", error = %other, "Unexpected import error"),
        }
    }

    let touched: HashSet<&str> = ids.iter().map(|id| id.as_str()).collect();
    let conflict = candidate
        .resolver(resolved)
        .find_conflicts()
        .into_iter()
        .find(|c| touched.contains(c.winner_id.as_str()) || touched.contains(c.loser_id.as_str()));
    if let Some(conflict) = conflict {
        let owner_id = if touched.contains(conflict.loser_id.as_str()) {
            conflict.winner_id
        } else {
            conflict.loser_id
        };
        return Err(ShortcutError::Conflict {
            accelerator: conflict.accelerator.to_canonical_string(),
            owner_id,
        });
    }

    Ok(candidate)
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
