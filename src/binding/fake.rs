use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::accelerator::{Accelerator, FUNCTION_KEY_PLACEHOLDER};
use crate::error::BindingError;

use super::{HotkeyBackend, TriggerCallback};

#[derive(Default)]
struct FakeState {
    bound: HashMap<Accelerator, TriggerCallback>,
    /// Accelerators in registration order, for assertions
    order: Vec<Accelerator>,
    failures: HashMap<Accelerator, BindingError>,
    fail_all: Option<BindingError>,
    register_calls: usize,
    unregister_calls: usize,
}

/// In-process backend that never touches the OS.
///
/// Clones share state, so a test can keep a handle after moving the backend
/// into the engine. Also used by CLI commands that only edit saved bindings.
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future registration of `accelerator` fail with `error`.
    pub fn fail_on(&self, accelerator: &Accelerator, error: BindingError) {
        self.state.lock().failures.insert(accelerator.clone(), error);
    }

    /// Make every future registration fail with `error`.
    pub fn fail_all(&self, error: BindingError) {
        self.state.lock().fail_all = Some(error);
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock();
        state.failures.clear();
        state.fail_all = None;
    }

    pub fn is_bound(&self, accelerator: &Accelerator) -> bool {
        self.state.lock().bound.contains_key(accelerator)
    }

    /// Currently bound accelerators, in the order they were registered.
    pub fn bound(&self) -> Vec<Accelerator> {
        self.state.lock().order.clone()
    }

    pub fn register_calls(&self) -> usize {
        self.state.lock().register_calls
    }

    pub fn unregister_calls(&self) -> usize {
        self.state.lock().unregister_calls
    }

    /// Simulate the OS delivering a press. Returns false if nothing is bound.
    pub fn fire(&self, accelerator: &Accelerator) -> bool {
        // Call outside the lock; the callback may re-enter the backend
        let callback = self.state.lock().bound.get(accelerator).cloned();
        match callback {
            Some(callback) => {
                callback(accelerator);
                true
            }
            None => false,
        }
    }
}

impl HotkeyBackend for FakeBackend {
    fn register(
        &mut self,
        accelerator: &Accelerator,
        on_trigger: TriggerCallback,
    ) -> Result<(), BindingError> {
        let mut state = self.state.lock();
        state.register_calls += 1;

        if accelerator.key() == FUNCTION_KEY_PLACEHOLDER {
            return Err(BindingError::UnsupportedKey(accelerator.key().to_string()));
        }
        if let Some(error) = state.fail_all.clone() {
            return Err(error);
        }
        if let Some(error) = state.failures.get(accelerator) {
            return Err(error.clone());
        }
        if state.bound.contains_key(accelerator) {
            return Err(BindingError::AlreadyBoundElsewhere);
        }

        state.bound.insert(accelerator.clone(), on_trigger);
        state.order.push(accelerator.clone());
        debug!(category = "HOTKEY", accelerator = %accelerator, "Fake register");
        Ok(())
    }

    fn unregister(&mut self, accelerator: &Accelerator) -> Result<(), BindingError> {
        let mut state = self.state.lock();
        state.unregister_calls += 1;
        if state.bound.remove(accelerator).is_some() {
            state.order.retain(|a| a != accelerator);
        }
        Ok(())
    }

    fn unregister_all(&mut self) -> Result<(), BindingError> {
        let mut state = self.state.lock();
        state.unregister_calls += 1;
        state.bound.clear();
        state.order.clear();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
