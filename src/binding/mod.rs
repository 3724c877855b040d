//! OS global-hotkey binding.
//!
//! `HotkeyBackend` is the register/unregister primitive the engine consumes.
//! Failures come back as a structured `BindingError`, never as free text to
//! be pattern-matched.
//!
//! - `GlobalHotkeyBackend` - backed by the `global-hotkey` crate
//! - `FakeBackend` - never touches the OS; records calls, injects failures,
//!   fires triggers on demand

mod fake;
mod global;

use std::sync::Arc;

use crate::accelerator::Accelerator;
use crate::error::BindingError;

pub use fake::FakeBackend;
pub use global::GlobalHotkeyBackend;

/// Invoked with the accelerator that fired. May run on any thread.
pub type TriggerCallback = Arc<dyn Fn(&Accelerator) + Send + Sync>;

pub trait HotkeyBackend: Send {
    /// Bind `accelerator` at the OS level.
    fn register(
        &mut self,
        accelerator: &Accelerator,
        on_trigger: TriggerCallback,
    ) -> Result<(), BindingError>;

    /// Release `accelerator`. Releasing an unbound accelerator is a no-op.
    fn unregister(&mut self, accelerator: &Accelerator) -> Result<(), BindingError>;

    fn unregister_all(&mut self) -> Result<(), BindingError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
