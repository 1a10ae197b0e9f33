// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle wrapper around a boxed processing strategy.

use std::fmt::Debug;
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;

use crate::core::event::Event;
use crate::core::module::EventModule;
use crate::core::processor::lifecycle::LifecycleCell;
use crate::core::processor::EventProcessor;

/// A registered processor: the boxed strategy plus the lifecycle state the
/// framework manages on its behalf.
///
/// Handles are created and driven by the owning [`EventModule`]; user code
/// holds them through `Arc` and uses the public query surface. The handle
/// never owns its parent: the parent link is a `Weak` bound once during
/// two-phase initialization and resolved with upgrade-or-absent semantics.
pub struct ProcessorHandle {
    strategy: Box<dyn EventProcessor>,
    /// Written exactly once by `init`, read-shared afterwards.
    parent: OnceCell<Weak<EventModule>>,
    /// Done once `on_registered` has returned.
    registered: LifecycleCell,
    /// Done once `on_unregistered` has returned.
    unregistered: LifecycleCell,
}

impl Debug for ProcessorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorHandle")
            .field("name", &self.strategy.name())
            .field("fully_registered", &self.is_fully_registered())
            .field("fully_unregistered", &self.is_fully_unregistered())
            .finish()
    }
}

impl ProcessorHandle {
    pub(crate) fn new(strategy: Box<dyn EventProcessor>) -> Self {
        Self {
            strategy,
            parent: OnceCell::new(),
            registered: LifecycleCell::new(),
            unregistered: LifecycleCell::new(),
        }
    }

    /// Diagnostic name of the wrapped strategy.
    pub fn name(&self) -> &str {
        self.strategy.name()
    }

    /// Run the wrapped strategy on an event. `None` drops the event from
    /// further pipeline flow.
    ///
    /// The hub only routes events to fully registered handles, but the call
    /// itself is safe concurrently with any lifecycle operation.
    pub fn process(&self, event: &Event) -> Option<Event> {
        self.strategy.process(self, event)
    }

    /// Resolve the parent module, or `None` if the handle is uninitialized
    /// or the module has been dropped.
    ///
    /// NOTE: in rare cases where this is called concurrently with module
    /// unregistration, it can return a module whose unregistration is
    /// already in flight. Callers must tolerate that.
    pub fn parent_module(&self) -> Option<Arc<EventModule>> {
        self.parent.get().and_then(Weak::upgrade)
    }

    /// True once registration is complete and `on_registered` has returned.
    ///
    /// Safe to poll from any thread; a true result also publishes every
    /// write made inside the hook to the polling thread.
    pub fn is_fully_registered(&self) -> bool {
        self.registered.is_done()
    }

    /// True once unregistration is complete and `on_unregistered` has
    /// returned.
    pub fn is_fully_unregistered(&self) -> bool {
        self.unregistered.is_done()
    }

    /// Finish two-phase initialization by binding the parent module.
    ///
    /// Must be called exactly once, before any trigger. A second call is a
    /// programming defect and panics.
    pub(crate) fn init(&self, parent: Weak<EventModule>) {
        if self.parent.set(parent).is_err() {
            panic!("processor '{}' initialized twice", self.strategy.name());
        }
    }

    /// Claim the registration transition and run `on_registered`. No-op for
    /// every caller after the first, concurrent callers included.
    pub(crate) fn trigger_registered(&self) {
        if !self.registered.try_begin() {
            return;
        }
        log::debug!("processor '{}' registering", self.strategy.name());
        self.strategy.on_registered(self);
        self.registered.complete();
        log::debug!("processor '{}' fully registered", self.strategy.name());
    }

    /// Claim the unregistration transition and run `on_unregistered`.
    /// Symmetric to `trigger_registered`.
    pub(crate) fn trigger_unregistered(&self) {
        if !self.unregistered.try_begin() {
            return;
        }
        log::debug!("processor '{}' unregistering", self.strategy.name());
        self.strategy.on_unregistered(self);
        self.unregistered.complete();
        log::debug!("processor '{}' fully unregistered", self.strategy.name());
    }
}
