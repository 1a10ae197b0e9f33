// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Event Modules
//!
//! A module is the unit of composition in the hub: it owns zero or more
//! processor handles and drives their lifecycle in lockstep with its own.
//!
//! ## Ordering
//!
//! Lifecycle ordering is module-scoped: a module registers itself first and
//! then registers its processors; it unregisters its processors first and
//! then finishes unregistering itself. Hooks for both run on the hub worker
//! thread, never on the caller's thread.

use std::fmt::Debug;
use std::sync::{Arc, RwLock};

use crate::core::event::Event;
use crate::core::processor::{EventProcessor, LifecycleCell, ProcessorHandle};

/// User-supplied module behavior: a name plus optional lifecycle hooks.
pub trait ModuleHooks: Send + Sync {
    /// Registry key for the module. Must be unique within a hub.
    fn name(&self) -> &str;

    /// Invoked exactly once when the module is registered, before any of
    /// its processors' registration hooks. Default no-op.
    fn on_registered(&self, module: &EventModule) {
        let _ = module;
    }

    /// Invoked exactly once when the module is unregistered, after all of
    /// its processors' unregistration hooks. Default no-op.
    fn on_unregistered(&self, module: &EventModule) {
        let _ = module;
    }
}

/// A registered module: owns its processor handles and its own two one-shot
/// lifecycle transitions.
///
/// Modules are always held through `Arc`; processors link back with `Weak`,
/// so dropping the last `Arc` (the hub does this on unregistration) is what
/// makes `ProcessorHandle::parent_module` go absent.
pub struct EventModule {
    hooks: Box<dyn ModuleHooks>,
    /// Read-heavy during dispatch, written only when a processor attaches.
    processors: RwLock<Vec<Arc<ProcessorHandle>>>,
    registered: LifecycleCell,
    unregistered: LifecycleCell,
}

impl Debug for EventModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventModule")
            .field("name", &self.name())
            .field("processors", &self.processor_count())
            .field("registered", &self.is_registered())
            .field("unregistered", &self.is_unregistered())
            .finish()
    }
}

impl EventModule {
    pub(crate) fn new(hooks: Box<dyn ModuleHooks>) -> Arc<Self> {
        Arc::new(Self {
            hooks,
            processors: RwLock::new(Vec::new()),
            registered: LifecycleCell::new(),
            unregistered: LifecycleCell::new(),
        })
    }

    /// Registry key.
    pub fn name(&self) -> &str {
        self.hooks.name()
    }

    /// True once the module's own registration hook has returned.
    pub fn is_registered(&self) -> bool {
        self.registered.is_done()
    }

    /// True once the module's own unregistration hook has returned.
    pub fn is_unregistered(&self) -> bool {
        self.unregistered.is_done()
    }

    /// Number of attached processors.
    pub fn processor_count(&self) -> usize {
        self.processors.read().expect("RwLock poisoned").len()
    }

    /// Attached processor handles, in attach order.
    pub fn processors(&self) -> Vec<Arc<ProcessorHandle>> {
        self.processors.read().expect("RwLock poisoned").clone()
    }

    /// Wrap a strategy in a handle, bind it to this module and attach it.
    /// Registration of the handle is triggered separately by the hub worker.
    pub(crate) fn attach_processor(
        self: &Arc<Self>,
        strategy: Box<dyn EventProcessor>,
    ) -> Arc<ProcessorHandle> {
        let handle = Arc::new(ProcessorHandle::new(strategy));
        handle.init(Arc::downgrade(self));
        self.processors
            .write()
            .expect("RwLock poisoned")
            .push(Arc::clone(&handle));
        handle
    }

    /// Run the module's registration: own hook first, then every attached
    /// processor. Idempotent for the module's own transition; processor
    /// triggers carry their own one-shot guards.
    pub(crate) fn activate(&self) {
        if self.registered.try_begin() {
            log::debug!("module '{}' registering", self.name());
            self.hooks.on_registered(self);
            self.registered.complete();
            log::debug!("module '{}' fully registered", self.name());
        }
        for handle in self.processors().iter() {
            handle.trigger_registered();
        }
    }

    /// Run the module's unregistration: every attached processor first, then
    /// the module's own hook. A handle that never registered (attached while
    /// unregistration was already queued) is left inert rather than
    /// unregistered out of order.
    pub(crate) fn deactivate(&self) {
        for handle in self.processors().iter() {
            if handle.is_fully_registered() {
                handle.trigger_unregistered();
            }
        }
        if self.unregistered.try_begin() {
            log::debug!("module '{}' unregistering", self.name());
            self.hooks.on_unregistered(self);
            self.unregistered.complete();
            log::debug!("module '{}' fully unregistered", self.name());
        }
    }

    /// Fold an event through the module's live processors, in attach order.
    ///
    /// Handles that are not yet fully registered, or already unregistered,
    /// are skipped. `None` from any processor drops the event.
    ///
    /// The handle list is cloned up front so no lock is held while strategy
    /// code runs; a strategy may attach further processors to its own
    /// module from inside `process`.
    pub(crate) fn process_chain(&self, event: Event) -> Option<Event> {
        let mut current = event;
        for handle in self.processors().iter() {
            if !handle.is_fully_registered() || handle.is_fully_unregistered() {
                continue;
            }
            current = handle.process(&current)?;
        }
        Some(current)
    }
}
