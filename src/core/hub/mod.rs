// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Event Hub
//!
//! Module registry plus the lifecycle/dispatch worker.
//!
//! All lifecycle transitions and event dispatch run as commands on a single
//! worker thread fed by a crossbeam channel. Draining the queue on one
//! thread is what serializes lifecycle transitions (module registered before
//! its processors, processors unregistered before their module) and what
//! makes the hooks run asynchronously relative to the caller that triggered
//! them.
//!
//! The registry maps module names to `Arc<EventModule>`. Unregistration
//! removes the entry immediately and hands the final `Arc` to the worker;
//! once the worker finishes deactivation and drops it, processor handles
//! resolving their parent see absence.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use crossbeam_utils::CachePadded;
use dashmap::DashMap;

use crate::core::config::HubConfig;
use crate::core::error::{EventHubError, EventHubResult};
use crate::core::event::Event;
use crate::core::module::{EventModule, ModuleHooks};
use crate::core::processor::{EventProcessor, ProcessorHandle};

/// Commands drained by the hub worker, in submission order.
enum HubCommand {
    RegisterModule(Arc<EventModule>),
    UnregisterModule(Arc<EventModule>),
    AttachProcessor {
        module: Arc<EventModule>,
        handle: Arc<ProcessorHandle>,
    },
    Dispatch(Event),
    Shutdown,
}

/// Dispatch counters, padded to avoid false sharing on the hot path.
#[derive(Debug, Default)]
struct HubStats {
    events_dispatched: CachePadded<AtomicU64>,
    events_dropped: CachePadded<AtomicU64>,
}

/// Point-in-time copy of the hub's dispatch counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubStatsSnapshot {
    /// Events accepted for dispatch by the worker.
    pub events_dispatched: u64,
    /// Module chains that dropped the event instead of completing it.
    pub events_dropped: u64,
}

/// The hub: owns the module registry and the worker thread.
///
/// Dropping the hub shuts the worker down, deactivating any modules still
/// registered.
pub struct EventHub {
    config: HubConfig,
    modules: Arc<DashMap<String, Arc<EventModule>>>,
    sender: Sender<HubCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
    is_shutdown: AtomicBool,
    stats: Arc<HubStats>,
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("name", &self.config.name)
            .field("modules", &self.modules.len())
            .field("is_shutdown", &self.is_shutdown.load(Ordering::Relaxed))
            .finish()
    }
}

impl EventHub {
    /// Create a hub and spawn its worker thread.
    pub fn new(config: HubConfig) -> EventHubResult<Self> {
        config.validate()?;

        let (sender, receiver) = match config.channel_capacity {
            Some(capacity) => crossbeam_channel::bounded(capacity),
            None => crossbeam_channel::unbounded(),
        };
        let modules: Arc<DashMap<String, Arc<EventModule>>> = Arc::new(DashMap::new());
        let stats = Arc::new(HubStats::default());

        let worker = {
            let modules = Arc::clone(&modules);
            let stats = Arc::clone(&stats);
            let log_dropped = config.log_dropped_events;
            thread::Builder::new()
                .name(format!("{}-worker", config.name))
                .spawn(move || run_worker(receiver, modules, stats, log_dropped))
                .map_err(|e| EventHubError::other(format!("failed to spawn hub worker: {e}")))?
        };

        Ok(Self {
            config,
            modules,
            sender,
            worker: Mutex::new(Some(worker)),
            is_shutdown: AtomicBool::new(false),
            stats,
        })
    }

    /// Create a hub with default configuration.
    pub fn with_defaults() -> EventHubResult<Self> {
        Self::new(HubConfig::default())
    }

    /// Hub name from configuration.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Register a module. The module appears in the registry immediately;
    /// its registration hooks run on the worker shortly afterwards.
    pub fn register_module(
        &self,
        hooks: Box<dyn ModuleHooks>,
    ) -> EventHubResult<Arc<EventModule>> {
        self.ensure_running()?;
        let module = EventModule::new(hooks);
        let name = module.name().to_string();

        // Entry API keeps concurrent registrations of the same name from
        // both succeeding.
        match self.modules.entry(name.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(EventHubError::already_registered(name));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&module));
            }
        }
        log::info!("module '{name}' added to hub '{}'", self.config.name);
        self.send(HubCommand::RegisterModule(Arc::clone(&module)))?;
        Ok(module)
    }

    /// Unregister a module by name. The registry entry is removed
    /// immediately; processor and module unregistration hooks run on the
    /// worker, after which the hub drops its reference to the module.
    pub fn unregister_module(&self, name: &str) -> EventHubResult<()> {
        self.ensure_running()?;
        let (_, module) = self
            .modules
            .remove(name)
            .ok_or_else(|| EventHubError::module_not_found(name))?;
        log::info!("module '{name}' removed from hub '{}'", self.config.name);
        self.send(HubCommand::UnregisterModule(module))
    }

    /// Attach a processor strategy to a registered module. The returned
    /// handle becomes fully registered once the worker has run its hook.
    pub fn attach_processor(
        &self,
        module_name: &str,
        strategy: Box<dyn EventProcessor>,
    ) -> EventHubResult<Arc<ProcessorHandle>> {
        self.ensure_running()?;
        let module = self
            .module(module_name)
            .ok_or_else(|| EventHubError::module_not_found(module_name))?;
        let handle = module.attach_processor(strategy);
        self.send(HubCommand::AttachProcessor {
            module,
            handle: Arc::clone(&handle),
        })?;
        Ok(handle)
    }

    /// Queue an event for dispatch through every registered module.
    pub fn dispatch(&self, event: Event) -> EventHubResult<()> {
        self.ensure_running()?;
        self.send(HubCommand::Dispatch(event))
    }

    /// Look up a registered module by name.
    pub fn module(&self, name: &str) -> Option<Arc<EventModule>> {
        self.modules.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Names of the currently registered modules.
    pub fn module_names(&self) -> Vec<String> {
        self.modules.iter().map(|e| e.key().clone()).collect()
    }

    /// Current dispatch counters.
    pub fn stats(&self) -> HubStatsSnapshot {
        HubStatsSnapshot {
            events_dispatched: self.stats.events_dispatched.load(Ordering::Relaxed),
            events_dropped: self.stats.events_dropped.load(Ordering::Relaxed),
        }
    }

    /// Shut the hub down: deactivate every remaining module, stop the
    /// worker and join it. Idempotent; later calls are no-ops.
    pub fn shutdown(&self) {
        if self
            .is_shutdown
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        log::info!("hub '{}' shutting down", self.config.name);
        // Send can only fail if the worker is already gone.
        let _ = self.sender.send(HubCommand::Shutdown);
        if let Some(worker) = self.worker.lock().expect("Mutex poisoned").take() {
            if worker.join().is_err() {
                log::error!("hub '{}' worker panicked", self.config.name);
            }
        }
    }

    fn ensure_running(&self) -> EventHubResult<()> {
        if self.is_shutdown.load(Ordering::Acquire) {
            return Err(EventHubError::HubShutDown);
        }
        Ok(())
    }

    fn send(&self, command: HubCommand) -> EventHubResult<()> {
        self.sender
            .send(command)
            .map_err(|_| EventHubError::HubShutDown)
    }
}

impl Drop for EventHub {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(
    receiver: Receiver<HubCommand>,
    modules: Arc<DashMap<String, Arc<EventModule>>>,
    stats: Arc<HubStats>,
    log_dropped: bool,
) {
    while let Ok(command) = receiver.recv() {
        match command {
            HubCommand::RegisterModule(module) => module.activate(),
            HubCommand::UnregisterModule(module) => module.deactivate(),
            HubCommand::AttachProcessor { module, handle } => {
                // A module that is still queued for registration gets the
                // handle on its RegisterModule command instead; one that is
                // already unregistered leaves the handle inert.
                if module.is_registered() && !module.is_unregistered() {
                    handle.trigger_registered();
                }
            }
            HubCommand::Dispatch(event) => {
                stats.events_dispatched.fetch_add(1, Ordering::Relaxed);
                for entry in modules.iter() {
                    let module = entry.value();
                    if !module.is_registered() || module.is_unregistered() {
                        continue;
                    }
                    if module.process_chain(event.clone()).is_none() {
                        stats.events_dropped.fetch_add(1, Ordering::Relaxed);
                        if log_dropped {
                            log::debug!(
                                "event '{}' ({}) dropped by module '{}'",
                                event.name,
                                event.id,
                                module.name()
                            );
                        }
                    }
                }
            }
            HubCommand::Shutdown => {
                for entry in modules.iter() {
                    entry.value().deactivate();
                }
                modules.clear();
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::HubConfig;

    struct PlainHooks(&'static str);

    impl ModuleHooks for PlainHooks {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_duplicate_module_name_rejected() {
        let hub = EventHub::with_defaults().unwrap();
        hub.register_module(Box::new(PlainHooks("analytics"))).unwrap();
        let err = hub
            .register_module(Box::new(PlainHooks("analytics")))
            .unwrap_err();
        assert!(matches!(err, EventHubError::AlreadyRegistered { .. }));
        hub.shutdown();
    }

    #[test]
    fn test_unregister_unknown_module() {
        let hub = EventHub::with_defaults().unwrap();
        let err = hub.unregister_module("missing").unwrap_err();
        assert!(matches!(err, EventHubError::ModuleNotFound { .. }));
        hub.shutdown();
    }

    #[test]
    fn test_operations_after_shutdown_fail() {
        let hub = EventHub::with_defaults().unwrap();
        hub.shutdown();
        hub.shutdown(); // idempotent
        assert!(matches!(
            hub.register_module(Box::new(PlainHooks("late"))),
            Err(EventHubError::HubShutDown)
        ));
        assert!(matches!(
            hub.dispatch(Event::new("e")),
            Err(EventHubError::HubShutDown)
        ));
    }

    #[test]
    fn test_module_lookup() {
        let hub = EventHub::new(HubConfig {
            name: "lookup".into(),
            ..HubConfig::default()
        })
        .unwrap();
        let module = hub.register_module(Box::new(PlainHooks("analytics"))).unwrap();
        let found = hub.module("analytics").unwrap();
        assert!(Arc::ptr_eq(&module, &found));
        assert_eq!(hub.module_names(), vec!["analytics".to_string()]);

        hub.unregister_module("analytics").unwrap();
        assert!(hub.module("analytics").is_none());
        hub.shutdown();
    }
}
