// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Processor Lifecycle
//!
//! Pluggable event processors and their registration lifecycle.
//!
//! A concrete processor implements [`EventProcessor`], the processing
//! strategy plus optional registration/unregistration hooks. The framework
//! wraps every strategy in a [`ProcessorHandle`], which owns the lifecycle
//! state the strategy must never manage itself:
//!
//! - a non-owning link back to the parent [`EventModule`], resolved with
//!   upgrade-or-absent semantics,
//! - two one-shot lifecycle cells guaranteeing each hook runs exactly once,
//!   with acquire/release visibility across threads.
//!
//! ## Threading
//!
//! Lifecycle queries (`is_fully_registered`, `is_fully_unregistered`,
//! `parent_module`) are safe from any thread at any time, including
//! concurrently with the handle's own triggers and with module teardown.
//! The triggers themselves are crate-internal and driven by the hub worker.
//!
//! ## Ordering
//!
//! `on_registered` runs once, asynchronously, after the parent module's own
//! registration hook has completed. `on_unregistered` runs once, before the
//! parent module finishes unregistering. Once `is_fully_registered()`
//! returns true on any thread, every write performed inside `on_registered`
//! is visible to that thread.
//!
//! [`EventModule`]: crate::core::module::EventModule

pub mod handle;
pub mod lifecycle;

pub use self::handle::ProcessorHandle;
pub(crate) use self::lifecycle::LifecycleCell;

use crate::core::event::Event;

/// Processing strategy plugged into a [`ProcessorHandle`].
///
/// Implementations should keep construction cheap and defer any work that
/// depends on a live, registered module to `on_registered`.
pub trait EventProcessor: Send + Sync {
    /// Diagnostic name, used in logs.
    fn name(&self) -> &str;

    /// Transform an event, or return `None` to drop it from further
    /// pipeline flow. Only invoked by the framework once the handle is
    /// fully registered.
    fn process(&self, handle: &ProcessorHandle, event: &Event) -> Option<Event>;

    /// Invoked exactly once, shortly after the processor is registered and
    /// after the parent module's own registration hook has run. Default
    /// no-op.
    fn on_registered(&self, handle: &ProcessorHandle) {
        let _ = handle;
    }

    /// Invoked exactly once, shortly before the parent module finishes
    /// unregistering. Default no-op.
    fn on_unregistered(&self, handle: &ProcessorHandle) {
        let _ = handle;
    }
}
