// SPDX-License-Identifier: MIT OR Apache-2.0

//! # EventHub
//!
//! A small modular event-bus framework. Applications are composed of
//! *modules*; each module owns zero or more pluggable *event processors*
//! that transform or drop events flowing through the hub.
//!
//! The heart of the crate is the processor lifecycle contract in
//! [`crate::core::processor`]: registration and unregistration hooks fire exactly
//! once, in module-scoped order, with acquire/release visibility across
//! threads, while the processor keeps only a non-owning link back to its
//! parent module.

pub mod core;

pub use crate::core::config::HubConfig;
pub use crate::core::error::{EventHubError, EventHubResult};
pub use crate::core::event::Event;
pub use crate::core::hub::{EventHub, HubStatsSnapshot};
pub use crate::core::module::{EventModule, ModuleHooks};
pub use crate::core::processor::{EventProcessor, ProcessorHandle};
