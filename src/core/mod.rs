// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod config;
pub mod error;
pub mod event;
pub mod hub;
pub mod module;
pub mod processor;

pub use self::config::HubConfig;
pub use self::error::{EventHubError, EventHubResult};
pub use self::event::Event;
pub use self::hub::{EventHub, HubStatsSnapshot};
pub use self::module::{EventModule, ModuleHooks};
pub use self::processor::{EventProcessor, ProcessorHandle};
