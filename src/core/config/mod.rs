// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hub configuration.
//!
//! Settings come from code defaults or a TOML snippet; TOML values override
//! the defaults field by field.

use serde::Deserialize;

use crate::core::error::{EventHubError, EventHubResult};

/// Configuration for an [`EventHub`](crate::core::hub::EventHub).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Hub name, also used for the worker thread name.
    pub name: String,
    /// Command channel capacity. `None` means unbounded; `Some(n)` makes
    /// submitters block once n commands are queued.
    pub channel_capacity: Option<usize>,
    /// Emit a debug log line whenever a module chain drops an event.
    pub log_dropped_events: bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            name: "eventhub".to_string(),
            channel_capacity: None,
            log_dropped_events: true,
        }
    }
}

impl HubConfig {
    /// Parse a configuration from a TOML document.
    pub fn from_toml_str(text: &str) -> EventHubResult<Self> {
        let config: HubConfig = toml::from_str(text)
            .map_err(|e| EventHubError::configuration(format!("invalid hub config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field constraints.
    pub fn validate(&self) -> EventHubResult<()> {
        if self.name.is_empty() {
            return Err(EventHubError::configuration_with_key(
                "hub name must not be empty",
                "name",
            ));
        }
        if self.channel_capacity == Some(0) {
            return Err(EventHubError::configuration_with_key(
                "channel capacity must be at least 1 when bounded",
                "channel_capacity",
            ));
        }
        Ok(())
    }
}
