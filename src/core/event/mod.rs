// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event payload flowing through the hub.
//!
//! Events are immutable once built; processors never mutate an event in
//! place but return a new one (or drop it). The `data` field is an opaque
//! JSON value as far as the hub is concerned; only processors interpret it.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A single event routed through the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique id, assigned at construction.
    pub id: Uuid,
    /// Event name, used for routing diagnostics and logging.
    pub name: String,
    /// Wall-clock creation time in epoch milliseconds.
    pub timestamp_ms: i64,
    /// Opaque payload.
    pub data: Value,
}

impl Event {
    /// Create a new event with a null payload, stamped with the current time.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            timestamp_ms: Utc::now().timestamp_millis(),
            data: Value::Null,
        }
    }

    /// Builder-style payload attachment.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Produce a transformed copy of this event carrying a new payload.
    ///
    /// Id, name and timestamp are preserved so an event can be traced across
    /// a processor chain.
    pub fn transformed(&self, data: Value) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            timestamp_ms: self.timestamp_ms,
            data,
        }
    }
}
