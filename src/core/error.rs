// SPDX-License-Identifier: MIT OR Apache-2.0

//! EventHub Core Error Types
//!
//! Error handling for hub and module registry operations. Misuse of the
//! owner-only processor lifecycle operations (double `init`, triggers on an
//! uninitialized handle) is a programming defect and panics instead of
//! surfacing here.

use thiserror::Error;

/// Result type for EventHub operations
pub type EventHubResult<T> = Result<T, EventHubError>;

/// EventHub error types
#[derive(Error, Debug)]
pub enum EventHubError {
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        config_key: Option<String>,
    },

    #[error("Module '{name}' not found")]
    ModuleNotFound { name: String },

    #[error("Module '{name}' is already registered")]
    AlreadyRegistered { name: String },

    #[error("Hub is shut down")]
    HubShutDown,

    #[error("{0}")]
    Other(String),
}

// Custom error creation helpers
impl EventHubError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            config_key: None,
        }
    }

    /// Create a configuration error with a specific key
    pub fn configuration_with_key(message: impl Into<String>, config_key: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            config_key: Some(config_key.into()),
        }
    }

    /// Create a module not found error
    pub fn module_not_found(name: impl Into<String>) -> Self {
        Self::ModuleNotFound { name: name.into() }
    }

    /// Create an already registered error
    pub fn already_registered(name: impl Into<String>) -> Self {
        Self::AlreadyRegistered { name: name.into() }
    }

    /// Create a generic error from a string
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error() {
        let error = EventHubError::configuration("test error");
        assert!(matches!(error, EventHubError::Configuration { .. }));
    }

    #[test]
    fn test_module_not_found_error() {
        let error = EventHubError::module_not_found("analytics");
        assert_eq!(error.to_string(), "Module 'analytics' not found");
    }

    #[test]
    fn test_already_registered_error() {
        let error = EventHubError::already_registered("analytics");
        assert!(matches!(error, EventHubError::AlreadyRegistered { .. }));
    }
}
