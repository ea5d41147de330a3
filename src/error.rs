// src/error.rs

//! Unified error handling for the rank tracker.

use std::fmt;

use thiserror::Error;

/// Result type alias for rankwatch operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file missing or unparsable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Persisted history exists but cannot be parsed. Always fatal.
    #[error("Malformed history store {location}: {source}")]
    MalformedHistory {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    /// A current-snapshot file exists but has an unusable shape.
    #[error("Malformed snapshot for source '{source_name}': {message}")]
    MalformedSnapshot {
        source_name: String,
        message: String,
    },

    /// An item inside a namespace could not be read as a ranked item.
    #[error("Invalid item #{index} in '{namespace}': {message}")]
    InvalidItem {
        namespace: String,
        index: usize,
        message: String,
    },

    /// Two namespaces in one run derived the same key.
    #[error("Namespace key collision: '{key}'")]
    KeyCollision { key: String },

    /// Notification delivery failed
    #[error("Notify error via {channel}: {message}")]
    Notify { channel: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a malformed snapshot error.
    pub fn malformed_snapshot(source_name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::MalformedSnapshot {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Create an invalid item error.
    pub fn invalid_item(namespace: impl Into<String>, index: usize, message: impl fmt::Display) -> Self {
        Self::InvalidItem {
            namespace: namespace.into(),
            index,
            message: message.to_string(),
        }
    }

    /// Create a notification error.
    pub fn notify(channel: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Notify {
            channel: channel.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MalformedHistory { .. } | Self::Config(_))
    }
}
