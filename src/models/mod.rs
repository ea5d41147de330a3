// src/models/mod.rs

//! Domain models for the rank tracker.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod delta;
mod item;
mod namespace;
mod snapshot;

// Re-export all public types
pub use config::{
    Config, LoggingConfig, NotifyConfig, PathsConfig, ReportConfig, SourceConfig,
};
pub use delta::{Delta, DeltaEntry};
pub use item::{RankedItem, display_value, rank_from_value};
pub use namespace::{Namespace, NamespaceKey, OVERALL};
pub use snapshot::{NamespaceSnapshot, SnapshotPayload};
