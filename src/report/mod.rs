//! Digest rendering.
//!
//! Consumes a `RunReport` (delta entries, current items, highlights) and
//! never recomputes deltas itself.

pub mod markdown;

pub use markdown::{render, title, write_report};
