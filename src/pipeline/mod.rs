//! Pipeline entry points for rank tracking.
//!
//! - `DeltaEngine`: classify rank movement for one namespace
//! - `Highlights`: new entrants and large moves across all sources
//! - `run_pipeline`: the full batch run (compare → render → commit → notify)

pub mod delta;
pub mod highlights;
pub mod run;

pub use delta::{DeltaEngine, compare_items};
pub use highlights::{Highlight, Highlights};
pub use run::{
    NamespaceReport, RunOptions, RunReport, RunSummary, Skipped, SourceReport, collect_reports,
    run_pipeline,
};
