//! Storage abstractions for snapshot and history persistence.
//!
//! ## Directory Structure
//!
//! ```text
//! data/
//! ├── openrouter_current.json   # Current snapshots (written by scrapers)
//! ├── lmsys_current.json
//! ├── history.json              # Last committed snapshot per namespace key
//! └── backups/                  # Write-once copies taken before overwrite
//!     ├── history_20260101_080000.json
//!     └── history_20260102_080000.json
//! ```

pub mod history;
pub mod local;
pub mod snapshot;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use history::HistoryStore;
pub use local::LocalStorage;
pub use snapshot::load_snapshot;

/// Trait for rank data storage backends.
#[async_trait]
pub trait RankStorage: Send + Sync {
    /// Read a current-snapshot file, `None` if the scraper produced nothing.
    async fn read_snapshot(&self, file: &str) -> Result<Option<Vec<u8>>>;

    /// Read the persisted history store, `None` on first run.
    async fn read_history(&self) -> Result<Option<Vec<u8>>>;

    /// Replace the persisted history store in full.
    async fn write_history(&self, bytes: &[u8]) -> Result<()>;

    /// Copy the persisted history store to a new write-once backup.
    ///
    /// Returns the backup location, or `None` if there is nothing to back up.
    async fn backup_history(&self) -> Result<Option<String>>;

    /// Human-readable location of the history store.
    fn history_location(&self) -> String;

    /// Existing backup locations, oldest first.
    async fn list_backups(&self) -> Result<Vec<String>>;
}
