//! Rank delta calculation.
//!
//! Compares a namespace's current items against its last committed snapshot.
//! The engine borrows the history store immutably, so no commit can happen
//! while an engine is alive.

use std::collections::HashMap;

use crate::models::{Delta, DeltaEntry, NamespaceKey, RankedItem};
use crate::storage::HistoryStore;

/// Read-only view of history used to classify rank movement.
pub struct DeltaEngine<'a> {
    history: &'a HistoryStore,
}

impl<'a> DeltaEngine<'a> {
    pub fn new(history: &'a HistoryStore) -> Self {
        Self { history }
    }

    /// Classify every current item against the previous snapshot of `key`.
    ///
    /// Output follows the order of `current`. Duplicate ids in `current` are
    /// each reported; duplicates in history resolve to the last occurrence.
    pub fn compare(&self, key: &NamespaceKey, current: &[RankedItem]) -> Vec<DeltaEntry> {
        compare_items(self.history.snapshot(key), current)
    }
}

/// Classify `current` against `previous`.
pub fn compare_items(previous: &[RankedItem], current: &[RankedItem]) -> Vec<DeltaEntry> {
    let prev_ranks: HashMap<&str, u32> = previous
        .iter()
        .map(|item| (item.model_id.as_str(), item.rank))
        .collect();

    current
        .iter()
        .map(|item| {
            let delta = match prev_ranks.get(item.model_id.as_str()) {
                Some(&prev_rank) => Delta::between(prev_rank, item.rank),
                None => Delta::New,
            };
            DeltaEntry::new(item, delta)
        })
        .collect()
}
