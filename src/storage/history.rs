//! Persistent rank history.
//!
//! Holds the last committed snapshot for every namespace key. The whole store
//! is rewritten on each commit; before the first overwrite in a process the
//! persisted file is copied to a write-once backup.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{NamespaceKey, RankedItem};
use crate::storage::RankStorage;

/// Persisted form: namespace key → last committed items.
pub type HistoryMap = BTreeMap<NamespaceKey, Vec<RankedItem>>;

/// History store loaded once per run and mutated only through `commit`.
pub struct HistoryStore {
    storage: Arc<dyn RankStorage>,
    entries: HistoryMap,
    /// Location of the backup taken this run, once taken
    backup: Option<String>,
    backup_done: bool,
}

impl HistoryStore {
    /// Load the store. A missing store is an empty history; an unparsable
    /// one is fatal.
    pub async fn load(storage: Arc<dyn RankStorage>) -> Result<Self> {
        let entries = match storage.read_history().await? {
            Some(bytes) => serde_json::from_slice::<HistoryMap>(&bytes).map_err(|source| {
                AppError::MalformedHistory {
                    location: storage.history_location(),
                    source,
                }
            })?,
            None => {
                log::info!(
                    "No history at {}, starting fresh",
                    storage.history_location()
                );
                HistoryMap::new()
            }
        };

        log::debug!("Loaded history with {} namespace keys", entries.len());

        Ok(Self {
            storage,
            entries,
            backup: None,
            backup_done: false,
        })
    }

    /// Last committed items for a key; empty if the key was never seen.
    pub fn snapshot(&self, key: &NamespaceKey) -> &[RankedItem] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, key: &NamespaceKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &NamespaceKey> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Backup taken by this store instance, if any.
    pub fn backup_location(&self) -> Option<&str> {
        self.backup.as_deref()
    }

    /// Replace the snapshot of one key and persist the whole store.
    ///
    /// Not safe to interleave across store instances sharing one backend.
    pub async fn commit(&mut self, key: NamespaceKey, items: Vec<RankedItem>) -> Result<()> {
        self.ensure_backup().await?;

        self.entries.insert(key, items);
        self.flush().await
    }

    /// Commit several keys in order, persisting after each.
    pub async fn commit_all<I>(&mut self, batch: I) -> Result<usize>
    where
        I: IntoIterator<Item = (NamespaceKey, Vec<RankedItem>)>,
    {
        let mut committed = 0;
        for (key, items) in batch {
            self.commit(key, items).await?;
            committed += 1;
        }
        Ok(committed)
    }

    /// Copy the persisted store before it is first overwritten.
    ///
    /// Marked done only after the copy succeeds; until then every commit fails.
    async fn ensure_backup(&mut self) -> Result<()> {
        if self.backup_done {
            return Ok(());
        }

        if let Some(location) = self.storage.backup_history().await? {
            log::info!("History backed up to {}", location);
            self.backup = Some(location);
        }
        self.backup_done = true;
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.entries)?;
        self.storage.write_history(&bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;
    use serde_json::json;
    use tempfile::TempDir;

    fn storage(tmp: &TempDir) -> Arc<dyn RankStorage> {
        Arc::new(LocalStorage::new(tmp.path()))
    }

    #[tokio::test]
    async fn test_first_run_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = HistoryStore::load(storage(&tmp)).await.unwrap();

        assert!(store.is_empty());
        assert!(store.snapshot(&NamespaceKey::flat("openrouter")).is_empty());
    }

    #[tokio::test]
    async fn test_malformed_history_is_fatal() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("history.json"), "{ not json").unwrap();

        let err = HistoryStore::load(storage(&tmp)).await.err().unwrap();
        assert!(matches!(err, AppError::MalformedHistory { .. }));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_bad_rank_in_history_is_fatal() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("history.json"),
            r#"{"lmsys": [{"model_id": "A", "rank": "first"}]}"#,
        )
        .unwrap();

        let err = HistoryStore::load(storage(&tmp)).await.err().unwrap();
        assert!(matches!(err, AppError::MalformedHistory { .. }));
    }

    #[tokio::test]
    async fn test_commit_then_reload_is_exact() {
        let tmp = TempDir::new().unwrap();
        let items = vec![
            RankedItem::new("A", 1)
                .with_score("1301")
                .with_field("votes", json!("12,345"))
                .with_field("timestamp", json!("2026-10-16T08:00:00")),
            RankedItem::new("B", 2).with_score(json!(98.5)),
        ];

        let mut store = HistoryStore::load(storage(&tmp)).await.unwrap();
        store
            .commit(NamespaceKey::categorized("lmsys", "Text"), items.clone())
            .await
            .unwrap();

        let reloaded = HistoryStore::load(storage(&tmp)).await.unwrap();
        assert_eq!(
            reloaded.snapshot(&NamespaceKey::categorized("lmsys", "Text")),
            items.as_slice()
        );
    }

    #[tokio::test]
    async fn test_commit_keeps_other_keys() {
        let tmp = TempDir::new().unwrap();
        let mut store = HistoryStore::load(storage(&tmp)).await.unwrap();
        store
            .commit(NamespaceKey::flat("openrouter"), vec![RankedItem::new("A", 1)])
            .await
            .unwrap();

        let mut store = HistoryStore::load(storage(&tmp)).await.unwrap();
        store
            .commit(NamespaceKey::flat("hf_leaderboard"), vec![RankedItem::new("Z", 1)])
            .await
            .unwrap();

        let reloaded = HistoryStore::load(storage(&tmp)).await.unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(
            reloaded.snapshot(&NamespaceKey::flat("openrouter"))[0].model_id,
            "A"
        );
    }

    #[tokio::test]
    async fn test_no_backup_on_first_run() {
        let tmp = TempDir::new().unwrap();
        let mut store = HistoryStore::load(storage(&tmp)).await.unwrap();
        store
            .commit(NamespaceKey::flat("openrouter"), vec![RankedItem::new("A", 1)])
            .await
            .unwrap();

        assert!(store.backup_location().is_none());
        assert!(!tmp.path().join("backups").exists());
    }

    #[tokio::test]
    async fn test_single_backup_holds_pre_commit_content() {
        let tmp = TempDir::new().unwrap();
        let original = r#"{"openrouter": [{"model_id": "A", "rank": 2}]}"#;
        std::fs::write(tmp.path().join("history.json"), original).unwrap();

        let backend = storage(&tmp);
        let mut store = HistoryStore::load(Arc::clone(&backend)).await.unwrap();
        store
            .commit(NamespaceKey::flat("openrouter"), vec![RankedItem::new("A", 1)])
            .await
            .unwrap();
        store
            .commit(NamespaceKey::categorized("lmsys", "Code"), vec![RankedItem::new("B", 1)])
            .await
            .unwrap();

        let backups = backend.list_backups().await.unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(std::fs::read_to_string(&backups[0]).unwrap(), original);
        assert_eq!(store.backup_location(), Some(backups[0].as_str()));
    }

    #[tokio::test]
    async fn test_commit_all_counts() {
        let tmp = TempDir::new().unwrap();
        let mut store = HistoryStore::load(storage(&tmp)).await.unwrap();

        let committed = store
            .commit_all(vec![
                (NamespaceKey::categorized("lmsys", "Code"), vec![RankedItem::new("A", 1)]),
                (NamespaceKey::categorized("lmsys", "Vision"), vec![RankedItem::new("A", 4)]),
            ])
            .await
            .unwrap();

        assert_eq!(committed, 2);
        assert_eq!(store.len(), 2);
    }
}
