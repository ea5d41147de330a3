//! Current-snapshot loading.

use crate::error::Result;
use crate::models::{SnapshotPayload, SourceConfig};
use crate::storage::RankStorage;

/// Load the current snapshot of a source.
///
/// Returns `Ok(None)` when the scraper left no file for this run.
pub async fn load_snapshot(
    storage: &dyn RankStorage,
    source: &SourceConfig,
) -> Result<Option<SnapshotPayload>> {
    match storage.read_snapshot(&source.file).await? {
        Some(bytes) => SnapshotPayload::from_slice(&source.name, &bytes).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::storage::LocalStorage;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_snapshot_is_none() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let source = SourceConfig::new("openrouter", "OpenRouter", "openrouter_current.json");

        assert!(load_snapshot(&storage, &source).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_categorized_snapshot() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("lmsys_current.json"),
            r#"{"Code": [{"model_id": "A", "rank": 1}], "Vision": [{"model_id": "A", "rank": 2}]}"#,
        )
        .unwrap();

        let storage = LocalStorage::new(tmp.path());
        let source = SourceConfig::new("lmsys", "LMSYS", "lmsys_current.json");
        let payload = load_snapshot(&storage, &source).await.unwrap().unwrap();

        assert!(matches!(payload, SnapshotPayload::Categorized(_)));
    }

    #[tokio::test]
    async fn test_garbage_snapshot_is_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("hf.json"), "<html>").unwrap();

        let storage = LocalStorage::new(tmp.path());
        let source = SourceConfig::new("hf_leaderboard", "HF", "hf.json");
        let err = load_snapshot(&storage, &source).await.unwrap_err();

        assert!(matches!(err, AppError::MalformedSnapshot { .. }));
    }
}
