//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── *_current.json        # Scraper output, read-only here
//! ├── history.json          # History store (atomic replace)
//! └── backups/
//!     └── history_YYYYmmdd_HHMMSS.json
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Local;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::storage::RankStorage;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    history_key: String,
    backup_dir: String,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            history_key: "history.json".to_string(),
            backup_dir: "backups".to_string(),
        }
    }

    /// Create a LocalStorage laid out according to the configured paths.
    pub fn from_config(config: &Config) -> Self {
        Self {
            root_dir: config.paths.data_dir.clone(),
            history_key: config.paths.history_file.clone(),
            backup_dir: config.paths.backup_dir.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Create a file that must not exist yet.
    async fn write_new(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await
    }

    /// Backup file stem, e.g. `history` for `history.json`.
    fn backup_stem(&self) -> String {
        Path::new(&self.history_key)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "history".to_string())
    }
}

#[async_trait]
impl RankStorage for LocalStorage {
    async fn read_snapshot(&self, file: &str) -> Result<Option<Vec<u8>>> {
        self.read_bytes(file).await
    }

    async fn read_history(&self) -> Result<Option<Vec<u8>>> {
        self.read_bytes(&self.history_key).await
    }

    async fn write_history(&self, bytes: &[u8]) -> Result<()> {
        self.write_bytes(&self.history_key, bytes).await
    }

    async fn backup_history(&self) -> Result<Option<String>> {
        let Some(bytes) = self.read_bytes(&self.history_key).await? else {
            return Ok(None);
        };

        let dir = self.path(&self.backup_dir);
        tokio::fs::create_dir_all(&dir).await?;

        let stem = self.backup_stem();
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");

        // Same-second runs get a numeric suffix; existing backups are never touched.
        let mut attempt = 0u32;
        loop {
            let name = if attempt == 0 {
                format!("{stem}_{timestamp}.json")
            } else {
                format!("{stem}_{timestamp}_{attempt}.json")
            };
            let path = dir.join(name);

            match Self::write_new(&path, &bytes).await {
                Ok(()) => return Ok(Some(path.display().to_string())),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(AppError::Io(e)),
            }
        }
    }

    fn history_location(&self) -> String {
        self.path(&self.history_key).display().to_string()
    }

    async fn list_backups(&self) -> Result<Vec<String>> {
        let dir = self.path(&self.backup_dir);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };

        let mut backups = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                backups.push(path.display().to_string());
            }
        }
        // Timestamped names sort chronologically.
        backups.sort();
        Ok(backups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.write_history(b"{}").await.unwrap();
        let data = storage.read_history().await.unwrap();
        assert_eq!(data, Some(b"{}".to_vec()));
        assert!(!tmp.path().join("history.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        assert!(storage.read_history().await.unwrap().is_none());
        assert!(storage.read_snapshot("nope.json").await.unwrap().is_none());
        assert!(storage.list_backups().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backup_without_history_is_noop() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        assert!(storage.backup_history().await.unwrap().is_none());
        assert!(!tmp.path().join("backups").exists());
    }

    #[tokio::test]
    async fn test_backups_are_write_once() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.write_history(br#"{"a": []}"#).await.unwrap();
        let first = storage.backup_history().await.unwrap().unwrap();

        storage.write_history(br#"{"b": []}"#).await.unwrap();
        let second = storage.backup_history().await.unwrap().unwrap();

        assert_ne!(first, second);
        assert_eq!(std::fs::read(&first).unwrap(), br#"{"a": []}"#.to_vec());
        assert_eq!(std::fs::read(&second).unwrap(), br#"{"b": []}"#.to_vec());
        assert_eq!(storage.list_backups().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_from_config_layout() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.data_dir = tmp.path().to_path_buf();
        config.paths.history_file = "ranks.json".to_string();

        let storage = LocalStorage::from_config(&config);
        storage.write_history(b"{}").await.unwrap();
        assert!(tmp.path().join("ranks.json").exists());

        let backup = storage.backup_history().await.unwrap().unwrap();
        assert!(backup.contains("ranks_"));
    }
}
