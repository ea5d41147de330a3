//! Application configuration structures.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data, history, backup and report locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Leaderboard sources, processed in this order
    #[serde(default = "defaults::sources")]
    pub sources: Vec<SourceConfig>,

    /// Digest rendering settings
    #[serde(default)]
    pub report: ReportConfig,

    /// Notification channel switches
    #[serde(default)]
    pub notify: NotifyConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("cannot read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| AppError::config(format!("cannot parse {}: {}", path.display(), e)))
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(AppError::validation("No sources defined"));
        }

        let mut names = HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(AppError::validation("sources.name is empty"));
            }
            if source.file.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "sources.file is empty for '{}'",
                    source.name
                )));
            }
            if !names.insert(source.name.as_str()) {
                return Err(AppError::validation(format!(
                    "duplicate source name '{}'",
                    source.name
                )));
            }
        }

        // A name under another source's `<name>_` prefix shares its history keys.
        for source in &self.sources {
            if let Some(other) = self.sources.iter().find(|other| {
                other.name != source.name && source.name.starts_with(&format!("{}_", other.name))
            }) {
                return Err(AppError::validation(format!(
                    "source name '{}' overlaps the history keys of '{}'",
                    source.name, other.name
                )));
            }
        }

        if self.report.top_n == 0 {
            return Err(AppError::validation("report.top_n must be > 0"));
        }
        if self.report.highlight_limit == 0 {
            return Err(AppError::validation("report.highlight_limit must be > 0"));
        }
        if self.report.jump_threshold == 0 {
            return Err(AppError::validation("report.jump_threshold must be >= 1"));
        }
        if self.notify.timeout_secs == 0 {
            return Err(AppError::validation("notify.timeout_secs must be > 0"));
        }
        Ok(())
    }

    /// Resolve the snapshot file of a source.
    pub fn snapshot_path(&self, source: &SourceConfig) -> PathBuf {
        self.paths.data_dir.join(&source.file)
    }

    pub fn history_path(&self) -> PathBuf {
        self.paths.data_dir.join(&self.paths.history_file)
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.paths.data_dir.join(&self.paths.backup_dir)
    }

    /// Look up a source by name.
    pub fn source(&self, name: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.name == name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            sources: defaults::sources(),
            report: ReportConfig::default(),
            notify: NotifyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// File system layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding snapshots and history
    #[serde(default = "defaults::data_dir")]
    pub data_dir: PathBuf,

    /// History store file, relative to `data_dir`
    #[serde(default = "defaults::history_file")]
    pub history_file: String,

    /// Backup directory, relative to `data_dir`
    #[serde(default = "defaults::backup_dir")]
    pub backup_dir: String,

    #[serde(default = "defaults::report_dir")]
    pub report_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
            history_file: defaults::history_file(),
            backup_dir: defaults::backup_dir(),
            report_dir: defaults::report_dir(),
        }
    }
}

/// One external leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceConfig {
    /// Stable name, used as the history key prefix
    pub name: String,

    /// Display label, e.g. "LMSYS"
    pub label: String,

    /// Snapshot file name inside `data_dir`
    pub file: String,

    /// Opaque item fields to show as extra report columns
    #[serde(default)]
    pub columns: Vec<String>,

    /// Display titles per category label
    #[serde(default)]
    pub categories: BTreeMap<String, String>,
}

impl SourceConfig {
    pub fn new(name: &str, label: &str, file: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            file: file.to_string(),
            columns: Vec::new(),
            categories: BTreeMap::new(),
        }
    }

    /// Display title of a category, falling back to the raw label.
    pub fn category_title<'a>(&'a self, category: &'a str) -> &'a str {
        self.categories
            .get(category)
            .map(String::as_str)
            .unwrap_or(category)
    }
}

/// Digest rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Rows per namespace table
    #[serde(default = "defaults::top_n")]
    pub top_n: usize,

    /// Entries per highlight list
    #[serde(default = "defaults::highlight_limit")]
    pub highlight_limit: usize,

    /// Minimum shift for a large move
    #[serde(default = "defaults::jump_threshold")]
    pub jump_threshold: u32,

    /// Report title prefix; the date is appended
    #[serde(default = "defaults::title")]
    pub title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: defaults::top_n(),
            highlight_limit: defaults::highlight_limit(),
            jump_threshold: defaults::jump_threshold(),
            title: defaults::title(),
        }
    }
}

/// Notification channel switches. Credentials come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "defaults::enabled")]
    pub serverchan_enabled: bool,

    #[serde(default)]
    pub wxpusher_enabled: bool,

    /// Request timeout in seconds
    #[serde(default = "defaults::notify_timeout")]
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            serverchan_enabled: true,
            wxpusher_enabled: false,
            timeout_secs: defaults::notify_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use super::SourceConfig;

    // Path defaults
    pub fn data_dir() -> PathBuf {
        PathBuf::from("data")
    }
    pub fn history_file() -> String {
        "history.json".into()
    }
    pub fn backup_dir() -> String {
        "backups".into()
    }
    pub fn report_dir() -> PathBuf {
        PathBuf::from("reports")
    }

    // Report defaults
    pub fn top_n() -> usize {
        10
    }
    pub fn highlight_limit() -> usize {
        5
    }
    pub fn jump_threshold() -> u32 {
        2
    }
    pub fn title() -> String {
        "🤖 AI Model Trends".into()
    }

    // Notify defaults
    pub fn enabled() -> bool {
        true
    }
    pub fn notify_timeout() -> u64 {
        10
    }

    pub fn log_level() -> String {
        "info".into()
    }

    fn titles(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // Source defaults
    pub fn sources() -> Vec<SourceConfig> {
        vec![
            SourceConfig {
                columns: vec!["tokens".into(), "growth".into()],
                ..SourceConfig::new("openrouter", "OpenRouter", "openrouter_current.json")
            },
            SourceConfig {
                columns: vec!["votes".into()],
                categories: titles(&[
                    ("Text", "Text"),
                    ("Code", "Coding"),
                    ("Vision", "Vision / Multimodal"),
                    ("Text-to-Image", "Text-to-Image"),
                    ("Image Edit", "Image Editing"),
                    ("Search", "Search-Augmented"),
                    ("Text-to-Video", "Text-to-Video"),
                    ("Image-to-Video", "Image-to-Video"),
                ]),
                ..SourceConfig::new("lmsys", "LMSYS", "lmsys_current.json")
            },
            SourceConfig {
                categories: titles(&[
                    ("Intelligence", "Intelligence Index"),
                    ("Speed", "Output Speed (tokens/s)"),
                    ("Price", "Price (USD / 1M tokens)"),
                ]),
                ..SourceConfig::new("artalanaly", "AA", "artalanaly_current.json")
            },
            SourceConfig::new("hf_leaderboard", "HF Open LLM", "hf_leaderboard_current.json"),
        ]
    }
}
