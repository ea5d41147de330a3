//! Namespace keys joining current snapshots to history.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category label shown for single-list sources.
pub const OVERALL: &str = "Overall";

/// History join key: `source` for flat lists, `source_category` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespaceKey(String);

impl NamespaceKey {
    /// Key for a source that publishes a single ranked list.
    pub fn flat(source: &str) -> Self {
        Self(source.to_string())
    }

    /// Key for one category of a category-partitioned source.
    ///
    /// Category labels are used verbatim, so an upstream rename starts a new track.
    pub fn categorized(source: &str, category: &str) -> Self {
        Self(format!("{source}_{category}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamespaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NamespaceKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One rank track: a source, optionally narrowed to a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// Source name (history prefix)
    pub source: String,
    /// Human-readable source label, e.g. "LMSYS"
    pub source_label: String,
    /// Category label from the payload, `None` for flat sources
    pub category: Option<String>,
    pub key: NamespaceKey,
}

impl Namespace {
    pub fn flat(source: &str, source_label: &str) -> Self {
        Self {
            source: source.to_string(),
            source_label: source_label.to_string(),
            category: None,
            key: NamespaceKey::flat(source),
        }
    }

    pub fn categorized(source: &str, source_label: &str, category: &str) -> Self {
        Self {
            source: source.to_string(),
            source_label: source_label.to_string(),
            category: Some(category.to_string()),
            key: NamespaceKey::categorized(source, category),
        }
    }

    /// Category for display; flat sources show the overall sentinel.
    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or(OVERALL)
    }

    /// Label used to tag highlights, e.g. "LMSYS Vision" or "OpenRouter".
    pub fn label(&self) -> String {
        match &self.category {
            Some(category) => format!("{} {}", self.source_label, category),
            None => self.source_label.clone(),
        }
    }
}
