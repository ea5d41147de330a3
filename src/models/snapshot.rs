//! Current-snapshot payloads as written by the scrapers.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{AppError, Result};

use super::{Namespace, RankedItem};

/// A scraper payload: one ranked list, or ranked lists keyed by category.
///
/// The shape is detected from the JSON container type.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SnapshotPayload {
    Flat(Vec<Value>),
    Categorized(Map<String, Value>),
}

/// Raw items of one namespace, not yet validated.
#[derive(Debug, Clone)]
pub struct NamespaceSnapshot {
    pub namespace: Namespace,
    pub raw_items: Vec<Value>,
}

impl NamespaceSnapshot {
    /// Validate every raw item. The first bad item rejects the whole namespace.
    pub fn items(&self) -> Result<Vec<RankedItem>> {
        self.raw_items
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                RankedItem::from_value(raw.clone())
                    .map_err(|msg| AppError::invalid_item(self.namespace.key.as_str(), index, msg))
            })
            .collect()
    }
}

impl SnapshotPayload {
    /// Parse a payload from bytes.
    pub fn from_slice(source: &str, bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            AppError::malformed_snapshot(source, format!("expected a list or a category map: {e}"))
        })
    }

    /// Resolve the payload into a uniform list of namespaces, in payload order.
    ///
    /// A category whose value is not a list becomes an error entry so the
    /// remaining categories can still be processed.
    pub fn into_namespaces(
        self,
        source: &str,
        source_label: &str,
    ) -> Vec<std::result::Result<NamespaceSnapshot, AppError>> {
        match self {
            SnapshotPayload::Flat(raw_items) => vec![Ok(NamespaceSnapshot {
                namespace: Namespace::flat(source, source_label),
                raw_items,
            })],
            SnapshotPayload::Categorized(categories) => categories
                .into_iter()
                .map(|(category, value)| match value {
                    Value::Array(raw_items) => Ok(NamespaceSnapshot {
                        namespace: Namespace::categorized(source, source_label, &category),
                        raw_items,
                    }),
                    other => Err(AppError::malformed_snapshot(
                        source,
                        format!("category '{category}' is not a list (got {})", type_name(&other)),
                    )),
                })
                .collect(),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
