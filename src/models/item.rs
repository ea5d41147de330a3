//! Ranked leaderboard item.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One entry of a leaderboard as produced by a scraper.
///
/// Only `model_id` and `rank` are interpreted. `score` and every other field
/// are carried through untouched so the report can show them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedItem {
    /// Stable identifier within one namespace
    pub model_id: String,

    /// Position on the board, 1 is best
    #[serde(deserialize_with = "coerce_rank")]
    pub rank: u32,

    /// Opaque display value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Value>,

    /// Any other fields (tokens, votes, timestamps, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RankedItem {
    /// Build an item with no extra fields.
    pub fn new(model_id: impl Into<String>, rank: u32) -> Self {
        Self {
            model_id: model_id.into(),
            rank,
            score: None,
            extra: Map::new(),
        }
    }

    /// Attach a score.
    pub fn with_score(mut self, score: impl Into<Value>) -> Self {
        self.score = Some(score.into());
        self
    }

    /// Attach an opaque display field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Look up an opaque field by name, `score` included.
    pub fn field(&self, key: &str) -> Option<&Value> {
        if key == "score" {
            return self.score.as_ref();
        }
        self.extra.get(key)
    }

    /// Parse a raw scraper value, rejecting anything without a usable id or rank.
    pub fn from_value(value: Value) -> Result<Self, String> {
        let item: Self = serde_json::from_value(value).map_err(|e| e.to_string())?;
        if item.model_id.trim().is_empty() {
            return Err("model_id is empty".to_string());
        }
        Ok(item)
    }
}

/// Render an opaque value for display (strings unquoted).
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Interpret a JSON value as a rank: positive integers, integral floats and
/// numeric strings are accepted.
pub fn rank_from_value(value: &Value) -> Result<u32, String> {
    let rank = match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.is_finite() => f as i64,
                    _ => return Err(format!("rank {n} is not an integer")),
                }
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("rank {s:?} is not an integer"))?,
        other => return Err(format!("rank {other} is not an integer")),
    };

    if rank < 1 {
        return Err(format!("rank {rank} must be >= 1"));
    }
    u32::try_from(rank).map_err(|_| format!("rank {rank} is out of range"))
}

fn coerce_rank<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    rank_from_value(&value).map_err(serde::de::Error::custom)
}
