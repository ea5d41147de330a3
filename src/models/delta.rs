//! Rank movement classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::RankedItem;

/// Movement of one model since the last recorded snapshot of its namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delta {
    /// Not present in the previous snapshot
    New,
    /// Moved toward rank 1 by `n` positions
    Up(u32),
    /// Moved away from rank 1 by `n` positions
    Down(u32),
    /// Same rank as before
    Unchanged,
}

impl Delta {
    /// Classify a move from `previous` to `current` rank.
    pub fn between(previous: u32, current: u32) -> Self {
        let shift = i64::from(previous) - i64::from(current);
        match shift {
            s if s > 0 => Delta::Up(s as u32),
            s if s < 0 => Delta::Down(s.unsigned_abs() as u32),
            _ => Delta::Unchanged,
        }
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delta::New => f.write_str("New"),
            Delta::Up(n) => write!(f, "↑{n}"),
            Delta::Down(n) => write!(f, "↓{n}"),
            Delta::Unchanged => f.write_str("-"),
        }
    }
}

impl FromStr for Delta {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_n = |rest: &str| -> Result<u32, String> {
            match rest.parse::<u32>() {
                Ok(n) if n >= 1 => Ok(n),
                _ => Err(format!("invalid delta: {s:?}")),
            }
        };

        match s {
            "New" => Ok(Delta::New),
            "-" => Ok(Delta::Unchanged),
            _ => {
                if let Some(rest) = s.strip_prefix('↑') {
                    parse_n(rest).map(Delta::Up)
                } else if let Some(rest) = s.strip_prefix('↓') {
                    parse_n(rest).map(Delta::Down)
                } else {
                    Err(format!("invalid delta: {s:?}"))
                }
            }
        }
    }
}

impl Serialize for Delta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Delta {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One row of a delta report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeltaEntry {
    pub model_id: String,
    pub rank: u32,
    pub delta: Delta,
    /// Score as scraped, `"-"` when the source has none
    pub score: Value,
}

impl DeltaEntry {
    pub fn new(item: &RankedItem, delta: Delta) -> Self {
        Self {
            model_id: item.model_id.clone(),
            rank: item.rank,
            delta,
            score: item.score.clone().unwrap_or_else(|| Value::from("-")),
        }
    }
}
