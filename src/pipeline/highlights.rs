//! Cross-source highlight extraction.
//!
//! Flattens every namespace's delta report into `(entry, source label)` pairs
//! and picks out new entrants and large moves in either direction.

use serde::Serialize;

use crate::models::{Delta, DeltaEntry};

/// A notable entry, tagged with where it was seen.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Highlight {
    pub model_id: String,
    pub source_label: String,
    pub rank: u32,
    pub delta: Delta,
}

/// Highlight lists for one run.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Highlights {
    pub new_entrants: Vec<Highlight>,
    pub risers: Vec<Highlight>,
    pub fallers: Vec<Highlight>,
}

impl Highlights {
    /// Collect highlights from labelled delta reports, in processing order.
    ///
    /// Each list is truncated to `limit`; a move counts as large when its
    /// magnitude is at least `threshold`.
    pub fn collect<'a, I, L>(sections: I, limit: usize, threshold: u32) -> Self
    where
        I: IntoIterator<Item = (L, &'a [DeltaEntry])>,
        L: AsRef<str>,
    {
        let mut highlights = Highlights::default();

        for (label, entries) in sections {
            for entry in entries {
                let target = match entry.delta {
                    Delta::New => &mut highlights.new_entrants,
                    Delta::Up(n) if n >= threshold => &mut highlights.risers,
                    Delta::Down(n) if n >= threshold => &mut highlights.fallers,
                    _ => continue,
                };

                if target.len() < limit {
                    target.push(Highlight {
                        model_id: entry.model_id.clone(),
                        source_label: label.as_ref().to_string(),
                        rank: entry.rank,
                        delta: entry.delta,
                    });
                }
            }
        }

        highlights
    }

    pub fn is_empty(&self) -> bool {
        self.new_entrants.is_empty() && self.risers.is_empty() && self.fallers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RankedItem;

    fn entry(id: &str, rank: u32, delta: Delta) -> DeltaEntry {
        DeltaEntry::new(&RankedItem::new(id, rank), delta)
    }

    fn ids(list: &[Highlight]) -> Vec<String> {
        list.iter()
            .map(|h| format!("{}@{}", h.model_id, h.source_label))
            .collect()
    }

    #[test]
    fn test_groups_by_kind_in_processing_order() {
        let openrouter = vec![
            entry("a", 1, Delta::New),
            entry("b", 2, Delta::Up(3)),
            entry("c", 3, Delta::Down(1)),
        ];
        let vision = vec![
            entry("d", 1, Delta::Up(1)),
            entry("e", 2, Delta::New),
            entry("f", 3, Delta::Down(4)),
            entry("g", 4, Delta::Unchanged),
        ];

        let highlights = Highlights::collect(
            [
                ("OpenRouter", openrouter.as_slice()),
                ("LMSYS Vision", vision.as_slice()),
            ],
            5,
            2,
        );

        assert_eq!(
            ids(&highlights.new_entrants),
            vec!["a@OpenRouter", "e@LMSYS Vision"]
        );
        assert_eq!(ids(&highlights.risers), vec!["b@OpenRouter"]);
        assert_eq!(ids(&highlights.fallers), vec!["f@LMSYS Vision"]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let entries = vec![entry("x", 1, Delta::Up(2)), entry("y", 5, Delta::Down(2))];
        let highlights = Highlights::collect([("AA Price", entries.as_slice())], 5, 2);

        assert_eq!(highlights.risers.len(), 1);
        assert_eq!(highlights.fallers.len(), 1);
    }

    #[test]
    fn test_truncated_to_limit() {
        let entries: Vec<DeltaEntry> = (1..=8)
            .map(|i| entry(&format!("m{i}"), i, Delta::New))
            .collect();

        let highlights = Highlights::collect([("LMSYS Text", entries.as_slice())], 5, 2);
        assert_eq!(highlights.new_entrants.len(), 5);
        assert_eq!(highlights.new_entrants[4].model_id, "m5");
    }

    #[test]
    fn test_empty_namespaces_tolerated() {
        let empty: Vec<DeltaEntry> = Vec::new();
        let highlights = Highlights::collect(
            [("HF Open LLM", empty.as_slice()), ("OpenRouter", empty.as_slice())],
            5,
            2,
        );
        assert!(highlights.is_empty());

        let none = Highlights::collect(std::iter::empty::<(&str, &[DeltaEntry])>(), 5, 2);
        assert!(none.is_empty());
    }
}
