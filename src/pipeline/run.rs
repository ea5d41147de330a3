// src/pipeline/run.rs

//! Batch run: compare every namespace, render, then commit.
//!
//! History is loaded once and only read while deltas are computed. Commits
//! start after the report is written, so no namespace is ever compared
//! against a snapshot committed earlier in the same run.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::error::{AppError, Result};
use crate::models::{
    Config, DeltaEntry, Namespace, NamespaceKey, NamespaceSnapshot, RankedItem, SourceConfig,
};
use crate::notify::NotifierHub;
use crate::pipeline::{DeltaEngine, Highlights};
use crate::report::markdown;
use crate::storage::{HistoryStore, RankStorage, load_snapshot};
use crate::utils::log;

/// Delta report of one namespace with the current items it was built from.
///
/// `entries[i]` always describes `items[i]`.
#[derive(Debug, Clone)]
pub struct NamespaceReport {
    pub namespace: Namespace,
    pub entries: Vec<DeltaEntry>,
    pub items: Vec<RankedItem>,
}

impl NamespaceReport {
    /// Entries paired with their current items.
    pub fn rows(&self) -> impl Iterator<Item = (&DeltaEntry, &RankedItem)> {
        self.entries.iter().zip(self.items.iter())
    }
}

/// All namespaces of one source.
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub source: SourceConfig,
    pub namespaces: Vec<NamespaceReport>,
}

/// Something that was left out of the run, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    /// Source name or namespace key
    pub name: String,
    pub reason: String,
}

/// Everything the renderer needs for one run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub generated_at: DateTime<Local>,
    pub sources: Vec<SourceReport>,
    pub highlights: Highlights,
    /// Sources without usable snapshot data
    pub skipped_sources: Vec<Skipped>,
    /// Namespaces rejected during comparison
    pub failed_namespaces: Vec<Skipped>,
}

impl RunReport {
    pub fn namespaces(&self) -> impl Iterator<Item = &NamespaceReport> {
        self.sources.iter().flat_map(|s| s.namespaces.iter())
    }

    pub fn namespace_count(&self) -> usize {
        self.namespaces().count()
    }
}

/// Switches for a run.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Write history after reporting
    pub commit: bool,
    /// Deliver the digest to notification channels
    pub notify: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            commit: true,
            notify: true,
        }
    }
}

/// Outcome of a run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub namespaces_compared: usize,
    pub namespaces_failed: usize,
    pub sources_skipped: usize,
    pub committed: usize,
    pub report_path: PathBuf,
    pub backup: Option<String>,
    /// `None` when notification was not attempted
    pub notified: Option<bool>,
}

/// Compare every configured source against history.
///
/// Missing or malformed sources and rejected namespaces are recorded and
/// skipped; they never abort the run.
pub async fn collect_reports(
    config: &Config,
    storage: &dyn RankStorage,
    history: &HistoryStore,
) -> RunReport {
    let engine = DeltaEngine::new(history);
    let mut seen: HashSet<NamespaceKey> = HashSet::new();

    let mut sources = Vec::new();
    let mut skipped_sources = Vec::new();
    let mut failed_namespaces = Vec::new();

    for source in &config.sources {
        let payload = match load_snapshot(storage, source).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                log::warn(&format!(
                    "Skipping {}: snapshot {} not found",
                    source.name, source.file
                ));
                skipped_sources.push(Skipped {
                    name: source.name.clone(),
                    reason: "snapshot not found".to_string(),
                });
                continue;
            }
            Err(e) => {
                log::warn(&format!("Skipping {}: {}", source.name, e));
                skipped_sources.push(Skipped {
                    name: source.name.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let mut namespaces = Vec::new();
        for snapshot in payload.into_namespaces(&source.name, &source.label) {
            let (name, compared) = match snapshot {
                Ok(snapshot) => {
                    let key = snapshot.namespace.key.clone();
                    let compared = if seen.insert(key.clone()) {
                        compare_namespace(&engine, history, snapshot)
                    } else {
                        Err(AppError::KeyCollision {
                            key: key.to_string(),
                        })
                    };
                    (key.to_string(), compared)
                }
                Err(e) => (source.name.clone(), Err(e)),
            };

            match compared {
                Ok(report) => {
                    log::sub_item(&format!(
                        "{}: {} models compared",
                        report.namespace.key,
                        report.entries.len()
                    ));
                    namespaces.push(report);
                }
                Err(e) => {
                    log::warn(&format!("Rejected namespace {}: {}", name, e));
                    failed_namespaces.push(Skipped {
                        name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        sources.push(SourceReport {
            source: source.clone(),
            namespaces,
        });
    }

    let highlights = Highlights::collect(
        sources.iter().flat_map(|s| {
            s.namespaces
                .iter()
                .map(|ns| (ns.namespace.label(), ns.entries.as_slice()))
        }),
        config.report.highlight_limit,
        config.report.jump_threshold,
    );

    RunReport {
        generated_at: Local::now(),
        sources,
        highlights,
        skipped_sources,
        failed_namespaces,
    }
}

/// Validate and compare one namespace.
fn compare_namespace(
    engine: &DeltaEngine<'_>,
    history: &HistoryStore,
    snapshot: NamespaceSnapshot,
) -> Result<NamespaceReport> {
    let items = snapshot.items()?;
    if !history.contains(&snapshot.namespace.key) {
        log::sub_item(&format!(
            "{}: no history yet, every model is new",
            snapshot.namespace.key
        ));
    }
    let entries = engine.compare(&snapshot.namespace.key, &items);
    Ok(NamespaceReport {
        namespace: snapshot.namespace,
        entries,
        items,
    })
}

/// Run the full batch: compare → render → commit → notify.
pub async fn run_pipeline(
    config: &Config,
    storage: Arc<dyn RankStorage>,
    notifier: &NotifierHub,
    options: RunOptions,
) -> Result<RunSummary> {
    log::header("Rank delta run starting");
    let total_steps = 4;

    log::step(1, total_steps, "Loading history");
    config.validate()?;
    let mut history = match HistoryStore::load(Arc::clone(&storage)).await {
        Ok(history) => history,
        Err(e) => {
            if e.is_fatal() {
                log::error(&format!("Run aborted, history left untouched: {}", e));
            }
            return Err(e);
        }
    };
    log::sub_item(&format!("{} namespace keys on record", history.len()));

    log::step(2, total_steps, "Comparing current snapshots");
    let report = collect_reports(config, storage.as_ref(), &history).await;

    log::step(3, total_steps, "Rendering report");
    let content = markdown::render(&report, config);
    let report_path =
        markdown::write_report(&config.paths.report_dir, &content, report.generated_at).await?;
    log::success(&format!("Report written to {}", report_path.display()));

    log::step(4, total_steps, "Committing history");
    let committed = if options.commit {
        let batch: Vec<(NamespaceKey, Vec<RankedItem>)> = report
            .namespaces()
            .map(|ns| (ns.namespace.key.clone(), ns.items.clone()))
            .collect();
        history.commit_all(batch).await?
    } else {
        log::sub_item("Dry run: history left untouched");
        0
    };

    let notified = if options.notify {
        Some(deliver(notifier, &markdown::title(config, report.generated_at), &content).await)
    } else {
        None
    };

    let summary = RunSummary {
        namespaces_compared: report.namespace_count(),
        namespaces_failed: report.failed_namespaces.len(),
        sources_skipped: report.skipped_sources.len(),
        committed,
        report_path,
        backup: history.backup_location().map(str::to_string),
        notified,
    };

    log::summary(
        "Run complete",
        &[
            ("Namespaces compared", summary.namespaces_compared.to_string()),
            ("Namespaces rejected", summary.namespaces_failed.to_string()),
            ("Sources skipped", summary.sources_skipped.to_string()),
            ("Keys committed", summary.committed.to_string()),
        ],
    );

    Ok(summary)
}

/// Send the digest; failures are logged, never propagated.
async fn deliver(notifier: &NotifierHub, title: &str, content: &str) -> bool {
    if notifier.is_empty() {
        log::info("No notification channels configured, skipping delivery");
        return false;
    }

    let delivered = notifier.send_all(title, content).await;
    if delivered {
        log::success("Notification delivered");
    } else {
        log::warn("Notification failed on every channel");
    }
    delivered
}
