//! Markdown digest renderer.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::{Config, Delta, SourceConfig, display_value};
use crate::pipeline::{Highlight, NamespaceReport, RunReport};

/// Name of the always-current copy of the last report.
pub const LATEST_REPORT: &str = "latest_report.md";

/// Digest title, e.g. "🤖 AI Model Trends-10-16".
pub fn title(config: &Config, at: DateTime<Local>) -> String {
    format!("{}-{}", config.report.title, at.format("%m-%d"))
}

/// Styled delta cell.
pub fn format_delta(delta: &Delta) -> String {
    match delta {
        Delta::New => "🆕 **New**".to_string(),
        Delta::Up(_) => format!("🟢 {delta}"),
        Delta::Down(_) => format!("🔴 {delta}"),
        Delta::Unchanged => "⚪ -".to_string(),
    }
}

/// Escape a value for use inside a table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Inline code span whose fence is longer than any backtick run in `text`.
fn code(text: &str) -> String {
    let longest = text
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest + 1);
    if longest == 0 {
        format!("{fence}{text}{fence}")
    } else {
        format!("{fence} {text} {fence}")
    }
}

/// Render the full digest.
pub fn render(report: &RunReport, config: &Config) -> String {
    let mut md = String::new();
    let at = report.generated_at;

    let _ = writeln!(md, "# {}\n", title(config, at));
    let _ = writeln!(md, "> 📅 **Generated**: `{}`", at.format("%Y-%m-%d %H:%M:%S"));
    let labels: Vec<&str> = report
        .sources
        .iter()
        .map(|s| s.source.label.as_str())
        .collect();
    if !labels.is_empty() {
        let _ = writeln!(md, "> 📊 **Sources**: {}", labels.join(" | "));
    }

    for source in &report.sources {
        for namespace in &source.namespaces {
            if namespace.entries.is_empty() {
                continue;
            }
            md.push_str("\n---\n\n");
            render_namespace(&mut md, &source.source, namespace, config.report.top_n);
        }
    }

    md.push_str("\n---\n\n## 🔍 Notable Moves & New Models\n");
    render_highlights(&mut md, report, config.report.jump_threshold);

    if !report.skipped_sources.is_empty() || !report.failed_namespaces.is_empty() {
        md.push_str("\n### ⚠️ Data Notes\n");
        for skipped in report.skipped_sources.iter().chain(&report.failed_namespaces) {
            let _ = writeln!(md, "- {}: {}", code(&skipped.name), skipped.reason);
        }
    }

    md.push_str("\n---\n*Report generated by rankwatch*\n");
    md
}

fn render_namespace(md: &mut String, source: &SourceConfig, report: &NamespaceReport, top_n: usize) {
    let heading = match &report.namespace.category {
        Some(category) => format!("{} {}", source.label, source.category_title(category)),
        None => source.label.clone(),
    };
    let _ = writeln!(md, "## 🏆 {}\n", heading);

    let mut header = String::from("| Rank | Model | Score |");
    let mut align = String::from("| :--- | :--- | :--- |");
    for column in &source.columns {
        let _ = write!(header, " {} |", cell(column));
        align.push_str(" :--- |");
    }
    header.push_str(" Change |");
    align.push_str(" :--- |");
    let _ = writeln!(md, "{}\n{}", header, align);

    for (entry, item) in report.rows().take(top_n) {
        let mut row = format!(
            "| {} | {} | {} |",
            entry.rank,
            cell(&code(&entry.model_id)),
            cell(&display_value(Some(&entry.score)))
        );
        for column in &source.columns {
            let _ = write!(row, " {} |", cell(&display_value(item.field(column))));
        }
        let _ = writeln!(row, " {} |", format_delta(&entry.delta));
        md.push_str(&row);
    }
}

fn render_highlights(md: &mut String, report: &RunReport, threshold: u32) {
    let highlights = &report.highlights;

    if highlights.is_empty() {
        md.push_str("Rankings were stable this period; no notable moves detected.\n");
        return;
    }

    let mut section = |title: String, list: &[Highlight]| {
        if list.is_empty() {
            return;
        }
        let _ = writeln!(md, "\n### {}", title);
        for h in list {
            let _ = writeln!(
                md,
                "- {} {} ({}, #{})",
                code(&h.model_id),
                h.delta,
                h.source_label,
                h.rank
            );
        }
    };

    section("🆕 New Entrants".to_string(), &highlights.new_entrants);
    section(
        format!("📈 Strong Risers (up >= {threshold})"),
        &highlights.risers,
    );
    section(
        format!("📉 Sharp Drops (down >= {threshold})"),
        &highlights.fallers,
    );
}

/// Write the report as a timestamped file and as `latest_report.md`.
pub async fn write_report(dir: &Path, content: &str, at: DateTime<Local>) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(format!("report_{}.md", at.format("%Y%m%d_%H%M%S")));
    let mut file = tokio::fs::File::create(&path).await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await?;

    tokio::fs::write(dir.join(LATEST_REPORT), content).await?;
    Ok(path)
}
