//! rankwatch CLI
//!
//! Local execution entry point for scheduled runs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rankwatch::{
    error::Result,
    models::Config,
    notify::NotifierHub,
    pipeline::{self, RunOptions},
    report::markdown,
    storage::{HistoryStore, LocalStorage, RankStorage, load_snapshot},
};

/// rankwatch - AI Model Leaderboard Tracker
#[derive(Parser, Debug)]
#[command(
    name = "rankwatch",
    version,
    about = "Tracks leaderboard rank movement between runs"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare snapshots, write the report, commit history and notify
    Run {
        /// Write the report but leave history untouched
        #[arg(long)]
        dry_run: bool,

        /// Skip notification delivery
        #[arg(long)]
        no_notify: bool,
    },

    /// Print deltas against history without writing anything
    Compare,

    /// Validate configuration, history and snapshot files
    Validate,

    /// Show history and backup info
    Info,
}

/// Initialize logging; `--verbose` wins over the configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let level = match &loaded {
        Ok(config) => config.logging.level.clone(),
        Err(_) => "info".to_string(),
    };
    init_logging(cli.verbose, &level);

    log::info!("rankwatch starting...");

    let config = match (loaded, &cli.command) {
        (Ok(config), _) => {
            log::info!("Loaded configuration from {}", cli.config.display());
            config
        }
        (Err(e), Command::Validate) => {
            log::error!("Config load failed from {}: {}", cli.config.display(), e);
            return Err(e);
        }
        (Err(e), _) => {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                cli.config.display(),
                e
            );
            Config::default()
        }
    };

    let storage: Arc<dyn RankStorage> = Arc::new(LocalStorage::from_config(&config));

    match cli.command {
        Command::Run { dry_run, no_notify } => {
            let notifier = if no_notify {
                NotifierHub::empty()
            } else {
                NotifierHub::from_env(&config.notify)?
            };
            if !notifier.is_empty() {
                log::info!("Notification channels: {}", notifier.channel_names().join(", "));
            }

            let options = RunOptions {
                commit: !dry_run,
                notify: !no_notify,
            };
            let summary = pipeline::run_pipeline(&config, storage, &notifier, options).await?;

            log::info!("Report: {}", summary.report_path.display());
            if let Some(backup) = &summary.backup {
                log::info!("History backup: {}", backup);
            }
        }

        Command::Compare => {
            let history = HistoryStore::load(Arc::clone(&storage)).await?;
            let report = pipeline::collect_reports(&config, storage.as_ref(), &history).await;

            for namespace in report.namespaces() {
                println!(
                    "\n== {} / {} ==",
                    namespace.namespace.source_label,
                    namespace.namespace.category_label()
                );
                for entry in namespace.entries.iter().take(config.report.top_n) {
                    println!(
                        "{:>4}  {:<48} {}",
                        entry.rank,
                        entry.model_id,
                        markdown::format_delta(&entry.delta)
                    );
                }
            }
            for skipped in report.skipped_sources.iter().chain(&report.failed_namespaces) {
                println!("\n[skipped] {}: {}", skipped.name, skipped.reason);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK ({} sources)", config.sources.len());

            let history = HistoryStore::load(Arc::clone(&storage)).await?;
            log::info!("✓ History OK ({} namespace keys)", history.len());

            for source in &config.sources {
                validate_source(storage.as_ref(), &config, source).await;
            }

            log::info!("Validation finished");
        }

        Command::Info => {
            log::info!("Data directory: {}", config.paths.data_dir.display());
            log::info!("History file: {}", config.history_path().display());
            log::info!("Backup directory: {}", config.backup_dir().display());

            let history = HistoryStore::load(Arc::clone(&storage)).await?;
            if history.is_empty() {
                log::info!("No history recorded yet.");
            }
            for key in history.keys() {
                log::info!("  {}: {} models", key, history.snapshot(key).len());
            }

            let backups = storage.list_backups().await?;
            log::info!("Backups: {}", backups.len());
            if let Some(latest) = backups.last() {
                log::info!("Latest backup: {}", file_name(latest));
            }
        }
    }

    log::info!("Done!");

    Ok(())
}

/// Report whether a source snapshot parses into valid namespaces.
async fn validate_source(
    storage: &dyn RankStorage,
    config: &Config,
    source: &rankwatch::models::SourceConfig,
) {
    let path = config.snapshot_path(source);
    let payload = match load_snapshot(storage, source).await {
        Ok(Some(payload)) => payload,
        Ok(None) => {
            log::warn!("- {}: {} not found", source.name, path.display());
            return;
        }
        Err(e) => {
            log::error!("✗ {}: {}", source.name, e);
            return;
        }
    };

    for namespace in payload.into_namespaces(&source.name, &source.label) {
        match namespace.and_then(|ns| ns.items().map(|items| (ns, items.len()))) {
            Ok((ns, count)) => log::info!("✓ {}: {} models", ns.namespace.key, count),
            Err(e) => log::error!("✗ {}: {}", source.name, e),
        }
    }
}

fn file_name(location: &str) -> String {
    Path::new(location)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| location.to_string())
}
