//! Edition selector: binary entrypoint.
//! Runs one edition selection against the news database and prints a summary.
//!
//! Fired by cron once per edition. Cron jobs that run right after a window closes
//! should pass `--edition` explicitly, since auto-detection uses the current slot.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use edition_selector::config::AppConfig;
use edition_selector::logging::init_tracing;
use edition_selector::relevance::RelevanceFilter;
use edition_selector::{Edition, EditionScheduler, SqliteStore};

/// Command-line arguments for edition-selector
#[derive(Parser, Debug)]
#[command(name = "edition-selector")]
#[command(about = "Select up to N news items per edition for the expert review queue")]
#[command(version)]
struct Args {
    /// Edition to select for (default: auto-detect from the current time)
    #[arg(long)]
    edition: Option<Edition>,

    /// Database URL (falls back to DATABASE_URL, then sqlite://data/news.db)
    #[arg(long)]
    database_url: Option<String>,

    /// Create the news schema before running
    #[arg(long)]
    init_db: bool,

    /// Select without resetting or committing anything
    #[arg(long)]
    dry_run: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let cfg = AppConfig::from_env();
    init_tracing(cfg.log_format);

    let filter = match &cfg.selection_config_path {
        Some(path) => RelevanceFilter::from_path(path)?,
        None => RelevanceFilter::from_toml()?,
    };

    let database_url = args.database_url.unwrap_or(cfg.database_url);
    info!(%database_url, target_count = cfg.target_count, "opening news store");
    let store = SqliteStore::connect(&database_url)
        .await
        .with_context(|| format!("opening {database_url}"))?;
    if args.init_db {
        store.init_schema().await.context("initializing schema")?;
    }

    let scheduler = EditionScheduler::new(store, Arc::new(filter))
        .with_target_count(cfg.target_count)
        .with_dry_run(args.dry_run);

    let summary = scheduler.run_edition_selection(args.edition).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}
