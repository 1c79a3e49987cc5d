//! # news_backfill
//!
//! Backfills historical news-search results for a set of queries over a long
//! date range and exports them as one deduplicated, date-sorted dataset.
//!
//! ## Usage
//!
//! ```sh
//! news_backfill -s 10/07/2023 -e 01/01/2026 -q "Gaza site:bbc.com" -q "Gaza site:nytimes.com"
//! ```
//!
//! ## Architecture
//!
//! 1. **Planning**: Split the date range into windows of at most `chunk_days`
//! 2. **Fetching**: Page through each (query, window) search with paced requests
//! 3. **Normalizing**: Dedup by URL, filter by keyword, resolve absolute dates
//! 4. **Output**: Sort newest first and write CSV (or JSON)

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod fetcher;
mod models;
mod normalize;
mod outputs;
mod pacing;
mod planner;
mod runner;
mod scrapers;
mod utils;

use cli::Cli;
use config::RunConfig;
use scrapers::google_news::GoogleNewsProvider;
use utils::ensure_writable_parent;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!(version = env!("CARGO_PKG_VERSION"), "news_backfill starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = match RunConfig::load(&args).await {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(
        start = %config.start,
        end = %config.end,
        queries = config.queries.len(),
        chunk_days = config.chunk_days,
        max_pages = config.max_pages,
        dedup = ?config.dedup,
        keyword = ?config.keyword,
        page_delay = ?config.page_pacing,
        task_delay = ?config.task_pacing,
        output = %config.output.display(),
        "Loaded configuration"
    );

    // Fail on a bad output path before spending hours scraping.
    if let Err(e) = ensure_writable_parent(&config.output).await {
        error!(
            path = %config.output.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    // First Ctrl-C lets the current task finish, then exports what was
    // gathered. A second one exits immediately without exporting.
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if runner::request_stop(&stop) {
                    error!("Second interrupt received; exiting without export");
                    std::process::exit(130);
                }
                warn!("Interrupt received; finishing current task before stopping (Ctrl-C again to quit)");
            }
        });
    }

    let provider = GoogleNewsProvider::new(&config.lang)?;
    let summary = runner::run(&provider, &config, &stop, |report| {
        let p = &report.progress;
        if report.warning.is_none() {
            info!(
                target: "progress",
                percent = (p.fraction() * 100.0).round() as u32,
                completed = p.completed,
                total = p.total,
                records = report.records,
                stopped_by = ?report.stopped_by,
                "Found articles for {}",
                p.status
            );
        }
    })
    .await
    .inspect_err(|e| error!(error = %e, "Run aborted before scraping"))?;

    match outputs::write_dataset(&summary.dataset.records, &config.output, config.format).await {
        Ok(()) => {
            info!(
                records = summary.dataset.len(),
                windows = summary.windows,
                tasks_completed = summary.tasks_completed,
                tasks_total = summary.tasks_total,
                empty_tasks = summary.empty_tasks.len(),
                cancelled = summary.cancelled,
                path = %config.output.display(),
                elapsed_secs = start_time.elapsed().as_secs(),
                "Export complete"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, elapsed_secs = start_time.elapsed().as_secs(), "Export failed");
            Err(e.into())
        }
    }
}
