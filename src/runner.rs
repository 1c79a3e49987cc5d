//! Orchestration loop: every query against every planned window, in order.
//!
//! The loop is strictly sequential. Each (query, window) task fetches its
//! pages, normalizes them and folds the records into the run's dataset,
//! then pauses before the next task. A stop flag is checked between tasks;
//! once set, the current task finishes and no new task starts.

use crate::config::RunConfig;
use crate::error::{Result, ScrapeError};
use crate::fetcher::{StopReason, fetch_window};
use crate::models::{AggregatedDataset, DateWindow};
use crate::normalize::{aggregate, normalize, sort_dataset};
use crate::planner::plan;
use crate::scrapers::SearchProvider;
use itertools::iproduct;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Completed-task counter plus a human-readable label for the latest task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// `"{query} ({window_label})"`
    pub status: String,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// What one (query, window) task produced.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub progress: Progress,
    /// Records added to the dataset by this task.
    pub records: usize,
    pub stopped_by: StopReason,
    /// Set when the provider gave nothing that survived normalization.
    pub warning: Option<String>,
}

/// Outcome of a whole run.
#[derive(Debug)]
pub struct RunSummary {
    /// Sorted dataset, ready for export.
    pub dataset: AggregatedDataset,
    pub windows: usize,
    pub tasks_total: usize,
    pub tasks_completed: usize,
    /// Tasks that yielded nothing, as [`ScrapeError::EmptyResult`].
    pub empty_tasks: Vec<ScrapeError>,
    /// Whether the run stopped early on request.
    pub cancelled: bool,
}

/// Ask the run loop to stop after its current task.
///
/// Returns `true` if a stop had already been requested, which callers treat
/// as a request to quit outright.
pub fn request_stop(stop: &AtomicBool) -> bool {
    stop.swap(true, Ordering::SeqCst)
}

/// Plan the windows and run every (query, window) task.
///
/// `on_task` is called once after each task with its report.
///
/// # Errors
///
/// Only planning errors ([`ScrapeError::InvalidRange`]) are returned, and
/// always before any request is made. Page and window failures are reported
/// through `on_task` and the summary.
#[instrument(level = "info", skip_all, fields(queries = config.queries.len()))]
pub async fn run<P, F>(
    provider: &P,
    config: &RunConfig,
    stop: &AtomicBool,
    mut on_task: F,
) -> Result<RunSummary>
where
    P: SearchProvider,
    F: FnMut(&TaskReport),
{
    let windows = plan(config.start, config.end, config.chunk_days)?;
    let tasks_total = config.queries.len() * windows.len();
    info!(
        start = %config.start,
        end = %config.end,
        windows = windows.len(),
        tasks_total,
        "Planned run"
    );

    let t0 = Instant::now();
    let mut dataset = AggregatedDataset::new(config.dedup);
    let mut empty_tasks = Vec::new();
    let mut completed = 0;
    let mut cancelled = false;

    for (query, window) in iproduct!(config.queries.iter(), windows.iter()) {
        if completed > 0 {
            config.task_pacing.pause().await;
        }
        // A stop requested during the pause starts no new task.
        if stop.load(Ordering::SeqCst) {
            warn!(completed, tasks_total, "Stop requested; no further tasks will start");
            cancelled = true;
            break;
        }

        let outcome = run_task(provider, config, query, window, &mut dataset).await;
        completed += 1;

        let progress = Progress {
            completed,
            total: tasks_total,
            status: format!("{query} ({})", window.label),
        };
        let warning = if outcome.normalized == 0 {
            let err = ScrapeError::EmptyResult {
                query: query.clone(),
                label: window.label.clone(),
            };
            warn!(completed, tasks_total, %err, "Task produced no records");
            let message = err.to_string();
            empty_tasks.push(err);
            Some(message)
        } else {
            debug!(
                completed,
                tasks_total,
                records = outcome.added,
                already_collected = outcome.normalized - outcome.added,
                status = %progress.status,
                "Task complete"
            );
            None
        };

        on_task(&TaskReport {
            progress,
            records: outcome.added,
            stopped_by: outcome.stopped_by,
            warning,
        });
    }

    sort_dataset(&mut dataset.records, config.nulls);
    info!(
        records = dataset.len(),
        completed,
        tasks_total,
        cancelled,
        elapsed_secs = t0.elapsed().as_secs(),
        "Run finished"
    );

    Ok(RunSummary {
        dataset,
        windows: windows.len(),
        tasks_total,
        tasks_completed: completed,
        empty_tasks,
        cancelled,
    })
}

struct TaskOutcome {
    /// Records the task produced after normalization.
    normalized: usize,
    /// Records actually added; lower than `normalized` under run-wide dedup.
    added: usize,
    stopped_by: StopReason,
}

/// Fetch, normalize and fold one task.
async fn run_task<P: SearchProvider>(
    provider: &P,
    config: &RunConfig,
    query: &str,
    window: &DateWindow,
    dataset: &mut AggregatedDataset,
) -> TaskOutcome {
    let fetched = fetch_window(provider, query, window, config.max_pages, &config.page_pacing).await;
    debug!(pages = fetched.pages_requested, results = fetched.results.len(), "Window fetched");
    let filter = config.keyword.filter_for(query);
    let records = normalize(&fetched.results, query, &window.label, filter.as_ref());
    let normalized = records.len();

    let before = dataset.len();
    let acc = std::mem::take(dataset);
    *dataset = aggregate(acc, records);
    TaskOutcome {
        normalized,
        added: dataset.len() - before,
        stopped_by: fetched.stopped_by,
    }
}
