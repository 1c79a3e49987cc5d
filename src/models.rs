//! Data models for planned windows, raw provider results and exported records.
//!
//! - [`DateWindow`]: one bounded slice of the requested date range
//! - [`RawResult`]: an article exactly as the search provider returned it
//! - [`NormalizedRecord`]: the cleaned, exported row
//! - [`AggregatedDataset`]: the running collection owned by the run loop
//!
//! The policy enums ([`DedupPolicy`], [`NullOrder`]) are shared by the CLI,
//! the YAML config and the aggregator.

use chrono::{NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A contiguous, inclusive slice of the overall date range.
///
/// Windows are produced by [`crate::planner::plan`] and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    /// First day covered by this window.
    pub start: NaiveDate,
    /// Last day covered by this window (inclusive).
    pub end: NaiveDate,
    /// Display label in `YYYY-MM_YYYY-MM` form. Not unique for sub-monthly windows.
    pub label: String,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        let label = format!("{}_{}", start.format("%Y-%m"), end.format("%Y-%m"));
        Self { start, end, label }
    }

    /// Number of days between start and end (zero for a single-day window).
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// One article as returned by a search provider page.
///
/// Field names follow the provider's own vocabulary (`link`, `media`, `desc`).
/// Nothing here is validated; the same article may appear several times.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawResult {
    pub title: String,
    pub media: String,
    /// Display date as shown by the provider, e.g. `"Jan 5, 2024"` or `"3 hours ago"`.
    pub date: String,
    /// Timestamp the provider resolved from `date`, if any.
    pub datetime: Option<NaiveDateTime>,
    pub desc: String,
    pub link: String,
}

/// The canonical exported row.
///
/// Field order here is the CSV column order.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NormalizedRecord {
    pub headline: String,
    pub description: String,
    pub outlet: String,
    pub url: String,
    pub date_string: String,
    /// `None` whenever `date_string` is relative ("3 hours ago", "today").
    pub absolute_datetime: Option<NaiveDateTime>,
    /// The query text that produced this record.
    pub query_filter: String,
    /// Label of the window this record was fetched for.
    pub time_chunk_label: String,
}

/// How far URL deduplication reaches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupPolicy {
    /// Dedup only inside each (query, window) batch.
    #[default]
    Batch,
    /// Dedup across the whole run; the first occurrence of a URL wins.
    Run,
}

/// Where records without an absolute datetime land after sorting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NullOrder {
    #[default]
    Last,
    First,
}

/// Running collection of records for one run.
#[derive(Debug, Default)]
pub struct AggregatedDataset {
    pub records: Vec<NormalizedRecord>,
    pub policy: DedupPolicy,
    /// URLs already folded in; only populated under [`DedupPolicy::Run`].
    pub(crate) seen_urls: HashSet<String>,
}

impl AggregatedDataset {
    pub fn new(policy: DedupPolicy) -> Self {
        Self {
            records: Vec::new(),
            policy,
            seen_urls: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
