//! Result normalization, aggregation and final ordering.
//!
//! [`normalize`] turns one window's raw provider results into exported
//! records: it drops empty and repeated links, applies the optional keyword
//! filter, and decides whether the date can be stored as an absolute
//! timestamp. [`aggregate`] folds those records into the run's dataset and
//! [`sort_dataset`] orders it once at the end.

use crate::models::{AggregatedDataset, DedupPolicy, NormalizedRecord, NullOrder, RawResult};
use crate::utils::{is_relative_date, parse_calendar_datetime};
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

/// Case-insensitive relevance filter on headline and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordFilter {
    term: String,
}

impl KeywordFilter {
    /// Filter on an explicitly configured term. Blank terms disable filtering.
    pub fn new(term: &str) -> Option<Self> {
        let term = term.trim().to_lowercase();
        (!term.is_empty()).then_some(Self { term })
    }

    /// Filter on the first whitespace-delimited token of `query`.
    ///
    /// Only meaningful for keyword-first queries such as `"Gaza site:bbc.com"`.
    pub fn from_query(query: &str) -> Option<Self> {
        query.split_whitespace().next().and_then(Self::new)
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn matches(&self, raw: &RawResult) -> bool {
        raw.title.to_lowercase().contains(&self.term)
            || raw.desc.to_lowercase().contains(&self.term)
    }
}

/// Pick the timestamp to store for a raw result.
///
/// Relative date strings always yield `None`, whatever the provider resolved
/// them to. Otherwise the provider timestamp wins, falling back to parsing
/// the date string as a calendar date.
pub fn resolve_absolute_datetime(raw: &RawResult) -> Option<NaiveDateTime> {
    if is_relative_date(&raw.date) {
        return None;
    }
    raw.datetime.or_else(|| parse_calendar_datetime(&raw.date))
}

/// Normalize one (query, window) batch of raw results.
///
/// Records keep provider order. Within the batch a URL is emitted at most
/// once; results with an empty URL are dropped.
///
/// # Arguments
///
/// * `raw_results` - One window's flattened provider results
/// * `query_text` - Stored in each record's `query_filter` column
/// * `window_label` - Stored in each record's `time_chunk_label` column
/// * `keyword_filter` - When set, results mentioning neither term in headline
///   nor description are dropped
///
/// # Examples
///
/// ```ignore
/// let records = normalize(&raw, "Gaza site:bbc.com", "2024-01_2024-06", None);
/// assert!(records.iter().all(|r| !r.url.is_empty()));
/// ```
pub fn normalize(
    raw_results: &[RawResult],
    query_text: &str,
    window_label: &str,
    keyword_filter: Option<&KeywordFilter>,
) -> Vec<NormalizedRecord> {
    let mut seen_urls: HashSet<&str> = HashSet::new();
    let mut records = Vec::new();
    let (mut duplicates, mut off_topic) = (0usize, 0usize);

    for raw in raw_results {
        let url = raw.link.trim();
        if url.is_empty() || !seen_urls.insert(url) {
            duplicates += 1;
            continue;
        }
        if let Some(filter) = keyword_filter {
            if !filter.matches(raw) {
                off_topic += 1;
                continue;
            }
        }

        records.push(NormalizedRecord {
            headline: raw.title.trim().to_string(),
            description: raw.desc.trim().to_string(),
            outlet: raw.media.trim().to_string(),
            url: url.to_string(),
            date_string: raw.date.trim().to_string(),
            absolute_datetime: resolve_absolute_datetime(raw),
            query_filter: query_text.to_string(),
            time_chunk_label: window_label.to_string(),
        });
    }

    debug!(
        input = raw_results.len(),
        kept = records.len(),
        duplicates,
        off_topic,
        keyword = keyword_filter.map(KeywordFilter::term),
        window = window_label,
        "Normalized batch"
    );
    records
}

/// Fold a batch of normalized records into the running dataset.
///
/// Under [`DedupPolicy::Batch`] records are appended as-is. Under
/// [`DedupPolicy::Run`] any URL already in the dataset is skipped.
pub fn aggregate(
    mut acc: AggregatedDataset,
    new_records: Vec<NormalizedRecord>,
) -> AggregatedDataset {
    match acc.policy {
        DedupPolicy::Batch => acc.records.extend(new_records),
        DedupPolicy::Run => {
            let seen = &mut acc.seen_urls;
            acc.records
                .extend(new_records.into_iter().filter(|r| seen.insert(r.url.clone())));
        }
    }
    acc
}

/// Order records newest first; undated records go last or first per `nulls`.
///
/// The sort is stable, so records with equal timestamps keep insertion order
/// and sorting an already sorted dataset changes nothing.
pub fn sort_dataset(records: &mut [NormalizedRecord], nulls: NullOrder) {
    records.sort_by(|a, b| compare_newest_first(a.absolute_datetime, b.absolute_datetime, nulls));
}

fn compare_newest_first(
    a: Option<NaiveDateTime>,
    b: Option<NaiveDateTime>,
    nulls: NullOrder,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => match nulls {
            NullOrder::Last => Ordering::Greater,
            NullOrder::First => Ordering::Less,
        },
        (Some(_), None) => match nulls {
            NullOrder::Last => Ordering::Less,
            NullOrder::First => Ordering::Greater,
        },
    }
}
