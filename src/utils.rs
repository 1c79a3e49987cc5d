//! Utility functions for date-string classification, log truncation and
//! output path validation.

use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

use crate::error::Result;

/// Substrings that mark a provider date string as relative to the scrape moment.
const RELATIVE_DATE_MARKERS: [&str; 5] = ["ago", "hour", "minute", "today", "yesterday"];

/// Calendar date layouts seen in provider date strings.
const CALENDAR_DATE_FORMATS: [&str; 7] = [
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%b %d %Y",
];

/// Whether a provider date string is relative ("3 hours ago", "Today").
///
/// Matching is a case-insensitive substring test, so anything mentioning
/// one of the markers is treated as relative.
pub fn is_relative_date(date: &str) -> bool {
    let lowered = date.to_lowercase();
    RELATIVE_DATE_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Parse an absolute calendar date such as `"Jan 5, 2024"` or `"2024-01-05"`.
pub fn parse_calendar_date(date: &str) -> Option<NaiveDate> {
    let trimmed = date.trim().trim_end_matches('.');
    CALENDAR_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Parse an absolute calendar date and pin it to midnight.
pub fn parse_calendar_datetime(date: &str) -> Option<NaiveDateTime> {
    parse_calendar_date(date).and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at a character boundary at or below `max` bytes and
/// suffixed with `"…(+N bytes)"`.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure the directory that will hold `output` exists and is writable.
///
/// Creates the parent directory if needed, then writes and removes a probe
/// file next to the target so a bad path fails before any scraping starts.
#[instrument(level = "info", skip_all, fields(path = %output.display()))]
pub async fn ensure_writable_parent(output: &Path) -> Result<()> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    fs::create_dir_all(&parent).await?;

    let probe_path = parent.join("..__probe_write__");
    fs::write(&probe_path, b"").await?;
    let _ = fs::remove_file(&probe_path).await;
    info!(dir = %parent.display(), "Output directory is writable");
    Ok(())
}
