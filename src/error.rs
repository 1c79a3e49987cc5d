//! Error types shared by the planner, fetcher, normalizer and exporters.
//!
//! Only [`ScrapeError::InvalidRange`], [`ScrapeError::InvalidDate`],
//! [`ScrapeError::Config`] and [`ScrapeError::NoData`] stop a run. Page and
//! window failures are reported and the run carries on.

use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid date '{0}': expected MM/DD/YYYY")]
    InvalidDate(String),

    #[error("page {page} fetch failed: {message}")]
    ProviderPage { page: u32, message: String },

    #[error("no results for {query} ({label})")]
    EmptyResult { query: String, label: String },

    #[error("no data found across all queries and windows")]
    NoData,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
