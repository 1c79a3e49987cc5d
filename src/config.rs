//! Run configuration: YAML file settings merged with command-line flags.
//!
//! Precedence is CLI flag, then config file, then built-in default. The
//! merged result is validated once into a [`RunConfig`] before any request
//! is made.
//!
//! # Config File
//!
//! ```yaml
//! start_date: 10/07/2023
//! end_date: 01/01/2026
//! queries:
//!   - Gaza site:bbc.com
//!   - Gaza site:nytimes.com
//! chunk_days: 180
//! max_pages: 5
//! page_delay_secs: [1.0, 3.0]
//! task_delay_secs: [2.0, 5.0]
//! filter_term: gaza
//! dedup: batch
//! nulls: last
//! output: scraped_news_data.csv
//! ```

use crate::cli::Cli;
use crate::error::{Result, ScrapeError};
use crate::fetcher::DEFAULT_MAX_PAGES;
use crate::models::{DedupPolicy, NullOrder};
use crate::normalize::KeywordFilter;
use crate::outputs::ExportFormat;
use crate::pacing::Pacing;
use crate::planner::{DEFAULT_CHUNK_DAYS, parse_input_date};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

const DEFAULT_OUTPUT: &str = "scraped_news_data";
const DEFAULT_LANG: &str = "en";
const DEFAULT_PAGE_DELAY_SECS: [f64; 2] = [1.0, 3.0];
const DEFAULT_TASK_DELAY_SECS: [f64; 2] = [2.0, 5.0];

/// Settings as written in the YAML config file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub queries: Vec<String>,
    pub chunk_days: Option<u32>,
    pub max_pages: Option<u32>,
    pub page_delay_secs: Option<[f64; 2]>,
    pub task_delay_secs: Option<[f64; 2]>,
    pub lang: Option<String>,
    pub filter_term: Option<String>,
    pub keyword_from_query: Option<bool>,
    pub dedup: Option<DedupPolicy>,
    pub nulls: Option<NullOrder>,
    pub output: Option<PathBuf>,
    pub format: Option<ExportFormat>,
}

impl FileConfig {
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).await.map_err(|e| {
            ScrapeError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = serde_yaml::from_str(&text)?;
        info!("Loaded config file");
        Ok(config)
    }
}

/// Where the keyword filter term comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeywordSource {
    Disabled,
    Explicit(KeywordFilter),
    /// First whitespace token of each query.
    FirstQueryToken,
}

impl KeywordSource {
    /// The filter to apply to results of `query`, if any.
    pub fn filter_for(&self, query: &str) -> Option<KeywordFilter> {
        match self {
            KeywordSource::Disabled => None,
            KeywordSource::Explicit(filter) => Some(filter.clone()),
            KeywordSource::FirstQueryToken => KeywordFilter::from_query(query),
        }
    }
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub queries: Vec<String>,
    pub chunk_days: u32,
    pub max_pages: u32,
    pub page_pacing: Pacing,
    pub task_pacing: Pacing,
    pub lang: String,
    pub keyword: KeywordSource,
    pub dedup: DedupPolicy,
    pub nulls: NullOrder,
    pub output: PathBuf,
    pub format: ExportFormat,
}

impl RunConfig {
    /// Load the config file named by `cli` (if any), read the queries file
    /// (if any) and merge everything.
    pub async fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path).await?,
            None => FileConfig::default(),
        };
        let queries_text = match &cli.queries_file {
            Some(path) => Some(fs::read_to_string(path).await.map_err(|e| {
                ScrapeError::Config(format!("cannot read {}: {e}", path.display()))
            })?),
            None => None,
        };
        Self::merge(cli, file, queries_text.as_deref())
    }

    /// Merge CLI flags over file settings over defaults and validate.
    pub fn merge(cli: &Cli, file: FileConfig, queries_text: Option<&str>) -> Result<Self> {
        let start_text = cli
            .start
            .clone()
            .or(file.start_date)
            .ok_or_else(|| ScrapeError::Config("a start date is required".to_string()))?;
        let end_text = cli
            .end
            .clone()
            .or(file.end_date)
            .ok_or_else(|| ScrapeError::Config("an end date is required".to_string()))?;

        let mut queries: Vec<String> = cli.queries.iter().map(|q| q.trim().to_string()).collect();
        if let Some(text) = queries_text {
            queries.extend(parse_queries(text));
        }
        if queries.iter().all(|q| q.is_empty()) {
            queries = file.queries.iter().map(|q| q.trim().to_string()).collect();
        }
        queries.retain(|q| !q.is_empty());
        if queries.is_empty() {
            return Err(ScrapeError::Config("at least one query is required".to_string()));
        }

        let keyword = if let Some(term) = cli.filter_term.as_deref() {
            explicit_keyword(term)
        } else if cli.keyword_from_query {
            KeywordSource::FirstQueryToken
        } else {
            match (file.filter_term.as_deref(), file.keyword_from_query.unwrap_or(false)) {
                (Some(_), true) => {
                    return Err(ScrapeError::Config(
                        "filter_term and keyword_from_query are mutually exclusive".to_string(),
                    ));
                }
                (Some(term), false) => explicit_keyword(term),
                (None, true) => KeywordSource::FirstQueryToken,
                (None, false) => KeywordSource::Disabled,
            }
        };

        let max_pages = cli.max_pages.or(file.max_pages).unwrap_or(DEFAULT_MAX_PAGES);
        if max_pages == 0 {
            return Err(ScrapeError::Config("max_pages must be at least 1".to_string()));
        }

        let [page_min, page_max] = file.page_delay_secs.unwrap_or(DEFAULT_PAGE_DELAY_SECS);
        let [task_min, task_max] = file.task_delay_secs.unwrap_or(DEFAULT_TASK_DELAY_SECS);

        let output = cli.output.clone().or(file.output);
        let format = cli
            .format
            .or(file.format)
            .or_else(|| output.as_deref().and_then(ExportFormat::from_path))
            .unwrap_or_default();
        let output = output
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT).with_extension(format.extension()));

        Ok(Self {
            start: parse_input_date(&start_text)?,
            end: parse_input_date(&end_text)?,
            queries,
            chunk_days: cli.chunk_days.or(file.chunk_days).unwrap_or(DEFAULT_CHUNK_DAYS),
            max_pages,
            page_pacing: Pacing::from_secs_f64(page_min, page_max)?,
            task_pacing: Pacing::from_secs_f64(task_min, task_max)?,
            lang: cli
                .lang
                .clone()
                .or(file.lang)
                .unwrap_or_else(|| DEFAULT_LANG.to_string()),
            keyword,
            dedup: cli.dedup.or(file.dedup).unwrap_or_default(),
            nulls: cli.nulls.or(file.nulls).unwrap_or_default(),
            output,
            format,
        })
    }
}

fn explicit_keyword(term: &str) -> KeywordSource {
    KeywordFilter::new(term).map_or(KeywordSource::Disabled, KeywordSource::Explicit)
}

/// Split newline-delimited query text, dropping blank lines.
pub fn parse_queries(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect()
}
