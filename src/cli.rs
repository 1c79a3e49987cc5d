//! Command-line interface definitions for news_backfill.
//!
//! Every setting can also come from a YAML config file (`--config`); flags
//! given on the command line take precedence over the file.

use crate::models::{DedupPolicy, NullOrder};
use crate::outputs::ExportFormat;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for a backfill run.
///
/// # Examples
///
/// ```sh
/// # Three outlets over two years, default 180-day windows
/// news_backfill -s 10/07/2023 -e 01/01/2026 \
///     -q "Gaza site:bbc.com" -q "Gaza site:nytimes.com" -q "Gaza site:foxnews.com"
///
/// # Queries from a file, keep only results mentioning the keyword
/// news_backfill -s 01/01/2024 -e 12/31/2024 --queries-file queries.txt --filter-term gaza
///
/// # Everything from a config file
/// news_backfill -c backfill.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Start date (MM/DD/YYYY)
    #[arg(short, long, env = "NEWS_BACKFILL_START")]
    pub start: Option<String>,

    /// End date (MM/DD/YYYY), inclusive
    #[arg(short, long, env = "NEWS_BACKFILL_END")]
    pub end: Option<String>,

    /// Search query; repeat for several queries
    #[arg(short, long = "query")]
    pub queries: Vec<String>,

    /// File with one query per line
    #[arg(long)]
    pub queries_file: Option<PathBuf>,

    /// Output file (defaults to scraped_news_data.csv)
    #[arg(short, long, env = "NEWS_BACKFILL_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "NEWS_BACKFILL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Days per search window
    #[arg(long)]
    pub chunk_days: Option<u32>,

    /// Maximum result pages fetched per window
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Keep only results whose headline or description mention this term
    #[arg(long)]
    pub filter_term: Option<String>,

    /// Use the first word of each query as its filter term
    #[arg(long, conflicts_with = "filter_term")]
    pub keyword_from_query: bool,

    /// URL deduplication scope
    #[arg(long, value_enum)]
    pub dedup: Option<DedupPolicy>,

    /// Placement of undated records in the sorted output
    #[arg(long, value_enum)]
    pub nulls: Option<NullOrder>,

    /// Search language
    #[arg(long)]
    pub lang: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "news_backfill",
            "--start",
            "10/07/2023",
            "--end",
            "01/01/2026",
            "--query",
            "Gaza site:bbc.com",
            "--query",
            "Gaza site:nytimes.com",
        ]);

        assert_eq!(cli.start.as_deref(), Some("10/07/2023"));
        assert_eq!(cli.end.as_deref(), Some("01/01/2026"));
        assert_eq!(cli.queries, ["Gaza site:bbc.com", "Gaza site:nytimes.com"]);
        assert!(!cli.keyword_from_query);
    }

    #[test]
    fn test_cli_short_flags_and_enums() {
        let cli = Cli::parse_from([
            "news_backfill",
            "-s",
            "01/01/2024",
            "-e",
            "12/31/2024",
            "-q",
            "Gaza",
            "-o",
            "/tmp/out.json",
            "--format",
            "json",
            "--dedup",
            "run",
            "--nulls",
            "first",
            "--chunk-days",
            "90",
        ]);

        assert_eq!(cli.output, Some(PathBuf::from("/tmp/out.json")));
        assert_eq!(cli.format, Some(ExportFormat::Json));
        assert_eq!(cli.dedup, Some(DedupPolicy::Run));
        assert_eq!(cli.nulls, Some(NullOrder::First));
        assert_eq!(cli.chunk_days, Some(90));
    }

    #[test]
    fn test_filter_term_conflicts_with_keyword_from_query() {
        let result = Cli::try_parse_from([
            "news_backfill",
            "--filter-term",
            "gaza",
            "--keyword-from-query",
        ]);
        assert!(result.is_err());
    }
}
