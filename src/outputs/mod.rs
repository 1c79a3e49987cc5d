//! Export of the final dataset.
//!
//! # Submodules
//!
//! - [`csv_file`]: one CSV row per record with a header row
//! - [`json`]: a JSON array of the same records
//!
//! Both exporters refuse an empty dataset with [`ScrapeError::NoData`] and
//! leave no file behind in that case.

pub mod csv_file;
pub mod json;

use crate::error::{Result, ScrapeError};
use crate::models::NormalizedRecord;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info, instrument};

/// Output file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

/// Write `records` to `path` in `format`.
///
/// # Arguments
///
/// * `records` - The sorted dataset
/// * `path` - Destination file, overwritten if it exists
/// * `format` - [`ExportFormat::Csv`] or [`ExportFormat::Json`]
///
/// # Errors
///
/// [`ScrapeError::NoData`] when `records` is empty; nothing is written.
/// I/O and serialization failures are returned as-is.
#[instrument(level = "info", skip(records), fields(path = %path.display(), count = records.len()))]
pub async fn write_dataset(
    records: &[NormalizedRecord],
    path: &Path,
    format: ExportFormat,
) -> Result<()> {
    if records.is_empty() {
        error!("No records to export; skipping file");
        return Err(ScrapeError::NoData);
    }

    match format {
        ExportFormat::Csv => csv_file::write_csv(records, path).await?,
        ExportFormat::Json => json::write_json(records, path).await?,
    }
    info!(format = format.extension(), "Wrote dataset");
    Ok(())
}
