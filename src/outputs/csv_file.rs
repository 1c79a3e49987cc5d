//! CSV export.
//!
//! Columns follow [`NormalizedRecord`] field order:
//!
//! ```text
//! headline,description,outlet,url,date_string,absolute_datetime,query_filter,time_chunk_label
//! ```
//!
//! Undated records leave `absolute_datetime` empty; dated ones use ISO-8601
//! (`2024-01-05T00:00:00`).

use crate::error::Result;
use crate::models::NormalizedRecord;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Render records as UTF-8 CSV with a header row.
pub fn to_csv_bytes(records: &[NormalizedRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| e.into_error().into())
}

/// Write records to `path` as CSV.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_csv(records: &[NormalizedRecord], path: &Path) -> Result<()> {
    let bytes = to_csv_bytes(records)?;
    fs::write(path, &bytes).await?;
    info!(rows = records.len(), bytes = bytes.len(), "Wrote CSV file");
    Ok(())
}
