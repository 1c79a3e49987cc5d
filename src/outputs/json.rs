//! JSON export: the dataset as one pretty-printed array of records.

use crate::error::Result;
use crate::models::NormalizedRecord;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Write records to `path` as a JSON array.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_json(records: &[NormalizedRecord], path: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(records)?;
    fs::write(path, &json).await?;
    info!(records = records.len(), bytes = json.len(), "Wrote JSON file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let records = vec![NormalizedRecord {
            headline: "Aid convoy reaches north".to_string(),
            description: "Trucks crossed at dawn.".to_string(),
            outlet: "The New York Times".to_string(),
            url: "https://www.nytimes.com/a".to_string(),
            date_string: "3 hours ago".to_string(),
            absolute_datetime: None,
            query_filter: "Gaza site:nytimes.com".to_string(),
            time_chunk_label: "2024-01_2024-06".to_string(),
        }];

        write_json(&records, &path).await.unwrap();

        let text = tokio::fs::read_to_string(&path).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["url"], "https://www.nytimes.com/a");
        assert!(value[0]["absolute_datetime"].is_null());

        let back: Vec<NormalizedRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, records);
    }
}
