//! CSV output with the same column order and values as the JSON file.

use crate::error::ScoutError;
use crate::models::RankedRecord;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Column headers, matching the serde field names of [`RankedRecord`] so
/// columns stay identical to the JSON keys.
const HEADERS: [&str; 7] = [
    "Rank",
    "Score",
    "Publication Date",
    "Title",
    "Summary",
    "Rationale",
    "URL",
];

/// Serialize records to CSV bytes. The header row is always present, even
/// for an empty ranking.
pub fn to_csv_bytes(records: &[RankedRecord]) -> Result<Vec<u8>, ScoutError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(HEADERS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| ScoutError::Output(e.into_error()))
}

/// Write ranked records to `path`. Failures here are fatal to the run.
#[instrument(level = "info", skip(records), fields(path = %path.display()))]
pub async fn write_ranked(records: &[RankedRecord], path: &Path) -> Result<(), ScoutError> {
    let bytes = to_csv_bytes(records)?;
    fs::write(path, bytes).await?;
    info!(count = records.len(), "Wrote CSV results");
    Ok(())
}
