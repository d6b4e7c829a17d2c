//! JSON output: a pretty-printed array of ranked records.

use crate::error::ScoutError;
use crate::models::RankedRecord;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

pub fn to_json_string(records: &[RankedRecord]) -> Result<String, ScoutError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Write ranked records to `path`. Failures here are fatal to the run.
#[instrument(level = "info", skip(records), fields(path = %path.display()))]
pub async fn write_ranked(records: &[RankedRecord], path: &Path) -> Result<(), ScoutError> {
    let json = to_json_string(records)?;
    fs::write(path, json).await?;
    info!(count = records.len(), "Wrote JSON results");
    Ok(())
}
