//! Output generation: JSON and CSV files plus the terminal table.
//!
//! Both file formats carry the same records in the same column order
//! (Rank, Score, Publication Date, Title, Summary, Rationale, URL). Files
//! land in the results directory under deterministic timestamped names so
//! repeated runs never silently overwrite each other:
//!
//! ```text
//! results/
//! ├── snowflake_newsinsight_20260829-1015.json
//! └── snowflake_newsinsight_20260829-1015.csv
//! ```

pub mod csv;
pub mod json;
pub mod table;

use std::path::{Path, PathBuf};

/// Compute the JSON and CSV output paths for one run.
pub fn output_paths(results_dir: &str, slug: &str, timestamp: &str) -> (PathBuf, PathBuf) {
    let stem = format!("{slug}_newsinsight_{timestamp}");
    let dir = Path::new(results_dir);
    (
        dir.join(format!("{stem}.json")),
        dir.join(format!("{stem}.csv")),
    )
}
