//! Utility functions for slugs, log truncation, and file system checks.

use crate::error::ScoutError;
use chrono::Local;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Timestamp component of output filenames, minute resolution.
pub fn run_timestamp() -> String {
    Local::now().format("%Y%m%d-%H%M").to_string()
}

/// Reduce a subject name to a filesystem-safe slug.
///
/// Lowercases, maps every run of non-alphanumeric characters to a single
/// underscore, and trims leading/trailing underscores.
pub fn safe_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_sep = true;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_was_sep = false;
        } else if !last_was_sep {
            slug.push('_');
            last_was_sep = true;
        }
    }
    slug.trim_matches('_').to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes with an ellipsis and byte
/// count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…(+{} bytes)", &s[..end], s.len() - end)
    }
}

/// Detect if a serde_json error indicates truncated/incomplete JSON.
///
/// A model response cut off mid-object fails to parse with an EOF error;
/// those are worth a corrective re-ask.
pub fn looks_truncated(e: &serde_json::Error) -> bool {
    use serde_json::error::Category;
    matches!(e.classify(), Category::Eof)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if absent, then probes it with a throwaway file.
/// Run before any network call so a bad results path fails fast.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), ScoutError> {
    fs::create_dir_all(path).await?;
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Results directory is writable");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_slug_basic() {
        assert_eq!(safe_slug("Snowflake"), "snowflake");
        assert_eq!(safe_slug("red pepper"), "red_pepper");
    }

    #[test]
    fn test_safe_slug_collapses_separators() {
        assert_eq!(safe_slug("Acme,  Inc."), "acme_inc");
        assert_eq!(safe_slug("--weird__name--"), "weird_name");
    }

    #[test]
    fn test_safe_slug_strips_edges() {
        assert_eq!(safe_slug("!bitcoin!"), "bitcoin");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        let s = "é".repeat(10); // 2 bytes per char
        let result = truncate_for_log(&s, 3);
        assert!(result.starts_with('é'));
    }

    #[test]
    fn test_looks_truncated() {
        let result: Result<serde_json::Value, _> = serde_json::from_str(r#"{"field": "value"#);
        let err = result.unwrap_err();
        assert!(looks_truncated(&err));
    }

    #[test]
    fn test_complete_but_invalid_json_is_not_truncated() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("not json at all");
        let err = result.unwrap_err();
        assert!(!looks_truncated(&err));
    }

    #[test]
    fn test_run_timestamp_shape() {
        let ts = run_timestamp();
        assert_eq!(ts.len(), 13); // YYYYmmdd-HHMM
        assert_eq!(&ts[8..9], "-");
    }
}
