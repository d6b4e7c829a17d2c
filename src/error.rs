//! Error taxonomy for the News Scout pipeline.
//!
//! Failures fall into two classes:
//! - **Fatal**: configuration problems, the initial news fetch, and output
//!   writing. These abort the run.
//! - **Per-article**: extraction and scoring failures. These degrade or drop
//!   a single article and never abort the batch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoutError {
    /// Missing credentials, empty query, unreadable rubric. Reported before
    /// any network call.
    #[error("configuration error: {0}")]
    Config(String),

    /// News API unreachable, unauthorized, or returned an error status.
    /// Fatal: aborts the run.
    #[error("news fetch failed: {0}")]
    Fetch(String),

    /// Per-article: article page could not be fetched or parsed. The article
    /// proceeds degraded with its snippet text.
    #[error("content extraction failed: {0}")]
    Extraction(String),

    /// Per-article: the LLM call failed or returned output that did not pass
    /// schema validation after one corrective retry.
    #[error("scoring failed: {0}")]
    Scoring(String),

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_category() {
        let e = ScoutError::Config("NEWSAPI_KEY not set".to_string());
        assert!(e.to_string().starts_with("configuration error"));

        let e = ScoutError::Fetch("401 Unauthorized".to_string());
        assert!(e.to_string().starts_with("news fetch failed"));

        let e = ScoutError::Scoring("invalid JSON".to_string());
        assert!(e.to_string().starts_with("scoring failed"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let e: ScoutError = io.into();
        assert!(matches!(e, ScoutError::Output(_)));
    }
}
