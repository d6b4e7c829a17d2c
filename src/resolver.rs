//! Turns the user's input into a canonical search subject.
//!
//! A URL like `https://snowflake.com` resolves to the company name
//! `snowflake`; anything else passes through unchanged as a search term.
//! Purely local: no network calls are made.

use crate::error::ScoutError;
use tracing::{debug, instrument};
use url::Url;

/// The resolved search subject. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// A company name derived from a website URL.
    Company { name: String },
    /// A raw search phrase, passed through as-is.
    Term(String),
}

impl Query {
    /// The text sent to the news search API and the LLM prompt.
    pub fn subject(&self) -> &str {
        match self {
            Query::Company { name } => name,
            Query::Term(term) => term,
        }
    }
}

/// Resolve a raw CLI argument into a [`Query`].
///
/// Inputs that parse as an http/https URL with a host are reduced to a
/// human-readable company name: drop the scheme, a leading `www.`, and the
/// TLD, keeping the registrable label, with `-`/`_` turned into spaces.
/// Everything else is treated as a search term.
///
/// # Errors
///
/// Returns [`ScoutError::Config`] on empty or whitespace-only input.
#[instrument]
pub fn resolve_query(input: &str) -> Result<Query, ScoutError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ScoutError::Config(
            "query must not be empty: pass a company URL or a search term".to_string(),
        ));
    }

    if let Some(name) = company_from_url(trimmed) {
        debug!(%name, "Resolved URL to company name");
        return Ok(Query::Company { name });
    }

    debug!(term = %trimmed, "Treating input as search term");
    Ok(Query::Term(trimmed.to_string()))
}

/// Extract a company name from a URL, or `None` if the input is not one.
fn company_from_url(input: &str) -> Option<String> {
    let parsed = Url::parse(input).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);

    // "snowflake.com" -> "snowflake", "lite.cnn.com" -> "cnn"
    let labels: Vec<&str> = host.split('.').collect();
    let label = if labels.len() >= 2 {
        labels[labels.len() - 2]
    } else {
        labels.first()?
    };
    if label.is_empty() {
        return None;
    }

    Some(label.replace(['-', '_'], " "))
}
