//! Data models for articles as they move through the pipeline.
//!
//! An article passes through three shapes:
//! - [`RawArticle`]: as returned by the news search API, possibly without
//!   full body text
//! - [`ScoredArticle`]: raw article plus the LLM's validated [`Assessment`]
//!   and batch bookkeeping (fetch order, degraded flag)
//! - [`RankedRecord`]: the flattened output row with its 1-based rank,
//!   serialized to JSON and CSV in a fixed column order

use serde::{Deserialize, Serialize};

/// A raw news article as returned by the news search provider.
///
/// The `snippet` holds whatever body text the provider supplied (its
/// `content` field, falling back to `description`) and may be empty or too
/// short for scoring, in which case the extractor fetches the article URL.
#[derive(Debug, Clone)]
pub struct RawArticle {
    pub title: String,
    /// Name of the publishing outlet.
    pub source: String,
    /// Publication timestamp as reported by the provider (RFC3339).
    pub published_at: String,
    pub url: String,
    pub snippet: String,
}

/// The LLM's schema-validated evaluation of one article.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Assessment {
    /// Summary of the article, at most 120 words.
    pub summary: String,
    /// Opportunity score, an integer in `[0, 100]`.
    pub score: u8,
    /// One-sentence explanation of the score.
    pub rationale: String,
    /// Rubric line-items the model reported as matched. May be empty; the
    /// model is not required to itemize.
    #[serde(default)]
    pub signals: Vec<String>,
}

/// An article that survived extraction and scoring. Immutable thereafter.
#[derive(Debug, Clone)]
pub struct ScoredArticle {
    pub article: RawArticle,
    pub assessment: Assessment,
    /// Position in the original fetch order; breaks score ties in ranking.
    pub fetch_index: usize,
    /// True when full-text extraction failed and the provider snippet was
    /// scored instead.
    pub degraded: bool,
}

/// One row of the final ranked output.
///
/// Field order here defines the JSON object key order and the CSV column
/// order, so both outputs stay identical: Rank, Score, Publication Date,
/// Title, Summary, Rationale, URL.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RankedRecord {
    #[serde(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Score")]
    pub score: u8,
    #[serde(rename = "Publication Date")]
    pub published_at: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Summary")]
    pub summary: String,
    #[serde(rename = "Rationale")]
    pub rationale: String,
    #[serde(rename = "URL")]
    pub url: String,
}

impl RankedRecord {
    pub fn from_scored(rank: usize, scored: &ScoredArticle) -> Self {
        Self {
            rank,
            score: scored.assessment.score,
            published_at: scored.article.published_at.clone(),
            title: scored.article.title.clone(),
            summary: scored.assessment.summary.clone(),
            rationale: scored.assessment.rationale.clone(),
            url: scored.article.url.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) fn scored_fixture(score: u8, fetch_index: usize) -> ScoredArticle {
    ScoredArticle {
        article: RawArticle {
            title: format!("Article {fetch_index}"),
            source: "Example Wire".to_string(),
            published_at: "2026-08-01T12:00:00Z".to_string(),
            url: format!("https://news.example.com/{fetch_index}"),
            snippet: "snippet".to_string(),
        },
        assessment: Assessment {
            summary: "A summary.".to_string(),
            score,
            rationale: "A rationale.".to_string(),
            signals: vec![],
        },
        fetch_index,
        degraded: false,
    }
}
