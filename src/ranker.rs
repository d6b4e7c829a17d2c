//! Ranker: pure sort-and-number over scored articles.

use crate::models::{RankedRecord, ScoredArticle};

/// Sort scored articles by score descending and assign dense 1-based ranks.
///
/// Ties break by fetch order: the earlier-fetched article ranks higher.
/// Empty input yields an empty ranking.
pub fn rank(mut scored: Vec<ScoredArticle>) -> Vec<RankedRecord> {
    scored.sort_by(|a, b| {
        b.assessment
            .score
            .cmp(&a.assessment.score)
            .then(a.fetch_index.cmp(&b.fetch_index))
    });
    scored
        .iter()
        .enumerate()
        .map(|(i, article)| RankedRecord::from_scored(i + 1, article))
        .collect()
}
