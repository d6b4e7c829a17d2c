//! Rubric-as-data: the scoring criteria live in a human-editable text file,
//! consumed verbatim by the LLM prompt, so scoring can evolve without a
//! redeploy.

use crate::error::ScoutError;
use clap::ValueEnum;
use tokio::fs;
use tracing::info;

/// Placeholder in the rubric file replaced with the resolved subject per run.
const SUBJECT_PLACEHOLDER: &str = "{subject_company}";

/// The scoring rubric text, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Rubric {
    text: String,
}

impl Rubric {
    /// Load the rubric from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`]: a missing or empty rubric is a setup
    /// problem, reported before any network call.
    pub async fn load(path: &str) -> Result<Self, ScoutError> {
        let text = fs::read_to_string(path).await.map_err(|e| {
            ScoutError::Config(format!("cannot read rubric file '{path}': {e}"))
        })?;
        if text.trim().is_empty() {
            return Err(ScoutError::Config(format!("rubric file '{path}' is empty")));
        }
        info!(path, bytes = text.len(), "Loaded scoring rubric");
        Ok(Self { text })
    }

    #[cfg(test)]
    pub fn from_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }

    /// The rubric text with the subject company substituted in.
    pub fn for_subject(&self, subject: &str) -> String {
        self.text.replace(SUBJECT_PLACEHOLDER, subject)
    }
}

/// How the model should turn matched rubric criteria into a 0-100 score.
///
/// The rubric mixes signals that do not apply to every article (an M&A check
/// is meaningless for a product-launch story), so normalization is a policy
/// choice rather than a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScorePolicy {
    /// Sum matched points over all criteria; unmatched criteria count
    /// against the score.
    AllCriteria,
    /// Normalize by the criteria that are applicable to the article, so an
    /// article is not penalized for signals it could never exhibit.
    ApplicableCriteria,
}

impl ScorePolicy {
    /// The prompt instruction implementing this policy.
    pub fn instruction(&self) -> &'static str {
        match self {
            ScorePolicy::AllCriteria => {
                "Sum the points of every rubric criterion clearly supported by the article. \
                 The score is that sum, out of the full 100 points."
            }
            ScorePolicy::ApplicableCriteria => {
                "First decide which rubric criteria are applicable to this article at all, \
                 then score the matched points as a fraction of the applicable points, \
                 scaled to 0-100."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_subject_substitutes_placeholder() {
        let rubric = Rubric::from_text("Is {subject_company} the focus? {subject_company} again.");
        let text = rubric.for_subject("snowflake");
        assert_eq!(text, "Is snowflake the focus? snowflake again.");
    }

    #[test]
    fn test_for_subject_without_placeholder_is_identity() {
        let rubric = Rubric::from_text("- (10 points) Sector growth mentioned.");
        assert_eq!(rubric.for_subject("acme"), "- (10 points) Sector growth mentioned.");
    }

    #[test]
    fn test_policy_instructions_differ() {
        assert_ne!(
            ScorePolicy::AllCriteria.instruction(),
            ScorePolicy::ApplicableCriteria.instruction()
        );
    }

    #[tokio::test]
    async fn test_load_missing_file_is_config_error() {
        let err = Rubric::load("/nonexistent/rubric.txt").await.unwrap_err();
        assert!(matches!(err, ScoutError::Config(_)));
        assert!(err.to_string().contains("rubric"));
    }
}
