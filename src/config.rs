//! Startup credential loading and validation.

use crate::error::ScoutError;

/// API credentials required before any network call is made.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Key for the OpenAI-compatible LLM service.
    pub openai_api_key: String,
    /// Key for the NewsAPI-style news search service.
    pub newsapi_key: String,
}

impl Credentials {
    /// Load credentials from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] naming every missing variable in a
    /// single message, so the user can fix them all at once.
    pub fn from_env() -> Result<Self, ScoutError> {
        let get = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        let openai_api_key = get("OPENAI_API_KEY");
        let newsapi_key = get("NEWSAPI_KEY");

        let mut missing = Vec::new();
        if openai_api_key.is_none() {
            missing.push("OPENAI_API_KEY");
        }
        if newsapi_key.is_none() {
            missing.push("NEWSAPI_KEY");
        }
        if !missing.is_empty() {
            return Err(ScoutError::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            openai_api_key: openai_api_key.unwrap(),
            newsapi_key: newsapi_key.unwrap(),
        })
    }
}
