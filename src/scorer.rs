//! Summarizer/Scorer: sends each article's text plus the scoring rubric to
//! an OpenAI-compatible chat API and validates the structured result.
//!
//! # Architecture
//!
//! - [`AskAsync`]: core trait for one prompt -> one completion; tests swap in
//!   a deterministic stub
//! - [`OpenAiAsk`]: the real chat-completion backend
//! - [`RetryAsk`]: decorator adding exponential backoff with jitter for
//!   transient transport failures
//! - [`Scorer`]: builds the rubric prompt, parses and schema-validates the
//!   response, and re-asks exactly once with a corrective instruction when
//!   the response is malformed
//!
//! The backoff retries and the single corrective re-ask are orthogonal: the
//! former covers the network, the latter covers the model's output shape.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use rand::{Rng, rng};
use serde::Deserialize;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

use crate::error::ScoutError;
use crate::models::Assessment;
use crate::rubric::{Rubric, ScorePolicy};
use crate::utils::{looks_truncated, truncate_for_log};

/// Cap on summary length, in words. Enforced in the prompt and validated on
/// the response.
pub const MAX_SUMMARY_WORDS: usize = 120;

/// Trait for one-shot async LLM interaction.
pub trait AskAsync {
    /// Send a prompt to the LLM and receive the raw completion text.
    fn ask(&self, prompt: &str) -> impl Future<Output = Result<String, ScoutError>> + Send;
}

/// Chat-completion backend for an OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct OpenAiAsk {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAsk {
    pub fn new(api_key: &str, model: &str) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
            model: model.to_string(),
        }
    }
}

impl AskAsync for OpenAiAsk {
    #[instrument(level = "debug", skip_all)]
    async fn ask(&self, prompt: &str) -> Result<String, ScoutError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| ScoutError::Scoring(e.to_string()))?
                .into()])
            // Determinism of shape matters more than creativity here.
            .temperature(0.0)
            .build()
            .map_err(|e| ScoutError::Scoring(e.to_string()))?;

        let t0 = Instant::now();
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| ScoutError::Scoring(format!("LLM API error: {e}")))?;
        debug!(elapsed_ms = t0.elapsed().as_millis() as u64, "Chat completion returned");

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| ScoutError::Scoring("empty completion from LLM".to_string()))
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`AskAsync`].
///
/// Delay formula: `min(base_delay * 2^(attempt-1), max_delay) + jitter(0..250ms)`.
pub struct RetryAsk<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T: AskAsync> RetryAsk<T> {
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T: AskAsync + Sync> AskAsync for RetryAsk<T> {
    #[instrument(level = "debug", skip_all)]
    async fn ask(&self, prompt: &str) -> Result<String, ScoutError> {
        let mut attempt = 0usize;
        loop {
            match self.inner.ask(prompt).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        error!(attempt, max = self.max_retries, error = %e, "ask() exhausted retries");
                        return Err(e);
                    }
                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);
                    warn!(attempt, max = self.max_retries, ?delay, error = %e, "ask() attempt failed; backing off");
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Raw model output before validation. Scores arrive as arbitrary integers;
/// range checking happens in [`validate_assessment`].
#[derive(Debug, Deserialize)]
struct LlmAssessment {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    rationale: String,
    #[serde(default)]
    signals: Vec<String>,
}

/// Summarizes and scores article text against the rubric.
pub struct Scorer<A> {
    ask: A,
    rubric_text: String,
    subject: String,
    policy: ScorePolicy,
}

impl<A: AskAsync + Sync> Scorer<A> {
    pub fn new(ask: A, rubric: &Rubric, subject: &str, policy: ScorePolicy) -> Self {
        Self {
            ask,
            rubric_text: rubric.for_subject(subject),
            subject: subject.to_string(),
            policy,
        }
    }

    /// Summarize and score one article's text.
    ///
    /// Malformed or schema-invalid model output triggers exactly one re-ask
    /// with a corrective instruction appended; a second failure is a
    /// [`ScoutError::Scoring`] and the caller drops the article.
    #[instrument(level = "info", skip_all)]
    pub async fn assess(&self, text: &str) -> Result<Assessment, ScoutError> {
        let prompt = self.build_prompt(text, None);
        let raw = self.ask.ask(&prompt).await?;

        match parse_and_validate(&raw) {
            Ok(assessment) => Ok(assessment),
            Err(reason) => {
                warn!(
                    reason = %reason,
                    response_preview = %truncate_for_log(&raw, 300),
                    "Model returned non-conforming output; re-asking once"
                );
                let corrective = format!(
                    "Your previous response was rejected: {reason}. Respond again with ONLY a \
                     valid JSON object containing the keys summary, score, rationale, and \
                     signals, with score as an integer between 0 and 100."
                );
                let prompt = self.build_prompt(text, Some(&corrective));
                let raw = self.ask.ask(&prompt).await?;
                parse_and_validate(&raw).map_err(|reason| {
                    error!(
                        reason = %reason,
                        response_preview = %truncate_for_log(&raw, 300),
                        "Corrective re-ask still non-conforming"
                    );
                    ScoutError::Scoring(format!("model output invalid after retry: {reason}"))
                })
            }
        }
    }

    fn build_prompt(&self, article: &str, corrective: Option<&str>) -> String {
        let corrective_block = corrective
            .map(|c| format!("\nIMPORTANT CORRECTION: {c}\n"))
            .unwrap_or_default();
        format!(
            "We are evaluating a news article about '{subject}' and the business opportunity \
             it may represent.\n\
             Summarize the article in {max_words} words or less, showing how it is relevant \
             to '{subject}'. If the article is not about or relevant to '{subject}', say so.\n\
             \n\
             Use the rubric below to assign an additive score. {policy}\n\
             Only assign points for signals clearly stated in the article.\n\
             \n\
             Respond in valid JSON with exactly these keys:\n\
             - summary: string, at most {max_words} words, summarizing only the article\n\
             - score: integer from 0 to 100\n\
             - rationale: one sentence naming which rubric signals fired\n\
             - signals: array of strings, the matched rubric line-items\n\
             Do not add any extra text or commentary outside the JSON object.\n\
             {corrective_block}\n\
             Rubric:\n{rubric}\n\
             \n\
             Article:\n{article}\n",
            subject = self.subject,
            max_words = MAX_SUMMARY_WORDS,
            policy = self.policy.instruction(),
            rubric = self.rubric_text,
            article = article,
            corrective_block = corrective_block,
        )
    }
}

/// Parse raw model text into a validated [`Assessment`].
///
/// Accepts both bare JSON and JSON wrapped in a fenced code block. The error
/// string feeds the corrective re-ask, so it names the exact violation.
fn parse_and_validate(raw: &str) -> Result<Assessment, String> {
    let json = extract_json(raw).ok_or("no JSON object found in response")?;
    let parsed: LlmAssessment = serde_json::from_str(&json).map_err(|e| {
        if looks_truncated(&e) {
            format!("JSON truncated mid-object: {e}")
        } else {
            format!("invalid JSON: {e}")
        }
    })?;
    validate_assessment(parsed)
}

fn validate_assessment(parsed: LlmAssessment) -> Result<Assessment, String> {
    if parsed.summary.trim().is_empty() {
        return Err("summary is empty".to_string());
    }
    let words = parsed.summary.split_whitespace().count();
    if words > MAX_SUMMARY_WORDS {
        return Err(format!("summary has {words} words, limit is {MAX_SUMMARY_WORDS}"));
    }
    if !(0..=100).contains(&parsed.score) {
        return Err(format!("score {} out of range [0, 100]", parsed.score));
    }
    if parsed.rationale.trim().is_empty() {
        return Err("rationale is empty".to_string());
    }
    Ok(Assessment {
        summary: parsed.summary,
        score: parsed.score as u8,
        rationale: parsed.rationale,
        signals: parsed.signals,
    })
}

/// Extract a JSON object from model output, unwrapping ```json fences.
fn extract_json(content: &str) -> Option<String> {
    if let Some(start) = content.find("```json") {
        let start = start + 7;
        if let Some(end) = content[start..].find("```") {
            return Some(content[start..start + end].trim().to_string());
        }
    }
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end < start {
        return None;
    }
    Some(content[start..=end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic stub: returns each canned response in order, counting
    /// calls.
    struct ScriptedAsk {
        responses: Vec<String>,
        calls: AtomicUsize,
    }

    impl ScriptedAsk {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: responses.iter().map(|s| s.to_string()).collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl AskAsync for &ScriptedAsk {
        async fn ask(&self, _prompt: &str) -> Result<String, ScoutError> {
            let idx = self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .get(idx)
                .cloned()
                .ok_or_else(|| ScoutError::Scoring("script exhausted".to_string()))
        }
    }

    fn valid_response() -> &'static str {
        r#"{"summary": "The company expanded into Europe.", "score": 60,
            "rationale": "Sector growth and B2B relevance fired.",
            "signals": ["sector growth", "B2B relevance"]}"#
    }

    fn scorer<'a>(ask: &'a ScriptedAsk) -> Scorer<&'a ScriptedAsk> {
        let rubric = Rubric::from_text("- (50 points) Sector growth.\n- (50 points) B2B relevance.");
        Scorer::new(ask, &rubric, "acme", ScorePolicy::AllCriteria)
    }

    #[tokio::test]
    async fn test_valid_response_accepted_first_try() {
        let ask = ScriptedAsk::new(&[valid_response()]);
        let assessment = scorer(&ask).assess("article text").await.unwrap();
        assert_eq!(assessment.score, 60);
        assert_eq!(assessment.signals.len(), 2);
        assert_eq!(ask.call_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_response_retried_exactly_once() {
        let ask = ScriptedAsk::new(&["this is not json", valid_response()]);
        let assessment = scorer(&ask).assess("article text").await.unwrap();
        assert_eq!(assessment.score, 60);
        assert_eq!(ask.call_count(), 2);
    }

    #[tokio::test]
    async fn test_two_malformed_responses_drop_article() {
        let ask = ScriptedAsk::new(&["garbage", "{\"summary\": \"\", \"score\": 200}"]);
        let err = scorer(&ask).assess("article text").await.unwrap_err();
        assert!(matches!(err, ScoutError::Scoring(_)));
        assert_eq!(ask.call_count(), 2, "must retry exactly once");
    }

    #[tokio::test]
    async fn test_corrective_instruction_added_on_retry() {
        struct PromptCapture {
            prompts: std::sync::Mutex<Vec<String>>,
        }
        impl AskAsync for &PromptCapture {
            async fn ask(&self, prompt: &str) -> Result<String, ScoutError> {
                let mut prompts = self.prompts.lock().unwrap();
                prompts.push(prompt.to_string());
                if prompts.len() == 1 {
                    Ok("nope".to_string())
                } else {
                    Ok(valid_response().to_string())
                }
            }
        }

        let capture = PromptCapture {
            prompts: std::sync::Mutex::new(Vec::new()),
        };
        let rubric = Rubric::from_text("- rubric");
        let scorer = Scorer::new(&capture, &rubric, "acme", ScorePolicy::AllCriteria);
        scorer.assess("text").await.unwrap();

        let prompts = capture.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(!prompts[0].contains("IMPORTANT CORRECTION"));
        assert!(prompts[1].contains("IMPORTANT CORRECTION"));
    }

    #[tokio::test]
    async fn test_fenced_json_accepted() {
        let fenced = format!("Here you go:\n```json\n{}\n```", valid_response());
        let ask = ScriptedAsk::new(&[fenced.as_str()]);
        let assessment = scorer(&ask).assess("article text").await.unwrap();
        assert_eq!(assessment.score, 60);
        assert_eq!(ask.call_count(), 1);
    }

    #[test]
    fn test_validation_rejects_out_of_range_score() {
        for score in [-1i64, 101, 1000] {
            let parsed = LlmAssessment {
                summary: "S".to_string(),
                score,
                rationale: "R".to_string(),
                signals: vec![],
            };
            assert!(validate_assessment(parsed).is_err(), "score {score} accepted");
        }
    }

    #[test]
    fn test_validation_accepts_boundary_scores() {
        for score in [0i64, 100] {
            let parsed = LlmAssessment {
                summary: "S".to_string(),
                score,
                rationale: "R".to_string(),
                signals: vec![],
            };
            assert_eq!(validate_assessment(parsed).unwrap().score, score as u8);
        }
    }

    #[test]
    fn test_validation_rejects_long_summary() {
        let parsed = LlmAssessment {
            summary: "word ".repeat(MAX_SUMMARY_WORDS + 1),
            score: 50,
            rationale: "R".to_string(),
            signals: vec![],
        };
        let err = validate_assessment(parsed).unwrap_err();
        assert!(err.contains("words"));
    }

    #[test]
    fn test_validation_rejects_empty_fields() {
        let parsed = LlmAssessment {
            summary: "  ".to_string(),
            score: 50,
            rationale: "R".to_string(),
            signals: vec![],
        };
        assert!(validate_assessment(parsed).is_err());

        let parsed = LlmAssessment {
            summary: "S".to_string(),
            score: 50,
            rationale: String::new(),
            signals: vec![],
        };
        assert!(validate_assessment(parsed).is_err());
    }

    #[test]
    fn test_extract_json_variants() {
        assert_eq!(extract_json(r#"{"a": 1}"#).unwrap(), r#"{"a": 1}"#);
        assert_eq!(
            extract_json("prefix {\"a\": 1} suffix").unwrap(),
            r#"{"a": 1}"#
        );
        assert_eq!(
            extract_json("```json\n{\"a\": 1}\n```").unwrap(),
            r#"{"a": 1}"#
        );
        assert!(extract_json("no braces here").is_none());
    }

    #[tokio::test]
    async fn test_retry_ask_recovers_after_transient_failure() {
        struct FlakyAsk {
            calls: AtomicUsize,
        }
        impl AskAsync for &FlakyAsk {
            async fn ask(&self, _prompt: &str) -> Result<String, ScoutError> {
                if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ScoutError::Scoring("connection reset".to_string()))
                } else {
                    Ok("ok".to_string())
                }
            }
        }

        let flaky = FlakyAsk {
            calls: AtomicUsize::new(0),
        };
        let retry = RetryAsk::new(&flaky, 3, StdDuration::from_millis(1));
        assert_eq!(retry.ask("p").await.unwrap(), "ok");
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_ask_gives_up_after_max_retries() {
        struct AlwaysFail {
            calls: AtomicUsize,
        }
        impl AskAsync for &AlwaysFail {
            async fn ask(&self, _prompt: &str) -> Result<String, ScoutError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Err(ScoutError::Scoring("down".to_string()))
            }
        }

        let failing = AlwaysFail {
            calls: AtomicUsize::new(0),
        };
        let retry = RetryAsk::new(&failing, 2, StdDuration::from_millis(1));
        assert!(retry.ask("p").await.is_err());
        assert_eq!(failing.calls.load(Ordering::SeqCst), 3); // initial + 2 retries
    }
}
