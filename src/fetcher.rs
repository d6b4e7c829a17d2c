//! Article Fetcher: queries a NewsAPI-style search endpoint for recent
//! articles matching the resolved subject.
//!
//! The provider's `everything` endpoint is paginated with a page-size cap of
//! 100; we request recency-sorted English articles from the last 30 days and
//! page until the requested count is reached or the result set is exhausted.
//! Fetch failures are fatal: a run with no articles to score has nothing
//! useful to do, so errors here abort with a clear message.

use crate::error::ScoutError;
use crate::models::RawArticle;
use chrono::{Duration, Utc};
use itertools::Itertools;
use serde::Deserialize;
use std::time::Duration as StdDuration;
use tracing::{debug, info, instrument, warn};

/// NewsAPI caps `pageSize` at 100; requesting more is a 400.
const PROVIDER_PAGE_LIMIT: usize = 100;
/// How far back the search window reaches.
const SEARCH_WINDOW_DAYS: i64 = 30;

const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "totalResults")]
    total_results: usize,
    #[serde(default)]
    articles: Vec<ProviderArticle>,
}

#[derive(Debug, Deserialize)]
struct ProviderArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, rename = "publishedAt")]
    published_at: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    source: Option<ProviderSource>,
}

#[derive(Debug, Deserialize)]
struct ProviderSource {
    #[serde(default)]
    name: Option<String>,
}

/// Client for the news search API.
pub struct NewsApiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl NewsApiClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// The base URL is injectable so tests can point at a local mock server.
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(StdDuration::from_secs(15))
            .user_agent(concat!("news_scout/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch up to `limit` recent articles about `subject`.
    ///
    /// Guarantees: the result has no duplicate URLs, every article has a
    /// URL, and `result.len() <= limit`.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Fetch`] on transport errors, non-success HTTP
    /// status, or a provider-level error status. All are fatal to the run.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch(&self, subject: &str, limit: usize) -> Result<Vec<RawArticle>, ScoutError> {
        let to = Utc::now().date_naive();
        let from = to - Duration::days(SEARCH_WINDOW_DAYS);

        let mut articles: Vec<RawArticle> = Vec::new();
        let mut page = 1usize;

        loop {
            let page_size = limit.min(PROVIDER_PAGE_LIMIT);
            let response = self
                .http
                .get(format!("{}/everything", self.base_url))
                .query(&[
                    ("q", subject),
                    ("from", &from.to_string()),
                    ("to", &to.to_string()),
                    ("language", "en"),
                    ("sortBy", "publishedAt"),
                    ("pageSize", &page_size.to_string()),
                    ("page", &page.to_string()),
                    ("apiKey", &self.api_key),
                ])
                .send()
                .await
                .map_err(|e| ScoutError::Fetch(format!("news API unreachable: {e}")))?;

            let status = response.status();
            let body: SearchResponse = response
                .json()
                .await
                .map_err(|e| ScoutError::Fetch(format!("invalid news API response: {e}")))?;

            if body.status != "ok" {
                return Err(ScoutError::Fetch(format!(
                    "news API returned {} ({}): {}",
                    status,
                    body.code.as_deref().unwrap_or("unknown"),
                    body.message.as_deref().unwrap_or("no detail")
                )));
            }

            let fetched = body.articles.len();
            debug!(page, fetched, total = body.total_results, "Fetched result page");

            articles.extend(body.articles.into_iter().filter_map(into_raw_article));
            articles = articles
                .into_iter()
                .unique_by(|a| a.url.clone())
                .collect::<Vec<_>>();

            let exhausted = fetched < page_size || articles.len() >= body.total_results;
            if articles.len() >= limit || exhausted || fetched == 0 {
                break;
            }
            page += 1;
        }

        articles.truncate(limit);
        info!(count = articles.len(), subject, "Retrieved news articles");
        Ok(articles)
    }
}

/// Convert a provider payload entry into a [`RawArticle`].
///
/// Entries without a URL cannot be deduplicated, extracted, or reported in
/// output, so they are dropped here.
fn into_raw_article(a: ProviderArticle) -> Option<RawArticle> {
    let url = a.url.filter(|u| !u.is_empty())?;
    let snippet = a
        .content
        .filter(|c| !c.is_empty())
        .or(a.description.filter(|d| !d.is_empty()))
        .unwrap_or_default();
    if a.title.is_none() {
        warn!(%url, "Provider article has no title");
    }
    Some(RawArticle {
        title: a.title.unwrap_or_default(),
        source: a.source.and_then(|s| s.name).unwrap_or_default(),
        published_at: a.published_at.unwrap_or_default(),
        url,
        snippet,
    })
}
