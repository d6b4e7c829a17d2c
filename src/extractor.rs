//! Content Extractor: pulls the main article text out of a news page.
//!
//! News search providers truncate body text, so when the snippet is too
//! short to score we fetch the article URL and strip it down to its main
//! content. Extraction failures never abort the batch: the article proceeds
//! degraded on whatever snippet text exists, and only an article with no
//! text at all is dropped.

use crate::error::ScoutError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::time::Duration as StdDuration;
use tracing::{debug, instrument, warn};

/// Below this many characters a text is not worth scoring on its own.
pub const MIN_CONTENT_LEN: usize = 300;

/// Per-article fetch timeout; one slow page must not stall the batch.
const FETCH_TIMEOUT: StdDuration = StdDuration::from_secs(12);

static CONTENT_CONTAINER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(main|body|article|content|post|entry)").unwrap());
static TRAILING_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+\n").unwrap());
static MULTI_NEWLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").unwrap());
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").unwrap());

/// The text chosen for scoring plus whether it came from a degraded path.
#[derive(Debug)]
pub struct ArticleText {
    pub text: String,
    pub degraded: bool,
}

/// Build the HTTP client used for article page fetches.
pub fn page_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.36",
        )
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Resolve the text to score for one article.
///
/// A snippet of [`MIN_CONTENT_LEN`] or more is used as-is. Otherwise the
/// article URL is fetched and mined for its main content; when that fails
/// for any reason (timeout, 404, paywall, no recognizable container) the
/// snippet is used and the article is marked degraded.
#[instrument(level = "debug", skip(http, snippet), fields(%url))]
pub async fn article_text(http: &reqwest::Client, url: &str, snippet: &str) -> ArticleText {
    if snippet.len() >= MIN_CONTENT_LEN {
        debug!(len = snippet.len(), "Snippet long enough; skipping extraction");
        return ArticleText {
            text: snippet.to_string(),
            degraded: false,
        };
    }

    match fetch_page(http, url).await {
        Ok(html) => {
            let extracted = extract_main_content(&html);
            if extracted.len() >= MIN_CONTENT_LEN {
                debug!(len = extracted.len(), "Extracted main content");
                ArticleText {
                    text: extracted,
                    degraded: false,
                }
            } else {
                warn!(%url, "No main content found; degrading to snippet");
                ArticleText {
                    text: snippet.to_string(),
                    degraded: true,
                }
            }
        }
        Err(e) => {
            warn!(%url, error = %e, "Article fetch failed; degrading to snippet");
            ArticleText {
                text: snippet.to_string(),
                degraded: true,
            }
        }
    }
}

async fn fetch_page(http: &reqwest::Client, url: &str) -> Result<String, ScoutError> {
    let page = http
        .get(url)
        .send()
        .await
        .map_err(|e| ScoutError::Extraction(e.to_string()))?
        .error_for_status()
        .map_err(|e| ScoutError::Extraction(e.to_string()))?
        .text()
        .await
        .map_err(|e| ScoutError::Extraction(e.to_string()))?;
    Ok(page)
}

/// Extract the main textual content from an HTML document.
///
/// Strategy: an `<article>` element with more than [`MIN_CONTENT_LEN`]
/// characters of text wins; otherwise the longest `<div>`/`<section>` whose
/// id or class names look content-bearing. Returns an empty string when
/// nothing qualifies.
pub fn extract_main_content(html: &str) -> String {
    let document = Html::parse_document(html);

    let article_selector = Selector::parse("article").unwrap();
    if let Some(element) = document.select(&article_selector).next() {
        let text = element_text(&element);
        if text.len() > MIN_CONTENT_LEN {
            return clean_text(&text);
        }
    }

    let container_selector = Selector::parse("div, section").unwrap();
    let best = document
        .select(&container_selector)
        .filter(|el| {
            let v = el.value();
            let mut id_class = v.attr("id").unwrap_or_default().to_lowercase();
            id_class.push(' ');
            id_class.push_str(&v.attr("class").unwrap_or_default().to_lowercase());
            CONTENT_CONTAINER.is_match(&id_class)
        })
        .map(|el| element_text(&el))
        .filter(|text| text.len() > MIN_CONTENT_LEN)
        .max_by_key(String::len);

    match best {
        Some(text) => clean_text(&text),
        None => String::new(),
    }
}

fn element_text(element: &scraper::ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalize whitespace: trailing blanks, duplicate newlines, space runs.
fn clean_text(text: &str) -> String {
    let text = TRAILING_WS.replace_all(text, "\n");
    let text = MULTI_NEWLINE.replace_all(&text, "\n");
    let text = MULTI_SPACE.replace_all(&text, " ");
    text.trim().to_string()
}
