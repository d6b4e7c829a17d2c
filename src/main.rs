//! # News Scout
//!
//! A batch pipeline that retrieves recent news articles about a company or
//! search term, summarizes and scores each one against a business
//! opportunity rubric via an LLM, and emits ranked JSON/CSV output plus a
//! terminal table.
//!
//! ## Usage
//!
//! ```sh
//! news_scout https://snowflake.com -n 25
//! news_scout bitcoin --score-policy applicable-criteria
//! ```
//!
//! ## Architecture
//!
//! One linear pass per run:
//! 1. **Resolve**: turn the input into a company name or search term
//! 2. **Fetch**: pull up to N recent articles from the news search API
//! 3. **Extract + Score**: per article, recover full text when the snippet
//!    is too short, then summarize and score via the LLM (bounded
//!    concurrency)
//! 4. **Rank**: sort by score, ties by fetch order
//! 5. **Write**: terminal table, then JSON and CSV files
//!
//! Failures isolated to one article degrade or drop that article; failures
//! in shared setup (credentials, rubric, initial fetch, output writes) abort
//! the run.

use clap::Parser;
use futures::stream::{self, StreamExt};
use std::time::Duration as StdDuration;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod extractor;
mod fetcher;
mod models;
mod outputs;
mod ranker;
mod resolver;
mod rubric;
mod scorer;
mod utils;

use cli::Cli;
use config::Credentials;
use error::ScoutError;
use fetcher::NewsApiClient;
use models::ScoredArticle;
use rubric::Rubric;
use scorer::{OpenAiAsk, RetryAsk, Scorer};
use utils::{ensure_writable_dir, run_timestamp, safe_slug};

#[tokio::main]
async fn main() -> Result<(), ScoutError> {
    dotenvy::dotenv().ok();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_scout starting up");

    let args = Cli::parse();

    // --- Shared setup: every failure here is fatal, before any network call ---
    let credentials = Credentials::from_env().inspect_err(|e| error!(error = %e))?;
    let query = resolver::resolve_query(&args.query).inspect_err(|e| error!(error = %e))?;
    let rubric = Rubric::load(&args.rubric)
        .await
        .inspect_err(|e| error!(error = %e))?;
    ensure_writable_dir(&args.results_dir).await.inspect_err(|e| {
        error!(
            path = %args.results_dir,
            error = %e,
            "Results directory is not writable (fix perms or choose a different path)"
        );
    })?;

    match &query {
        resolver::Query::Company { name } => info!(company = %name, "Resolved company name from URL"),
        resolver::Query::Term(term) => info!(%term, "Treating input as search term"),
    }

    // --- Fetch articles; a fetch failure aborts the run ---
    let news = NewsApiClient::new(&credentials.newsapi_key);
    let articles = news
        .fetch(query.subject(), args.num_articles as usize)
        .await
        .inspect_err(|e| error!(error = %e, "Article fetch failed; aborting"))?;

    if articles.is_empty() {
        println!("No articles found.");
        return Ok(());
    }
    let total = articles.len();
    info!(count = total, "Articles to analyze");

    // --- Extract and score, bounded concurrency ---
    let http = extractor::page_client();
    let ask = RetryAsk::new(
        OpenAiAsk::new(&credentials.openai_api_key, &args.model),
        5,
        StdDuration::from_secs(1),
    );
    let scorer = Scorer::new(ask, &rubric, query.subject(), args.score_policy);

    let http_ref = &http;
    let scorer_ref = &scorer;
    let results: Vec<Option<ScoredArticle>> = stream::iter(articles.into_iter().enumerate())
        .map(|(i, article)| async move {
            let body = extractor::article_text(http_ref, &article.url, &article.snippet).await;
            if body.text.trim().is_empty() {
                warn!(url = %article.url, reason = "no usable text", "Dropping article");
                return None;
            }
            if body.degraded {
                warn!(url = %article.url, "Scoring degraded article on snippet text");
            }
            match scorer_ref.assess(&body.text).await {
                Ok(assessment) => {
                    info!(index = i, score = assessment.score, url = %article.url, "Scored article");
                    Some(ScoredArticle {
                        article,
                        assessment,
                        fetch_index: i,
                        degraded: body.degraded,
                    })
                }
                Err(e) => {
                    warn!(url = %article.url, reason = %e, "Dropping article: scoring failed");
                    None
                }
            }
        })
        .buffer_unordered(args.concurrency as usize)
        .collect()
        .await;

    let scored: Vec<ScoredArticle> = results.into_iter().flatten().collect();
    let dropped = total - scored.len();
    info!(total, scored = scored.len(), dropped, "Completed article processing");

    // --- Rank and write: table first, file failures are fatal afterwards ---
    let ranked = ranker::rank(scored);
    outputs::table::print(&ranked);

    let slug = safe_slug(query.subject());
    let (json_path, csv_path) = outputs::output_paths(&args.results_dir, &slug, &run_timestamp());
    outputs::json::write_ranked(&ranked, &json_path)
        .await
        .inspect_err(|e| error!(path = %json_path.display(), error = %e, "Failed writing JSON"))?;
    outputs::csv::write_ranked(&ranked, &csv_path)
        .await
        .inspect_err(|e| error!(path = %csv_path.display(), error = %e, "Failed writing CSV"))?;

    println!("\nJSON Results:\n{}", json_path.canonicalize()?.display());
    println!("\nCSV Results:\n{}", csv_path.canonicalize()?.display());

    let elapsed = start_time.elapsed();
    info!(?elapsed, ranked = ranked.len(), "Execution complete");

    Ok(())
}
