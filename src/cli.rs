//! Command-line interface definitions.

use crate::rubric::ScorePolicy;
use clap::Parser;

/// Retrieve, summarize, and rank recent news articles for a company or
/// search term.
///
/// # Examples
///
/// ```sh
/// # Company website: the subject is derived from the domain
/// news_scout https://snowflake.com
///
/// # Free-text search term, 10 articles
/// news_scout bitcoin -n 10
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Company website URL (e.g. 'https://acme.com') or a search term
    /// (e.g. 'bitcoin'). A URL is reduced to a company name; anything else
    /// is used as the search term directly.
    #[arg(value_name = "company_url_or_search_term")]
    pub query: String,

    /// Number of news articles to retrieve (max: 100)
    #[arg(
        short = 'n',
        long,
        default_value_t = 25,
        value_parser = clap::value_parser!(u32).range(1..=100)
    )]
    pub num_articles: u32,

    /// Directory for JSON/CSV result files
    #[arg(long, default_value = "results")]
    pub results_dir: String,

    /// Path to the scoring rubric file
    #[arg(long, default_value = "rubric.txt")]
    pub rubric: String,

    /// Chat model used for summarization and scoring
    #[arg(long, default_value = "gpt-4.1-nano")]
    pub model: String,

    /// How rubric matches are normalized into the 0-100 score
    #[arg(long, value_enum, default_value_t = ScorePolicy::AllCriteria)]
    pub score_policy: ScorePolicy,

    /// Articles extracted and scored concurrently
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..=8))]
    pub concurrency: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["news_scout", "bitcoin"]);
        assert_eq!(cli.query, "bitcoin");
        assert_eq!(cli.num_articles, 25);
        assert_eq!(cli.results_dir, "results");
        assert_eq!(cli.rubric, "rubric.txt");
        assert_eq!(cli.score_policy, ScorePolicy::AllCriteria);
        assert_eq!(cli.concurrency, 4);
    }

    #[test]
    fn test_cli_short_and_long_article_count() {
        let cli = Cli::parse_from(["news_scout", "https://snowflake.com", "-n", "10"]);
        assert_eq!(cli.num_articles, 10);

        let cli = Cli::parse_from(["news_scout", "bitcoin", "--num-articles", "100"]);
        assert_eq!(cli.num_articles, 100);
    }

    #[test]
    fn test_cli_rejects_out_of_range_count() {
        assert!(Cli::try_parse_from(["news_scout", "bitcoin", "-n", "0"]).is_err());
        assert!(Cli::try_parse_from(["news_scout", "bitcoin", "-n", "101"]).is_err());
    }

    #[test]
    fn test_cli_requires_query() {
        assert!(Cli::try_parse_from(["news_scout"]).is_err());
    }

    #[test]
    fn test_cli_score_policy_values() {
        let cli = Cli::parse_from(["news_scout", "bitcoin", "--score-policy", "applicable-criteria"]);
        assert_eq!(cli.score_policy, ScorePolicy::ApplicableCriteria);
    }
}
