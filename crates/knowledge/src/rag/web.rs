//! Web fallback: recency-biased search used when local context is insufficient.

use chrono::Datelike;
use coach_core::AppResult;
use coach_search::{SearchClient, WebResult};
use std::sync::Arc;

/// Results requested per fallback query.
pub const DEFAULT_NUM_RESULTS: u32 = 3;

/// Search results prepared for grounding.
#[derive(Debug, Clone, PartialEq)]
pub struct WebFetch {
    /// Results in provider order
    pub results: Vec<WebResult>,

    /// Links of the results that have one, in result order
    pub links: Vec<String>,

    /// `"{title}: {snippet}"` per result, joined with newlines
    pub context_text: String,

    /// Year the query was biased against
    pub current_year: i32,
}

/// Search query with a lower date bound of last year.
pub fn build_query(question: &str, current_year: i32) -> String {
    format!("{} after:{}", question, current_year - 1)
}

pub fn extract_links(results: &[WebResult]) -> Vec<String> {
    results.iter().filter_map(|r| r.link.clone()).collect()
}

pub fn grounding_context(results: &[WebResult]) -> String {
    results
        .iter()
        .map(|r| format!("{}: {}", r.title, r.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Web search provider wrapper for the fallback branch.
pub struct WebFallback {
    client: Arc<dyn SearchClient>,
    num_results: u32,
    year: Option<i32>,
}

impl WebFallback {
    pub fn new(client: Arc<dyn SearchClient>, num_results: u32) -> Self {
        Self {
            client,
            num_results,
            year: None,
        }
    }

    /// Pin the year instead of reading the clock.
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn current_year(&self) -> i32 {
        self.year.unwrap_or_else(|| chrono::Local::now().year())
    }

    /// Search for a question. Search failures propagate; an empty result list does not fail.
    pub async fn fetch(&self, question: &str) -> AppResult<WebFetch> {
        let current_year = self.current_year();
        let query = build_query(question, current_year);

        tracing::info!(
            "Falling back to web search via {} ({} results)",
            self.client.provider_name(),
            self.num_results
        );

        let results = self.client.search(&query, self.num_results).await?;
        let links = extract_links(&results);
        let context_text = grounding_context(&results);

        tracing::debug!(
            "Web search returned {} results, {} with links",
            results.len(),
            links.len()
        );

        Ok(WebFetch {
            results,
            links,
            context_text,
            current_year,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::mocks::MockSearchClient;
    use coach_core::AppError;

    #[test]
    fn test_query_bias() {
        assert_eq!(build_query("Liderlik trendleri", 2026), "Liderlik trendleri after:2025");
    }

    #[test]
    fn test_links_skip_unlinked_results() {
        let results = vec![
            WebResult::new("A", "a", "x"),
            WebResult::unlinked("B", "b"),
            WebResult::new("C", "c", "y"),
        ];

        assert_eq!(extract_links(&results), vec!["x", "y"]);
        assert_eq!(grounding_context(&results), "A: a\nB: b\nC: c");
    }

    #[tokio::test]
    async fn test_fetch_uses_year_and_result_count() {
        let client = Arc::new(MockSearchClient::new(vec![WebResult::new("T", "S", "L")]));
        let fallback = WebFallback::new(client.clone(), DEFAULT_NUM_RESULTS).with_year(2026);

        let fetched = fallback.fetch("Koçluk nedir?").await.unwrap();

        assert_eq!(
            client.queries(),
            vec![("Koçluk nedir? after:2025".to_string(), 3)]
        );
        assert_eq!(fetched.links, vec!["L"]);
        assert_eq!(fetched.context_text, "T: S");
        assert_eq!(fetched.current_year, 2026);
    }

    #[tokio::test]
    async fn test_empty_results_are_not_an_error() {
        let client = Arc::new(MockSearchClient::new(Vec::new()));
        let fetched = WebFallback::new(client, 3).fetch("Soru").await.unwrap();

        assert!(fetched.results.is_empty());
        assert!(fetched.links.is_empty());
        assert_eq!(fetched.context_text, "");
    }

    #[tokio::test]
    async fn test_search_failure_propagates() {
        let client = Arc::new(MockSearchClient::failing());
        let result = WebFallback::new(client, 3).fetch("Soru").await;
        assert!(matches!(result, Err(AppError::Search(_))));
    }
}
