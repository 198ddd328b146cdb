//! Google Custom Search JSON API provider.
//!
//! Issues `GET {endpoint}?key=..&cx=..&q=..&num=..` and maps `items`
//! into `WebResult`s. A response without `items` is an empty result set.

use crate::client::{SearchClient, WebResult};
use coach_core::{AppError, AppResult};
use serde::Deserialize;

/// Default Custom Search endpoint.
const DEFAULT_GOOGLE_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// The API rejects `num` outside 1..=10.
const MAX_RESULTS_PER_QUERY: u32 = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    link: Option<String>,
}

impl From<SearchItem> for WebResult {
    fn from(item: SearchItem) -> Self {
        Self {
            title: item.title.unwrap_or_default(),
            snippet: item.snippet.unwrap_or_default(),
            link: item.link.filter(|l| !l.is_empty()),
        }
    }
}

/// Google Custom Search client.
pub struct GoogleSearchClient {
    endpoint: String,
    api_key: String,
    engine_id: String,
    client: reqwest::Client,
}

impl GoogleSearchClient {
    /// Create a client against the public Custom Search endpoint.
    pub fn new(api_key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self::with_endpoint(DEFAULT_GOOGLE_URL, api_key, engine_id)
    }

    /// Create a client against a custom endpoint.
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            client: reqwest::Client::new(),
        }
    }

    fn convert_response(&self, response: SearchResponse, num_results: u32) -> Vec<WebResult> {
        response
            .items
            .into_iter()
            .take(num_results as usize)
            .map(WebResult::from)
            .collect()
    }
}

#[async_trait::async_trait]
impl SearchClient for GoogleSearchClient {
    fn provider_name(&self) -> &str {
        "google"
    }

    async fn search(&self, query: &str, num_results: u32) -> AppResult<Vec<WebResult>> {
        let num = num_results.clamp(1, MAX_RESULTS_PER_QUERY);
        tracing::info!("Searching Google (num: {})", num);
        tracing::debug!("Search query: {}", query);

        let num_param = num.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num_param.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Failed to send request to Google: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Search(format!(
                "Google search API error ({}): {}",
                status, error_text
            )));
        }

        let search_response: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Failed to parse Google response: {}", e)))?;

        let results = self.convert_response(search_response, num);
        tracing::debug!("Google returned {} results", results.len());

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let client = GoogleSearchClient::with_endpoint("http://localhost:9000/search/", "k", "cx");
        assert_eq!(client.endpoint, "http://localhost:9000/search");
        assert_eq!(client.provider_name(), "google");
    }

    #[test]
    fn test_convert_response_maps_items() {
        let client = GoogleSearchClient::new("k", "cx");
        let body = r#"{
            "kind": "customsearch#search",
            "items": [
                {"title": "Liderlik 2025", "snippet": "Yeni trendler", "link": "https://a.example"},
                {"snippet": "Başlıksız sonuç"},
                {"title": "Linksiz", "snippet": "Özet", "link": ""}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();

        let results = client.convert_response(parsed, 3);
        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0],
            WebResult::new("Liderlik 2025", "Yeni trendler", "https://a.example")
        );
        assert_eq!(results[1].title, "");
        assert!(results[1].link.is_none());
        assert!(results[2].link.is_none());
    }

    #[test]
    fn test_missing_items_is_empty() {
        let client = GoogleSearchClient::new("k", "cx");
        let parsed: SearchResponse =
            serde_json::from_str(r#"{"kind": "customsearch#search"}"#).unwrap();
        assert!(client.convert_response(parsed, 3).is_empty());
    }

    #[test]
    fn test_convert_response_truncates() {
        let client = GoogleSearchClient::new("k", "cx");
        let parsed: SearchResponse = serde_json::from_str(
            r#"{"items": [{"title": "1"}, {"title": "2"}, {"title": "3"}, {"title": "4"}]}"#,
        )
        .unwrap();
        assert_eq!(client.convert_response(parsed, 3).len(), 3);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_search_error() {
        let client = GoogleSearchClient::with_endpoint("http://127.0.0.1:1", "k", "cx");
        let result = client.search("liderlik", 3).await;
        assert!(matches!(result, Err(AppError::Search(_))));
    }
}
