//! Search client abstraction and result types.

use coach_core::AppResult;
use serde::{Deserialize, Serialize};

/// A single web search hit.
///
/// Results without a link still contribute their snippet to the
/// grounding context; only linked results are surfaced as sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebResult {
    /// Result title
    #[serde(default)]
    pub title: String,

    /// Short text excerpt
    #[serde(default)]
    pub snippet: String,

    /// Target URL, when the provider returned one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl WebResult {
    /// Create a result with a link.
    pub fn new(title: impl Into<String>, snippet: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
            link: Some(link.into()),
        }
    }

    /// Create a result that has no link.
    pub fn unlinked(title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
            link: None,
        }
    }
}

/// Trait for web search providers.
///
/// Implementations block until the provider answers or fails; failures
/// surface as `AppError::Search` and are never retried here.
#[async_trait::async_trait]
pub trait SearchClient: Send + Sync {
    /// Get the provider name (e.g., "google").
    fn provider_name(&self) -> &str;

    /// Run a query and return at most `num_results` hits in provider order.
    async fn search(&self, query: &str, num_results: u32) -> AppResult<Vec<WebResult>>;
}
