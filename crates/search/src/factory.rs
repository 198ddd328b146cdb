//! Search provider factory.

use crate::client::SearchClient;
use crate::providers::GoogleSearchClient;
use std::sync::Arc;

/// Create a search client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("google")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Provider API key
/// * `engine_id` - Programmable search engine id (google)
///
/// # Errors
/// Returns error if the provider is unknown or a required secret is missing.
pub fn create_search_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    engine_id: Option<&str>,
) -> Result<Arc<dyn SearchClient>, String> {
    match provider.to_lowercase().as_str() {
        "google" => {
            let api_key = api_key.ok_or_else(|| "Google search requires an API key".to_string())?;
            let engine_id =
                engine_id.ok_or_else(|| "Google search requires a search engine id".to_string())?;

            let client = match endpoint {
                Some(url) => GoogleSearchClient::with_endpoint(url, api_key, engine_id),
                None => GoogleSearchClient::new(api_key, engine_id),
            };
            Ok(Arc::new(client))
        }
        _ => Err(format!("Unknown search provider: {}", provider)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_google_client() {
        let client = create_search_client("google", None, Some("key"), Some("cx")).unwrap();
        assert_eq!(client.provider_name(), "google");
    }

    #[test]
    fn test_google_requires_engine_id() {
        match create_search_client("google", None, Some("key"), None) {
            Err(err) => assert!(err.contains("search engine id")),
            Ok(_) => panic!("Expected error without engine id"),
        }
    }

    #[test]
    fn test_unknown_provider() {
        match create_search_client("bing", None, Some("key"), Some("cx")) {
            Err(err) => assert!(err.contains("Unknown search provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
