//! Embedding provider trait and factory.

use coach_core::config::EmbeddingSettings;
use coach_core::{AppError, AppResult};
use std::sync::Arc;

use super::providers::{OllamaProvider, OpenAiProvider, TrigramProvider};

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "ollama", "openai", "trigram")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch, one row per text.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

/// Create an embedding provider from settings.
///
/// Network-backed providers are checked for reachability here, so a
/// misconfigured service fails before any question is answered.
pub async fn create_provider(
    settings: &EmbeddingSettings,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match settings.provider.as_str() {
        "trigram" => Ok(Arc::new(TrigramProvider::new(settings.dimensions))),

        "ollama" => {
            let provider = OllamaProvider::new(settings).await?;
            Ok(Arc::new(provider))
        }

        "openai" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Embedding("OpenAI embeddings require an API key".to_string())
            })?;
            let provider = OpenAiProvider::new(settings, api_key)?;
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Embedding(format!(
            "Unknown embedding provider: '{}'. Supported providers: ollama, openai, trigram",
            settings.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: &str) -> EmbeddingSettings {
        EmbeddingSettings {
            provider: provider.to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 64,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_trigram_provider() {
        let provider = create_provider(&settings("trigram"), None).await.unwrap();
        assert_eq!(provider.provider_name(), "trigram");
        assert_eq!(provider.dimensions(), 64);

        let embedding = provider.embed("liderlik koçluğu").await.unwrap();
        assert_eq!(embedding.len(), 64);
    }

    #[tokio::test]
    async fn test_create_unknown_provider() {
        let result = create_provider(&settings("gguf"), None).await;
        let err = result.unwrap_err();
        assert!(matches!(err, AppError::Embedding(_)));
        assert!(err.to_string().contains("Unknown embedding provider"));
    }

    #[tokio::test]
    async fn test_openai_requires_key() {
        let result = create_provider(&settings("openai"), None).await;
        assert!(matches!(result, Err(AppError::Embedding(_))));
    }
}
