//! Embedding layer for the corpus and incoming questions.
//!
//! `Embedder` wraps a single provider, constructed once and shared by the
//! corpus store and the pipeline for the life of the process.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};

use coach_core::config::EmbeddingSettings;
use coach_core::{AppError, AppResult};
use std::sync::Arc;

/// Text-to-vector encoder with shape guarantees.
///
/// Every call returns exactly one row per input, in input order, and all
/// rows share one dimensionality. Any provider failure surfaces as
/// `AppError::Embedding`.
#[derive(Debug, Clone)]
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
}

impl Embedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    /// Build the configured provider.
    pub async fn from_settings(
        settings: &EmbeddingSettings,
        api_key: Option<&str>,
    ) -> AppResult<Self> {
        tracing::debug!(
            "Creating embedding provider: provider={}, model={}, dimensions={}",
            settings.provider,
            settings.model,
            settings.dimensions
        );

        let provider = create_provider(settings, api_key)
            .await
            .map_err(into_embedding_error)?;
        Ok(Self::new(provider))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Encode texts into a matrix with one row per text.
    pub async fn encode(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::info!(
            "Embedding {} texts using provider '{}' (model: {})",
            texts.len(),
            self.provider.provider_name(),
            self.provider.model_name()
        );

        let rows = self
            .provider
            .embed_batch(texts)
            .await
            .map_err(into_embedding_error)?;

        if rows.len() != texts.len() {
            return Err(AppError::Embedding(format!(
                "Provider returned {} embeddings for {} texts",
                rows.len(),
                texts.len()
            )));
        }

        let dimension = rows.first().map(Vec::len).unwrap_or(0);
        if let Some(pos) = rows.iter().position(|row| row.len() != dimension) {
            return Err(AppError::Embedding(format!(
                "Embedding {} has dimension {}, expected {}",
                pos,
                rows[pos].len(),
                dimension
            )));
        }

        if let Some(pos) = rows.iter().position(|row| row.iter().any(|v| !v.is_finite())) {
            return Err(AppError::Embedding(format!(
                "Embedding {} contains a non-finite value",
                pos
            )));
        }

        tracing::debug!("Generated {} embeddings of dimension {}", rows.len(), dimension);
        Ok(rows)
    }

    /// Encode a single text.
    pub async fn encode_one(&self, text: &str) -> AppResult<Vec<f32>> {
        self.encode(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

fn into_embedding_error(err: AppError) -> AppError {
    match err {
        AppError::Embedding(_) => err,
        other => AppError::Embedding(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::mocks::MockEmbeddingProvider;

    #[tokio::test]
    async fn test_encode_preserves_rows_and_order() {
        let provider = MockEmbeddingProvider::new(vec![0.0, 1.0])
            .with_vector("a", vec![1.0, 0.0])
            .with_vector("b", vec![0.0, 2.0]);
        let embedder = Embedder::new(Arc::new(provider));

        let rows = embedder
            .encode(&["b".to_string(), "a".to_string()])
            .await
            .unwrap();
        assert_eq!(rows, vec![vec![0.0, 2.0], vec![1.0, 0.0]]);
    }

    #[tokio::test]
    async fn test_empty_input_skips_provider() {
        let provider = Arc::new(MockEmbeddingProvider::new(vec![1.0]));
        let embedder = Embedder::new(provider.clone());

        assert!(embedder.encode(&[]).await.unwrap().is_empty());
        assert_eq!(provider.batch_calls(), 0);
    }

    #[tokio::test]
    async fn test_ragged_rows_rejected() {
        let provider = MockEmbeddingProvider::new(vec![1.0, 0.0]).with_vector("kısa", vec![1.0]);
        let embedder = Embedder::new(Arc::new(provider));

        let result = embedder
            .encode(&["uzun".to_string(), "kısa".to_string()])
            .await;
        assert!(matches!(result, Err(AppError::Embedding(_))));
    }

    #[tokio::test]
    async fn test_non_finite_rows_rejected() {
        let provider =
            MockEmbeddingProvider::new(vec![1.0, 0.0]).with_vector("bozuk", vec![f32::NAN, 1.0]);
        let embedder = Embedder::new(Arc::new(provider));

        let result = embedder.encode_one("bozuk").await;
        assert!(matches!(result, Err(AppError::Embedding(_))));
    }

    #[tokio::test]
    async fn test_provider_failure_is_embedding_error() {
        let provider = MockEmbeddingProvider::new(vec![1.0]).failing();
        let embedder = Embedder::new(Arc::new(provider));

        let result = embedder.encode_one("soru").await;
        assert!(matches!(result, Err(AppError::Embedding(_))));
    }

    #[tokio::test]
    async fn test_from_settings_trigram() {
        let settings = EmbeddingSettings {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 32,
            ..Default::default()
        };

        let embedder = Embedder::from_settings(&settings, None).await.unwrap();
        assert_eq!(embedder.provider_name(), "trigram");
        assert_eq!(embedder.encode_one("liderlik").await.unwrap().len(), 32);
    }
}
