//! Ollama Embedding Provider
//!
//! Provides sentence embeddings via Ollama's local API using multilingual
//! models such as `paraphrase-multilingual`.
//!
//! # Features
//! - Local-first (no API costs, the corpus never leaves the machine)
//! - Multilingual models handle Turkish passages
//! - Connection and dimension check at construction
//! - Automatic retry with exponential backoff
//!
//! # Example
//! ```no_run
//! use coach_core::config::EmbeddingSettings;
//! use coach_knowledge::embeddings::EmbeddingProvider;
//! use coach_knowledge::embeddings::providers::OllamaProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = EmbeddingSettings::default();
//! let provider = OllamaProvider::new(&settings).await?;
//! let embedding = provider.embed("İyi bir lider nasıl olur?").await?;
//! assert_eq!(embedding.len(), settings.dimensions);
//! # Ok(())
//! # }
//! ```

use crate::embeddings::EmbeddingProvider;
use async_trait::async_trait;
use coach_core::config::EmbeddingSettings;
use coach_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// Ollama API endpoint for embeddings
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

/// Maximum retry attempts for failed requests
const MAX_RETRIES: u32 = 3;

/// Initial backoff duration in milliseconds
const INITIAL_BACKOFF_MS: u64 = 100;

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Ollama embedding provider using local API
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaProvider {
    /// Create a provider and verify the model answers with the configured dimensions.
    ///
    /// The base URL is taken from the settings, then `OLLAMA_URL`, then the
    /// local default.
    ///
    /// # Errors
    /// * `AppError::Embedding` - If Ollama is not reachable or the model is invalid
    pub async fn new(settings: &EmbeddingSettings) -> AppResult<Self> {
        let base_url = settings
            .endpoint
            .clone()
            .or_else(|| std::env::var("OLLAMA_URL").ok())
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());

        let provider = Self::unverified(base_url, &settings.model, settings.dimensions)?;
        provider.verify_connection().await?;

        Ok(provider)
    }

    fn unverified(base_url: String, model: &str, dimensions: usize) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::Embedding(format!("Failed to create HTTP client for Ollama: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimensions,
        })
    }

    #[instrument(skip(self), fields(model = %self.model))]
    async fn verify_connection(&self) -> AppResult<()> {
        debug!("Verifying Ollama connection at {}", self.base_url);

        match self.embed_with_retries("bağlantı testi", MAX_RETRIES).await {
            Ok(_) => {
                debug!("Ollama connection verified, model '{}' ready", self.model);
                Ok(())
            }
            Err(e) => {
                error!("Failed to connect to Ollama: {}", e);
                Err(AppError::Embedding(format!(
                    "Ollama not available at {} ({}). Ensure Ollama is running and model '{}' is installed. Run: ollama pull {}",
                    self.base_url, e, self.model, self.model
                )))
            }
        }
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), model = %self.model))]
    async fn embed_with_retries(&self, text: &str, retries: u32) -> AppResult<Vec<f32>> {
        let mut attempt = 0;
        let mut last_error = None;

        while attempt < retries {
            match self.embed_single(text).await {
                Ok(embedding) => return Ok(embedding),
                Err(e) => {
                    attempt += 1;
                    last_error = Some(e);

                    if attempt < retries {
                        let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt);
                        warn!(
                            "Embedding failed (attempt {}/{}), retrying in {}ms",
                            attempt, retries, backoff_ms
                        );
                        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| AppError::Embedding("Unknown embedding error".to_string())))
    }

    fn endpoint_url(&self) -> String {
        format!("{}{}", self.base_url, EMBEDDING_ENDPOINT)
    }

    async fn embed_single(&self, text: &str) -> AppResult<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(self.endpoint_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to send request to Ollama: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|e| e.error)
                .unwrap_or(error_text);

            return Err(AppError::Embedding(format!(
                "Ollama API error ({}): {}",
                status, message
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::Embedding(format!("Failed to parse Ollama response: {}", e))
        })?;

        self.check_dimensions(body.embedding)
    }

    fn check_dimensions(&self, embedding: Vec<f32>) -> AppResult<Vec<f32>> {
        if embedding.len() != self.dimensions {
            return Err(AppError::Embedding(format!(
                "Ollama model '{}' returned {} dimensions, expected {}",
                self.model,
                embedding.len(),
                self.dimensions
            )));
        }
        Ok(embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), provider = "ollama", model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!("Embedding batch of {} texts", texts.len());

        // The embeddings endpoint takes one prompt per request.
        let mut embeddings = Vec::with_capacity(texts.len());
        for (i, text) in texts.iter().enumerate() {
            if text.trim().is_empty() {
                warn!("Empty text at index {}, using zero vector", i);
                embeddings.push(vec![0.0; self.dimensions]);
                continue;
            }

            embeddings.push(self.embed_with_retries(text, MAX_RETRIES).await?);
        }

        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> EmbeddingSettings {
        EmbeddingSettings {
            provider: "ollama".to_string(),
            model: "paraphrase-multilingual".to_string(),
            dimensions: 768,
            ..Default::default()
        }
    }

    #[test]
    fn test_endpoint_url() {
        let provider =
            OllamaProvider::unverified("http://gpu-box:11434/".to_string(), "m", 768).unwrap();
        assert_eq!(provider.endpoint_url(), "http://gpu-box:11434/api/embeddings");
    }

    #[test]
    fn test_request_serialization() {
        let request = EmbeddingRequest {
            model: "paraphrase-multilingual",
            prompt: "Empati",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "paraphrase-multilingual");
        assert_eq!(json["prompt"], "Empati");
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let provider = OllamaProvider::unverified(DEFAULT_OLLAMA_URL.to_string(), "m", 4).unwrap();
        assert!(provider.check_dimensions(vec![0.1; 4]).is_ok());
        assert!(matches!(
            provider.check_dimensions(vec![0.1; 3]),
            Err(AppError::Embedding(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_texts_are_zero_vectors() {
        let provider = OllamaProvider::unverified(DEFAULT_OLLAMA_URL.to_string(), "m", 4).unwrap();
        let embeddings = provider
            .embed_batch(&["   ".to_string()])
            .await
            .unwrap();
        assert_eq!(embeddings, vec![vec![0.0; 4]]);
    }

    #[tokio::test]
    async fn test_live_embed_batch() {
        if std::env::var("OLLAMA_URL").is_err() && !is_ollama_running().await {
            println!("Skipping test: Ollama not running");
            return;
        }

        let settings = test_settings();
        let provider = match OllamaProvider::new(&settings).await {
            Ok(provider) => provider,
            Err(e) => {
                println!("Skipping test: {}", e);
                return;
            }
        };

        let texts = vec!["Liderlik".to_string(), "Empati".to_string()];
        let embeddings = provider.embed_batch(&texts).await.unwrap();

        assert_eq!(embeddings.len(), 2);
        assert!(embeddings.iter().all(|e| e.len() == settings.dimensions));
    }

    async fn is_ollama_running() -> bool {
        let Ok(client) = Client::builder().timeout(Duration::from_secs(2)).build() else {
            return false;
        };

        let url = format!("{}/api/tags", DEFAULT_OLLAMA_URL);
        client.get(&url).send().await.is_ok()
    }
}
