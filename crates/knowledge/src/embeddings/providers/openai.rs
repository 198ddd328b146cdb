//! OpenAI-compatible embeddings provider.

use crate::embeddings::EmbeddingProvider;
use coach_core::config::EmbeddingSettings;
use coach_core::{AppError, AppResult};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// Inputs sent per `/embeddings` request.
const MAX_BATCH_SIZE: usize = 256;

/// Embeddings client for `POST {base_url}/embeddings`.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    dimensions: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

impl OpenAiProvider {
    /// Builds a new OpenAI embeddings client.
    pub fn new(settings: &EmbeddingSettings, api_key: &str) -> AppResult<Self> {
        if api_key.trim().is_empty() {
            return Err(AppError::Embedding("missing OpenAI API key".to_string()));
        }
        if settings.model.trim().is_empty() {
            return Err(AppError::Embedding("missing OpenAI model name".to_string()));
        }

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
            .map_err(|e| AppError::Embedding(format!("invalid OpenAI API key: {}", e)))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| {
                AppError::Embedding(format!("failed to build OpenAI HTTP client: {}", e))
            })?;

        let base_url = settings.endpoint.as_deref().unwrap_or(DEFAULT_OPENAI_URL);

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model: settings.model.clone(),
            dimensions: settings.dimensions,
        })
    }

    async fn embed_chunk(&self, inputs: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: inputs,
            dimensions: self.dimensions,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("OpenAI embeddings request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(AppError::Embedding(format!(
                "OpenAI embeddings request failed ({}): {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::Embedding(format!("failed to parse OpenAI embedding response: {}", e))
        })?;

        into_ordered_rows(parsed, inputs.len())
    }
}

/// Rows come back tagged with their input index; order by it.
fn into_ordered_rows(mut parsed: EmbeddingResponse, expected: usize) -> AppResult<Vec<Vec<f32>>> {
    parsed.data.sort_by_key(|entry| entry.index);
    if parsed.data.len() != expected {
        return Err(AppError::Embedding(format!(
            "OpenAI returned {} embeddings for {} inputs",
            parsed.data.len(),
            expected
        )));
    }

    Ok(parsed.data.into_iter().map(|entry| entry.embedding).collect())
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAiProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut rows = Vec::with_capacity(texts.len());
        for batch in texts.chunks(MAX_BATCH_SIZE) {
            tracing::debug!("Sending {} inputs to {}", batch.len(), self.endpoint);
            rows.extend(self.embed_chunk(batch).await?);
        }
        Ok(rows)
    }
}
