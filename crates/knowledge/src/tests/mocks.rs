//! Call-counting test doubles for the external services.

use crate::embeddings::EmbeddingProvider;
use coach_core::{AppError, AppResult};
use coach_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use coach_search::{SearchClient, WebResult};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Embeds known texts to fixed vectors and everything else to `default`.
#[derive(Debug)]
pub struct MockEmbeddingProvider {
    default: Vec<f32>,
    vectors: HashMap<String, Vec<f32>>,
    fail: bool,
    batch_calls: AtomicUsize,
}

impl MockEmbeddingProvider {
    pub fn new(default: Vec<f32>) -> Self {
        Self {
            default,
            vectors: HashMap::new(),
            fail: false,
            batch_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_vector(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-v1"
    }

    fn dimensions(&self) -> usize {
        self.default.len()
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Other("embedding model unavailable".to_string()));
        }

        Ok(texts
            .iter()
            .map(|t| self.vectors.get(t).unwrap_or(&self.default).clone())
            .collect())
    }
}

/// Replies from a script, in call order, and records every request.
pub struct MockLlmClient {
    replies: Mutex<VecDeque<AppResult<String>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(self, content: &str) -> Self {
        self.replies.lock().unwrap().push_back(Ok(content.to_string()));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(AppError::Llm(message.to_string())));
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::Llm("no scripted reply left".to_string())));

        next.map(|content| LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::new(0, 0),
        })
    }
}

/// Returns fixed results and records each query.
pub struct MockSearchClient {
    results: Vec<WebResult>,
    fail: bool,
    queries: Mutex<Vec<(String, u32)>>,
}

impl MockSearchClient {
    pub fn new(results: Vec<WebResult>) -> Self {
        Self {
            results,
            fail: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<(String, u32)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SearchClient for MockSearchClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &str, num_results: u32) -> AppResult<Vec<WebResult>> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), num_results));

        if self.fail {
            return Err(AppError::Search("quota exceeded".to_string()));
        }
        Ok(self.results.clone())
    }
}
