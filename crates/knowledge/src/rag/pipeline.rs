//! Question-answering pipeline.
//!
//! One pass per question:
//! 1. Embed the question and rank corpus chunks (top 3)
//! 2. Run the sufficiency gate over the joined context
//! 3. Sufficient: answer from the corpus, sources are distinct chunk titles
//! 4. Otherwise: search the web, answer from the results, sources are links
//!
//! Every stage failure ends the pass with an error; there are no partial
//! outcomes and no retries.

use crate::corpus::CorpusStore;
use crate::embeddings::Embedder;
use crate::rag::gate::SufficiencyGate;
use crate::rag::generate::AnswerGenerator;
use crate::rag::web::WebFallback;
use crate::ranker::{rank, DEFAULT_TOP_K};
use crate::types::{AnswerOutcome, RetrievalResult, SourceKind};
use coach_core::{AppConfig, AppError, AppResult};
use coach_llm::create_client;
use coach_search::create_search_client;
use std::sync::Arc;
use tracing::instrument;

/// Retrieval, gating and answer generation wired together.
///
/// Holds the shared corpus store and embedder; `answer` takes `&self`
/// so one pipeline serves many concurrent questions.
pub struct CoachPipeline {
    store: Arc<CorpusStore>,
    embedder: Arc<Embedder>,
    gate: SufficiencyGate,
    generator: AnswerGenerator,
    web: WebFallback,
    top_k: usize,
}

impl CoachPipeline {
    pub fn new(
        store: Arc<CorpusStore>,
        embedder: Arc<Embedder>,
        gate: SufficiencyGate,
        generator: AnswerGenerator,
        web: WebFallback,
    ) -> Self {
        Self {
            store,
            embedder,
            gate,
            generator,
            web,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Build every collaborator from configuration.
    ///
    /// Clients are created once here; the corpus itself loads on first use.
    pub async fn from_config(config: &AppConfig) -> AppResult<Self> {
        let api_key = config.resolve_api_key(&config.provider);
        let endpoint = config.resolve_endpoint(&config.provider);
        let llm = create_client(
            &config.provider,
            endpoint.as_deref(),
            api_key.as_deref(),
            config.resolve_timeout(&config.provider),
        )
        .map_err(|e| AppError::Config(format!("Failed to create LLM client: {}", e)))?;

        let embedding_key = config.resolve_embedding_api_key();
        let embedder =
            Arc::new(Embedder::from_settings(&config.embedding, embedding_key.as_deref()).await?);

        let (search_key, engine_id) = config.resolve_search_credentials();
        let search = create_search_client(
            &config.search.provider,
            config.search.endpoint.as_deref(),
            search_key.as_deref(),
            engine_id.as_deref(),
        )
        .map_err(|e| AppError::Config(format!("Failed to create search client: {}", e)))?;

        let store = Arc::new(CorpusStore::new(
            config.resolved_corpus_path(),
            Arc::clone(&embedder),
        ));
        let gate = SufficiencyGate::load(
            &config.workspace,
            Arc::clone(&llm),
            &config.model,
            config.gate.clone(),
        )?;
        let generator = AnswerGenerator::load(&config.workspace, llm, &config.model)?;
        let web = WebFallback::new(search, config.search.num_results);

        Ok(Self::new(store, embedder, gate, generator, web))
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn corpus(&self) -> &CorpusStore {
        &self.store
    }

    /// Embed the question and rank it against the corpus.
    pub async fn retrieve(&self, question: &str) -> AppResult<RetrievalResult> {
        let index = self.store.load().await?;
        let query = self.embedder.encode_one(question).await?;
        let retrieval = rank(&query, &index, self.top_k)?;

        tracing::info!(
            "Retrieved {} chunks (top score: {:.3})",
            retrieval.selected.len(),
            retrieval.max_score().unwrap_or(0.0)
        );

        Ok(retrieval)
    }

    /// Answer one question.
    #[instrument(skip_all, fields(question_len = question.chars().count()))]
    pub async fn answer(&self, question: &str) -> AppResult<AnswerOutcome> {
        if question.trim().is_empty() {
            return Err(AppError::Input("Question cannot be empty".to_string()));
        }

        let retrieval = self.retrieve(question).await?;
        let decision = self.gate.evaluate(question, &retrieval.context_text).await?;

        if decision.is_sufficient() {
            tracing::info!("Answering from local corpus");
            let answer = self
                .generator
                .generate(question, &retrieval.context_text)
                .await?;

            return Ok(AnswerOutcome {
                answer,
                sources: retrieval.distinct_source_titles(),
                source_kind: SourceKind::LocalCorpus,
            });
        }

        tracing::info!("Local knowledge insufficient ({}), using web fallback", decision);
        let fetched = self.web.fetch(question).await?;
        let answer = self
            .generator
            .generate_from_web(question, &fetched.context_text, fetched.current_year)
            .await?;

        Ok(AnswerOutcome {
            answer,
            sources: fetched.links,
            source_kind: SourceKind::Web,
        })
    }
}
