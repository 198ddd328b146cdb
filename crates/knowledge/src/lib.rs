//! Leadership-coaching knowledge pipeline.
//!
//! Answers a question from a pre-chunked corpus when the retrieved context
//! is long enough and judged relevant, and from a recency-biased web
//! search otherwise.
//!
//! # Example
//! ```no_run
//! use coach_core::AppConfig;
//! use coach_knowledge::CoachPipeline;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let pipeline = CoachPipeline::from_config(&config).await?;
//! let outcome = pipeline.answer("İyi bir liderin özellikleri nelerdir?").await?;
//! println!("{} ({})", outcome.answer, outcome.source_kind);
//! # Ok(())
//! # }
//! ```

pub mod corpus;
pub mod embeddings;
pub mod rag;
pub mod ranker;
pub mod types;

#[cfg(test)]
mod tests;

pub use corpus::{CorpusIndex, CorpusStore};
pub use embeddings::{Embedder, EmbeddingProvider};
pub use rag::{AnswerGenerator, CoachPipeline, GateDecision, SufficiencyGate, WebFallback};
pub use ranker::{cosine_similarity, rank, DEFAULT_TOP_K};
pub use types::{
    AnswerOutcome, Chunk, CorpusRecord, CorpusStats, RankedChunk, RetrievalResult, SourceKind,
};
