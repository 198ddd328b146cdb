//! Core types for the coaching knowledge pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Title used when a corpus record does not name its source.
pub const UNKNOWN_SOURCE_TITLE: &str = "Bilinmeyen kaynak";

/// A raw record from the corpus resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusRecord {
    /// Passage text
    pub chunk: String,

    /// Precomputed embedding, if the corpus was exported with one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    /// Originating source (e.g. talk or video title)
    #[serde(default, alias = "source_title", skip_serializing_if = "Option::is_none")]
    pub video_title: Option<String>,
}

/// A passage of the corpus with its provenance.
///
/// Identity is the chunk's ordinal position in the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source_title: String,
}

impl From<CorpusRecord> for Chunk {
    fn from(record: CorpusRecord) -> Self {
        Self {
            text: record.chunk,
            source_title: record
                .video_title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_SOURCE_TITLE.to_string()),
        }
    }
}

/// A chunk selected by the ranker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedChunk {
    /// Position of the chunk in the corpus
    pub ordinal: usize,

    /// Cosine similarity against the query, in [-1, 1]
    pub score: f32,

    pub chunk: Chunk,
}

/// Top-k retrieval for one question.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetrievalResult {
    /// Selected chunk texts joined with newlines, best first
    pub context_text: String,

    /// Selected chunks ranked by descending similarity
    pub selected: Vec<RankedChunk>,
}

impl RetrievalResult {
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.selected.iter().map(|r| &r.chunk)
    }

    pub fn ordinals(&self) -> Vec<usize> {
        self.selected.iter().map(|r| r.ordinal).collect()
    }

    pub fn scores(&self) -> Vec<f32> {
        self.selected.iter().map(|r| r.score).collect()
    }

    /// Highest similarity among the selected chunks.
    pub fn max_score(&self) -> Option<f32> {
        self.selected.first().map(|r| r.score)
    }

    /// Distinct source titles of the selected chunks, in first-appearance order.
    pub fn distinct_source_titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = Vec::new();
        for chunk in self.chunks() {
            if !titles.contains(&chunk.source_title) {
                titles.push(chunk.source_title.clone());
            }
        }
        titles
    }
}

/// Where an answer's grounding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Sources are corpus source titles
    LocalCorpus,

    /// Sources are web links
    Web,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalCorpus => write!(f, "local corpus"),
            Self::Web => write!(f, "web"),
        }
    }
}

/// Terminal result of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    /// Generated answer, unmodified
    pub answer: String,

    /// Source titles (local) or links (web), see `source_kind`
    pub sources: Vec<String>,

    pub source_kind: SourceKind,
}

/// Summary of a loaded corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    pub chunk_count: usize,
    pub dimension: usize,
    pub distinct_sources: usize,
    pub precomputed_embeddings: bool,
}
