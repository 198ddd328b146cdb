//! Corpus store: loads pre-chunked passages and their embedding matrix once.
//!
//! The resource is a JSON array of records, or JSON Lines when the file
//! extension is `.jsonl`. Each record carries `chunk`, an optional
//! `embedding` and a `video_title` (alias `source_title`).

use crate::embeddings::Embedder;
use crate::types::{Chunk, CorpusRecord, CorpusStats};
use coach_core::{AppError, AppResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Loaded corpus: chunks plus a parallel embedding matrix.
///
/// `chunks.len() == embeddings.len()` and every row has `dimension`
/// entries; both are enforced at construction.
#[derive(Debug, Clone)]
pub struct CorpusIndex {
    chunks: Vec<Chunk>,
    embeddings: Vec<Vec<f32>>,
    dimension: usize,
    precomputed: bool,
}

impl CorpusIndex {
    pub fn new(chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>, precomputed: bool) -> AppResult<Self> {
        if chunks.is_empty() {
            return Err(AppError::CorpusLoad("Corpus contains no chunks".to_string()));
        }

        if chunks.len() != embeddings.len() {
            return Err(AppError::CorpusLoad(format!(
                "Corpus has {} chunks but {} embedding rows",
                chunks.len(),
                embeddings.len()
            )));
        }

        let dimension = embeddings[0].len();
        if dimension == 0 {
            return Err(AppError::CorpusLoad(
                "Corpus embeddings have zero dimensions".to_string(),
            ));
        }

        if let Some(pos) = embeddings.iter().position(|row| row.len() != dimension) {
            return Err(AppError::CorpusLoad(format!(
                "Embedding for chunk {} has {} dimensions, expected {}",
                pos,
                embeddings[pos].len(),
                dimension
            )));
        }

        if let Some(pos) = embeddings
            .iter()
            .position(|row| row.iter().any(|v| !v.is_finite()))
        {
            return Err(AppError::CorpusLoad(format!(
                "Embedding for chunk {} contains a non-finite value",
                pos
            )));
        }

        Ok(Self {
            chunks,
            embeddings,
            dimension,
            precomputed,
        })
    }

    /// Build an index from records, encoding every text when any record lacks an embedding.
    pub async fn from_records(records: Vec<CorpusRecord>, embedder: &Embedder) -> AppResult<Self> {
        if records.is_empty() {
            return Err(AppError::CorpusLoad("Corpus contains no records".to_string()));
        }

        let precomputed = records.iter().all(|r| r.embedding.is_some());

        let (chunks, embeddings): (Vec<Chunk>, Vec<Vec<f32>>) = if precomputed {
            tracing::info!("Using precomputed embeddings for {} chunks", records.len());
            records
                .into_iter()
                .map(|mut r| {
                    let embedding = r.embedding.take().unwrap_or_default();
                    (Chunk::from(r), embedding)
                })
                .unzip()
        } else {
            let missing = records.iter().filter(|r| r.embedding.is_none()).count();
            tracing::info!(
                "{} of {} records lack embeddings, encoding the whole corpus",
                missing,
                records.len()
            );

            let chunks: Vec<Chunk> = records.into_iter().map(Chunk::from).collect();
            let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
            let embeddings = embedder.encode(&texts).await?;
            (chunks, embeddings)
        };

        Self::new(chunks, embeddings, precomputed)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunk(&self, ordinal: usize) -> Option<&Chunk> {
        self.chunks.get(ordinal)
    }

    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn precomputed(&self) -> bool {
        self.precomputed
    }

    pub fn stats(&self) -> CorpusStats {
        let titles: HashSet<&str> = self
            .chunks
            .iter()
            .map(|c| c.source_title.as_str())
            .collect();

        CorpusStats {
            chunk_count: self.chunks.len(),
            dimension: self.dimension,
            distinct_sources: titles.len(),
            precomputed_embeddings: self.precomputed,
        }
    }
}

/// Read and parse corpus records from disk.
pub fn read_records(path: &Path) -> AppResult<Vec<CorpusRecord>> {
    if !path.exists() {
        return Err(AppError::CorpusLoad(format!(
            "Corpus resource not found: {:?}",
            path
        )));
    }

    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::CorpusLoad(format!("Failed to read corpus {:?}: {}", path, e))
    })?;

    let is_jsonl = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"));

    let records = if is_jsonl {
        parse_json_lines(&contents)?
    } else {
        serde_json::from_str::<Vec<CorpusRecord>>(&contents).map_err(|e| {
            AppError::CorpusLoad(format!("Malformed corpus {:?}: {}", path, e))
        })?
    };

    if records.is_empty() {
        return Err(AppError::CorpusLoad(format!("Corpus {:?} is empty", path)));
    }

    tracing::debug!("Read {} corpus records from {:?}", records.len(), path);
    Ok(records)
}

fn parse_json_lines(contents: &str) -> AppResult<Vec<CorpusRecord>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<CorpusRecord>(line).map_err(|e| {
                AppError::CorpusLoad(format!("Malformed corpus record on line {}: {}", i + 1, e))
            })
        })
        .collect()
}

/// Process-lifetime owner of the corpus index.
///
/// The first `load()` reads and embeds the corpus; concurrent first
/// callers wait on the same initialization and every caller receives the
/// same `Arc<CorpusIndex>`. A failed load leaves the store empty so a
/// later call retries.
pub struct CorpusStore {
    path: PathBuf,
    embedder: Arc<Embedder>,
    index: OnceCell<Arc<CorpusIndex>>,
}

impl CorpusStore {
    pub fn new(path: impl Into<PathBuf>, embedder: Arc<Embedder>) -> Self {
        Self {
            path: path.into(),
            embedder,
            index: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.index.initialized()
    }

    pub async fn load(&self) -> AppResult<Arc<CorpusIndex>> {
        let index = self
            .index
            .get_or_try_init(|| async {
                tracing::info!("Loading corpus from {:?}", self.path);
                let records = read_records(&self.path)?;
                let index = CorpusIndex::from_records(records, &self.embedder).await?;
                tracing::info!(
                    "Corpus ready: {} chunks, dimension {}",
                    index.len(),
                    index.dimension()
                );
                Ok::<_, AppError>(Arc::new(index))
            })
            .await?;

        Ok(Arc::clone(index))
    }
}
