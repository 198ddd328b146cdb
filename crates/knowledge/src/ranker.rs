//! Cosine similarity ranking over the corpus embedding matrix.

use crate::corpus::CorpusIndex;
use crate::types::{RankedChunk, RetrievalResult};
use coach_core::{AppError, AppResult};

/// Number of chunks selected per question.
pub const DEFAULT_TOP_K: usize = 3;

/// Cosine similarity of two equal-length vectors.
///
/// A zero vector on either side scores 0. The result is clamped to
/// [-1, 1] to absorb rounding.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0) as f32
}

/// Select the `k` chunks most similar to `query`.
///
/// Scores are sorted descending with a stable sort, so equal scores keep
/// the lower ordinal first. `context_text` joins the selected texts with
/// newlines in ranked order.
pub fn rank(query: &[f32], corpus: &CorpusIndex, k: usize) -> AppResult<RetrievalResult> {
    if query.len() != corpus.dimension() {
        return Err(AppError::Embedding(format!(
            "Query embedding has {} dimensions, corpus has {}",
            query.len(),
            corpus.dimension()
        )));
    }

    let mut scored: Vec<(usize, f32)> = corpus
        .embeddings()
        .iter()
        .map(|row| cosine_similarity(query, row))
        .enumerate()
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(k);

    let selected: Vec<RankedChunk> = scored
        .into_iter()
        .filter_map(|(ordinal, score)| {
            corpus.chunk(ordinal).map(|chunk| RankedChunk {
                ordinal,
                score,
                chunk: chunk.clone(),
            })
        })
        .collect();

    let context_text = selected
        .iter()
        .map(|r| r.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    tracing::debug!(
        "Ranked {} chunks, selected ordinals {:?} with scores {:?}",
        corpus.len(),
        selected.iter().map(|r| r.ordinal).collect::<Vec<_>>(),
        selected.iter().map(|r| r.score).collect::<Vec<_>>()
    );

    Ok(RetrievalResult {
        context_text,
        selected,
    })
}
