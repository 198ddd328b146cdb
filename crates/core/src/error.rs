//! Error types for the coach workspace.
//!
//! This module defines a unified error enum covering every failure the
//! question-answering pipeline can surface: corpus loading, embedding,
//! language model and search service failures, plus configuration,
//! prompt and I/O errors.

use thiserror::Error;

/// Unified error type for the coach workspace.
///
/// All fallible functions return `Result<T, AppError>`.
/// Question-scoped failures are never converted into a default answer.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Corpus resource missing, malformed or empty
    #[error("Corpus load error: {0}")]
    CorpusLoad(String),

    /// Embedding service failures
    #[error("Embedding service error: {0}")]
    Embedding(String),

    /// Language model failures (generation and relevance checks)
    #[error("Language model error: {0}")]
    Llm(String),

    /// Web search provider failures
    #[error("Search service error: {0}")]
    Search(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Rejected caller input
    #[error("Invalid input: {0}")]
    Input(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_the_failing_service() {
        let err = AppError::Search("quota exceeded".to_string());
        assert_eq!(err.to_string(), "Search service error: quota exceeded");

        let err = AppError::CorpusLoad("empty corpus".to_string());
        assert!(err.to_string().starts_with("Corpus load error"));
    }

    #[test]
    fn test_json_error_converts_to_serialization() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: AppError = parse_err.into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
