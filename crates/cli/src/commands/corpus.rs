//! Corpus command handler.

use clap::{Args, Subcommand};
use coach_core::{config::AppConfig, AppError, AppResult};
use coach_knowledge::{CorpusStore, Embedder};
use std::sync::Arc;

/// Inspect the corpus
#[derive(Args, Debug)]
pub struct CorpusCommand {
    #[command(subcommand)]
    pub action: CorpusAction,
}

#[derive(Subcommand, Debug)]
pub enum CorpusAction {
    /// Load the corpus and show its size and dimension
    Stats(CorpusStatsCommand),
}

#[derive(Args, Debug)]
pub struct CorpusStatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CorpusCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.action {
            CorpusAction::Stats(cmd) => cmd.execute(config).await,
        }
    }
}

impl CorpusStatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let path = config.resolved_corpus_path();
        tracing::info!("Loading corpus stats from {:?}", path);

        let embedding_key = config.resolve_embedding_api_key();
        let embedder =
            Arc::new(Embedder::from_settings(&config.embedding, embedding_key.as_deref()).await?);
        let store = CorpusStore::new(path, embedder);
        let index = store.load().await?;
        let stats = index.stats();

        if self.json {
            let json = serde_json::to_string_pretty(&stats)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("Corpus: {}", store.path().display());
            println!("  Chunks:            {}", stats.chunk_count);
            println!("  Distinct sources:  {}", stats.distinct_sources);
            println!("  Dimension:         {}", stats.dimension);
            println!(
                "  Embeddings:        {}",
                if stats.precomputed_embeddings {
                    "precomputed"
                } else {
                    "encoded at load"
                }
            );
        }

        Ok(())
    }
}
