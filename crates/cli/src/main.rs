//! Coach CLI
//!
//! Main entry point for the `coach` command-line tool.
//! Answers leadership-coaching questions from a local corpus, falling
//! back to web search when the corpus cannot answer.

mod commands;

use clap::{Parser, Subcommand};
use coach_core::{config::AppConfig, logging, AppResult};
use commands::{AskCommand, CorpusCommand, PromptsCommand};
use std::path::PathBuf;
use tracing::Instrument;

/// Coach CLI - leadership-coaching answers grounded in a local corpus
#[derive(Parser, Debug)]
#[command(name = "coach")]
#[command(about = "Leadership-coaching answers grounded in a local corpus", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "COACH_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "COACH_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (openai, ollama)
    #[arg(short, long, global = true, env = "COACH_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "COACH_MODEL")]
    model: Option<String>,

    /// Corpus file (JSON array or .jsonl)
    #[arg(long, global = true, env = "COACH_CORPUS")]
    corpus: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a question (or a file of questions)
    Ask(AskCommand),

    /// Inspect the corpus
    Corpus(CorpusCommand),

    /// List available prompts
    Prompts(PromptsCommand),
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Ask(_) => "ask",
            Commands::Corpus(_) => "corpus",
            Commands::Prompts(_) => "prompts",
        }
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_with(cli.workspace, cli.config)?.with_overrides(
        cli.provider,
        cli.model,
        cli.corpus,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Coach CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {} (model: {})", config.provider, config.model);
    tracing::debug!("Corpus: {:?}", config.resolved_corpus_path());

    let span = tracing::info_span!("command", name = cli.command.name());
    let result = run(cli.command, &config).instrument(span).await;

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

async fn run(command: Commands, config: &AppConfig) -> AppResult<()> {
    match command {
        Commands::Ask(cmd) => cmd.execute(config).await,
        Commands::Corpus(cmd) => cmd.execute(config).await,
        Commands::Prompts(cmd) => cmd.execute(config),
    }
}
