//! Configuration management for the coach CLI.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Environment variables
//! - Command-line flags
//! - Config files (.coach/config.yaml)
//!
//! The configuration is workspace-centric: the corpus path and prompt
//! overrides are resolved relative to the workspace root.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the language model factory knows how to build.
pub const KNOWN_LLM_PROVIDERS: [&str; 2] = ["openai", "ollama"];

/// Providers the embedding factory knows how to build.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 3] = ["ollama", "openai", "trigram"];

/// Providers the search factory knows how to build.
pub const KNOWN_SEARCH_PROVIDERS: [&str; 1] = ["google"];

/// Main application configuration.
///
/// This struct holds all global configuration options that affect
/// CLI behavior across commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .coach/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Language model provider ("openai" or "ollama")
    pub provider: String,

    /// Language model identifier
    pub model: String,

    /// API key for the language model provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Embedding service settings
    pub embedding: EmbeddingSettings,

    /// Web search settings
    pub search: SearchSettings,

    /// Corpus resource path (relative paths resolve against the workspace)
    pub corpus_path: PathBuf,

    /// Sufficiency gate settings
    pub gate: GateSettings,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

/// Embedding service settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingSettings {
    /// Provider name: "ollama", "openai", "trigram"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Optional endpoint override
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Environment variable holding the API key (openai only)
    #[serde(rename = "apiKeyEnv", default)]
    pub api_key_env: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "paraphrase-multilingual".to_string(),
            dimensions: 768,
            endpoint: None,
            api_key_env: None,
        }
    }
}

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchSettings {
    /// Provider name ("google")
    pub provider: String,

    /// Environment variable holding the search API key
    #[serde(rename = "apiKeyEnv")]
    pub api_key_env: String,

    /// Environment variable holding the programmable search engine id
    #[serde(rename = "engineIdEnv")]
    pub engine_id_env: String,

    /// Optional endpoint override
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Number of results requested per fallback query
    #[serde(rename = "numResults", default = "default_num_results")]
    pub num_results: u32,
}

fn default_num_results() -> u32 {
    3
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            provider: "google".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            engine_id_env: "GOOGLE_CSE_ID".to_string(),
            endpoint: None,
            num_results: default_num_results(),
        }
    }
}

/// Sufficiency gate settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GateSettings {
    /// Topic domain named in the relevance prompt
    #[serde(default = "default_topic")]
    pub topic: String,

    /// Minimum trimmed context length, in characters
    #[serde(rename = "minContextChars", default = "default_min_context_chars")]
    pub min_context_chars: usize,

    /// Sentinel the relevance model answers with when context is relevant
    #[serde(rename = "relevantToken", default = "default_relevant_token")]
    pub relevant_token: String,
}

fn default_topic() -> String {
    "Liderlik Koçluğu".to_string()
}

fn default_min_context_chars() -> usize {
    100
}

fn default_relevant_token() -> String {
    "evet".to_string()
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            min_context_chars: default_min_context_chars(),
            relevant_token: default_relevant_token(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    embedding: Option<EmbeddingSettings>,
    search: Option<SearchSettings>,
    corpus: Option<CorpusConfig>,
    gate: Option<GateSettings>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CorpusConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            embedding: EmbeddingSettings::default(),
            search: SearchSettings::default(),
            corpus_path: PathBuf::from("turkish_chunks.json"),
            gate: GateSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `COACH_WORKSPACE`: Override workspace path
    /// - `COACH_CONFIG`: Path to config file
    /// - `COACH_PROVIDER`: LLM provider
    /// - `COACH_MODEL`: Model identifier
    /// - `COACH_API_KEY`: API key
    /// - `COACH_CORPUS`: Corpus resource path
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use coach_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Corpus: {:?}", config.resolved_corpus_path());
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Load configuration with an explicit workspace and config file.
    ///
    /// Both arguments take precedence over `COACH_WORKSPACE` and
    /// `COACH_CONFIG` and decide which YAML file is merged. An explicit
    /// workspace also wins over `workspace.path` in that file. A config file
    /// that was named explicitly must exist.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        let workspace =
            workspace.or_else(|| std::env::var("COACH_WORKSPACE").ok().map(PathBuf::from));
        if let Some(ref ws) = workspace {
            config.workspace = ws.clone();
        }

        config.config_file =
            config_file.or_else(|| std::env::var("COACH_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) if !cf.exists() => {
                return Err(AppError::Config(format!("Config file not found: {:?}", cf)));
            }
            Some(ref cf) => cf.clone(),
            None => config.coach_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        if let Some(ws) = workspace {
            config.workspace = ws;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("COACH_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("COACH_MODEL") {
            config.model = model;
        }

        if let Ok(corpus) = std::env::var("COACH_CORPUS") {
            config.corpus_path = PathBuf::from(corpus);
        }

        config.api_key = std::env::var("COACH_API_KEY").ok();
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(ws) = config_file.workspace {
            if let Some(path) = ws.path {
                result.workspace = PathBuf::from(path);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = match provider_config {
                    ProviderConfig::OpenAI { model, .. } => model.clone(),
                    ProviderConfig::Ollama { model, .. } => model.clone(),
                };
            }

            result.llm = Some(llm);
        }

        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }

        if let Some(search) = config_file.search {
            result.search = search;
        }

        if let Some(corpus) = config_file.corpus {
            if let Some(path) = corpus.path {
                result.corpus_path = PathBuf::from(path);
            }
        }

        if let Some(gate) = config_file.gate {
            result.gate = gate;
        }

        tracing::debug!("Merged configuration from {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// This method merges command-line flags with the loaded configuration,
    /// giving precedence to CLI flags over environment variables. Workspace
    /// and config file flags go to [`AppConfig::load_with`] instead, since
    /// they decide which YAML file is read.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        corpus: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(corpus) = corpus {
            self.corpus_path = corpus;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .coach directory.
    pub fn coach_dir(&self) -> PathBuf {
        self.workspace.join(".coach")
    }

    /// Corpus path, resolved against the workspace when relative.
    pub fn resolved_corpus_path(&self) -> PathBuf {
        if self.corpus_path.is_absolute() {
            self.corpus_path.clone()
        } else {
            self.workspace.join(&self.corpus_path)
        }
    }

    /// Get a provider configuration by name.
    pub fn get_provider_config(&self, provider: &str) -> Option<ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider).cloned())
    }

    /// Resolve the language model endpoint for a provider, if configured.
    pub fn resolve_endpoint(&self, provider: &str) -> Option<String> {
        match self.get_provider_config(provider)? {
            ProviderConfig::OpenAI { endpoint, .. } => endpoint,
            ProviderConfig::Ollama { endpoint, .. } => Some(endpoint),
        }
    }

    /// Request timeout in seconds for a provider, if configured (Ollama only).
    pub fn resolve_timeout(&self, provider: &str) -> Option<u64> {
        match self.get_provider_config(provider)? {
            ProviderConfig::Ollama { timeout, .. } => timeout,
            ProviderConfig::OpenAI { .. } => None,
        }
    }

    /// Resolve the language model API key.
    ///
    /// Order: `COACH_API_KEY`, then the provider's `apiKeyEnv`, then
    /// `OPENAI_API_KEY` for the openai provider.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        if let Some(ProviderConfig::OpenAI { api_key_env, .. }) = self.get_provider_config(provider)
        {
            return std::env::var(&api_key_env).ok();
        }

        if provider.eq_ignore_ascii_case("openai") {
            return std::env::var("OPENAI_API_KEY").ok();
        }

        None
    }

    /// Resolve the embedding API key from its configured environment variable.
    pub fn resolve_embedding_api_key(&self) -> Option<String> {
        let env_var = self
            .embedding
            .api_key_env
            .clone()
            .unwrap_or_else(|| "OPENAI_API_KEY".to_string());
        std::env::var(env_var).ok()
    }

    /// Resolve the search API key and engine id from the environment.
    pub fn resolve_search_credentials(&self) -> (Option<String>, Option<String>) {
        (
            std::env::var(&self.search.api_key_env).ok(),
            std::env::var(&self.search.engine_id_env).ok(),
        )
    }

    /// Validate configuration before building a question-answering pipeline.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.to_lowercase();
        if !KNOWN_LLM_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_LLM_PROVIDERS.join(", ")
            )));
        }

        if provider == "openai" && self.resolve_api_key(&provider).is_none() {
            return Err(AppError::Config(
                "API key not found for provider 'openai' (set COACH_API_KEY or OPENAI_API_KEY)"
                    .to_string(),
            ));
        }

        let embedding_provider = self.embedding.provider.to_lowercase();
        if !KNOWN_EMBEDDING_PROVIDERS.contains(&embedding_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        if embedding_provider == "openai" && self.resolve_embedding_api_key().is_none() {
            return Err(AppError::Config(
                "API key not found for embedding provider 'openai'".to_string(),
            ));
        }

        if !KNOWN_SEARCH_PROVIDERS.contains(&self.search.provider.to_lowercase().as_str()) {
            return Err(AppError::Config(format!(
                "Unknown search provider: {}. Supported: {}",
                self.search.provider,
                KNOWN_SEARCH_PROVIDERS.join(", ")
            )));
        }

        let (search_key, engine_id) = self.resolve_search_credentials();
        if search_key.is_none() {
            return Err(AppError::Config(format!(
                "Search API key not found in environment variable: {}",
                self.search.api_key_env
            )));
        }
        if engine_id.is_none() {
            return Err(AppError::Config(format!(
                "Search engine id not found in environment variable: {}",
                self.search.engine_id_env
            )));
        }

        Ok(())
    }
}
