//! Prompt system for the coach workspace.
//!
//! This crate provides structured prompt management with:
//! - Built-in YAML prompt definitions for relevance checks and answers
//! - Workspace overrides under `.coach/prompts/`
//! - Handlebars template rendering

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{
    list_prompts, load_prompt, LOCAL_ANSWER_PROMPT_ID, RELEVANCE_PROMPT_ID, WEB_ANSWER_PROMPT_ID,
};
pub use types::{
    BuiltPrompt, BuiltPromptMetadata, PromptBehavior, PromptDefinition, PromptInputSpec,
    PromptListing, PromptOrigin, PromptOutputSpec,
};
