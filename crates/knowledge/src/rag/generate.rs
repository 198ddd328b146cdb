//! Grounded answer generation.

use coach_core::AppResult;
use coach_llm::{LlmClient, LlmRequest};
use coach_prompt::{
    build_prompt, load_prompt, BuiltPrompt, PromptDefinition, LOCAL_ANSWER_PROMPT_ID,
    WEB_ANSWER_PROMPT_ID,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Produces answers grounded in corpus passages or web results.
///
/// The model's reply is returned as-is. Failures are not retried.
pub struct AnswerGenerator {
    client: Arc<dyn LlmClient>,
    model: String,
    local_prompt: PromptDefinition,
    web_prompt: PromptDefinition,
}

impl AnswerGenerator {
    pub fn new(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        local_prompt: PromptDefinition,
        web_prompt: PromptDefinition,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            local_prompt,
            web_prompt,
        }
    }

    /// Create a generator using the workspace's answer prompts.
    pub fn load(
        workspace: &Path,
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
    ) -> AppResult<Self> {
        let local_prompt = load_prompt(workspace, LOCAL_ANSWER_PROMPT_ID)?;
        let web_prompt = load_prompt(workspace, WEB_ANSWER_PROMPT_ID)?;
        Ok(Self::new(client, model, local_prompt, web_prompt))
    }

    /// Answer from retrieved corpus context.
    pub async fn generate(&self, question: &str, context: &str) -> AppResult<String> {
        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.to_string());
        variables.insert("context".to_string(), context.to_string());

        let built = build_prompt(&self.local_prompt, variables)?;
        self.complete(built).await
    }

    /// Answer from web search context, telling the model the current year.
    pub async fn generate_from_web(
        &self,
        question: &str,
        web_results: &str,
        current_year: i32,
    ) -> AppResult<String> {
        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.to_string());
        variables.insert("web_results".to_string(), web_results.to_string());
        variables.insert("current_year".to_string(), current_year.to_string());

        let built = build_prompt(&self.web_prompt, variables)?;
        self.complete(built).await
    }

    async fn complete(&self, built: BuiltPrompt) -> AppResult<String> {
        tracing::debug!(
            "Generating answer with prompt '{}' ({} chars)",
            built.metadata.source_prompt_id,
            built.user.len()
        );

        let mut request = LlmRequest::new(built.user, &self.model).with_temperature(0.0);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        let response = self.client.complete(&request).await?;
        tracing::info!(
            "Answer generated by {} ({} completion tokens)",
            self.client.provider_name(),
            response.usage.completion_tokens
        );

        Ok(response.content)
    }
}
