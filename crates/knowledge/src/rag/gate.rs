//! Sufficiency gate: decides whether retrieved context can answer a question.
//!
//! Two checks run in order and short-circuit:
//! 1. The trimmed context must hold at least `min_context_chars` characters.
//!    Shorter context is insufficient and no model call is made.
//! 2. A language model judges relevance and must reply with the relevant
//!    sentinel. Any other reply is treated as not relevant.
//!
//! A failed model call is an error, never a verdict.

use coach_core::config::GateSettings;
use coach_core::{AppError, AppResult};
use coach_llm::{LlmClient, LlmRequest};
use coach_prompt::{build_prompt, load_prompt, PromptDefinition, RELEVANCE_PROMPT_ID};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Parsed relevance judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelevanceVerdict {
    Relevant,
    NotRelevant,
}

impl RelevanceVerdict {
    /// Parse a model reply against the relevant sentinel.
    ///
    /// Whitespace is trimmed and case is folded before an exact comparison.
    /// Anything that is not exactly the sentinel, including empty or chatty
    /// replies, is `NotRelevant`.
    pub fn parse(reply: &str, relevant_token: &str) -> Self {
        if reply.trim().to_lowercase() == relevant_token.trim().to_lowercase() {
            Self::Relevant
        } else {
            Self::NotRelevant
        }
    }
}

/// Outcome of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Context passed both checks
    Sufficient,

    /// Context was below the length threshold; the model was not consulted
    ContextTooShort { chars: usize },

    /// The model judged the context not relevant
    JudgedNotRelevant,
}

impl GateDecision {
    pub fn is_sufficient(&self) -> bool {
        matches!(self, Self::Sufficient)
    }
}

impl fmt::Display for GateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sufficient => write!(f, "sufficient"),
            Self::ContextTooShort { chars } => write!(f, "context too short ({} chars)", chars),
            Self::JudgedNotRelevant => write!(f, "judged not relevant"),
        }
    }
}

/// Two-stage sufficiency check over retrieved context.
pub struct SufficiencyGate {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    settings: GateSettings,
}

impl SufficiencyGate {
    pub fn new(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        prompt: PromptDefinition,
        settings: GateSettings,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
            settings,
        }
    }

    /// Create a gate using the workspace's relevance prompt.
    pub fn load(
        workspace: &Path,
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        settings: GateSettings,
    ) -> AppResult<Self> {
        let prompt = load_prompt(workspace, RELEVANCE_PROMPT_ID)?;
        Ok(Self::new(client, model, prompt, settings))
    }

    /// Evaluate retrieved context for a question.
    pub async fn evaluate(&self, question: &str, context: &str) -> AppResult<GateDecision> {
        let chars = context.trim().chars().count();
        if chars < self.settings.min_context_chars {
            tracing::info!(
                "Context too short ({} < {} chars), skipping relevance check",
                chars,
                self.settings.min_context_chars
            );
            return Ok(GateDecision::ContextTooShort { chars });
        }

        let verdict = self.judge_relevance(question, context).await?;
        let decision = match verdict {
            RelevanceVerdict::Relevant => GateDecision::Sufficient,
            RelevanceVerdict::NotRelevant => GateDecision::JudgedNotRelevant,
        };

        tracing::info!("Sufficiency gate: {}", decision);
        Ok(decision)
    }

    async fn judge_relevance(&self, question: &str, context: &str) -> AppResult<RelevanceVerdict> {
        let mut variables = HashMap::new();
        variables.insert("topic".to_string(), self.settings.topic.clone());
        variables.insert("question".to_string(), question.to_string());
        variables.insert("context".to_string(), context.to_string());

        let built = build_prompt(&self.prompt, variables)?;
        let mut request = LlmRequest::new(built.user, &self.model).with_temperature(0.0);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        tracing::debug!("Relevance prompt length: {} chars", request.prompt.len());

        let response = self.client.complete(&request).await.map_err(|e| match e {
            AppError::Llm(_) => e,
            other => AppError::Llm(format!("Relevance check failed: {}", other)),
        })?;

        let verdict = RelevanceVerdict::parse(&response.content, &self.settings.relevant_token);
        tracing::debug!("Relevance reply {:?} parsed as {:?}", response.content, verdict);

        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::mocks::MockLlmClient;
    use tempfile::TempDir;

    fn gate(client: Arc<MockLlmClient>) -> SufficiencyGate {
        let workspace = TempDir::new().unwrap();
        SufficiencyGate::load(workspace.path(), client, "gpt-4o", GateSettings::default()).unwrap()
    }

    fn long_context() -> String {
        "Liderlik, ekibin ihtiyaçlarını anlamayı ve empatiyle hareket etmeyi gerektirir. "
            .repeat(2)
    }

    #[test]
    fn test_parse_sentinel() {
        assert_eq!(RelevanceVerdict::parse("evet", "evet"), RelevanceVerdict::Relevant);
        assert_eq!(RelevanceVerdict::parse("  EVET\n", "evet"), RelevanceVerdict::Relevant);
        assert_eq!(RelevanceVerdict::parse("Evet", "EVET"), RelevanceVerdict::Relevant);
    }

    #[test]
    fn test_parse_fails_closed() {
        for reply in ["HAYIR", "", "Evet.", "evet, ilgili", "yes", "e v e t"] {
            assert_eq!(
                RelevanceVerdict::parse(reply, "evet"),
                RelevanceVerdict::NotRelevant,
                "reply {:?}",
                reply
            );
        }
    }

    #[tokio::test]
    async fn test_short_context_never_calls_model() {
        let client = Arc::new(MockLlmClient::new().reply("evet"));
        let gate = gate(client.clone());

        let padded = format!("   {}   ", "a".repeat(99));
        let decision = gate.evaluate("Soru?", &padded).await.unwrap();

        assert_eq!(decision, GateDecision::ContextTooShort { chars: 99 });
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_threshold_counts_characters_not_bytes() {
        let client = Arc::new(MockLlmClient::new().reply("evet"));
        let gate = gate(client.clone());

        // 60 two-byte characters: 120 bytes but only 60 characters.
        let context = "ğ".repeat(60);
        let decision = gate.evaluate("Soru?", &context).await.unwrap();

        assert!(!decision.is_sufficient());
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_relevant_reply_is_sufficient() {
        let client = Arc::new(MockLlmClient::new().reply(" Evet "));
        let gate = gate(client.clone());

        let decision = gate.evaluate("İyi lider kimdir?", &long_context()).await.unwrap();
        assert_eq!(decision, GateDecision::Sufficient);

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].temperature, Some(0.0));
        assert!(requests[0].prompt.contains("Konu: Liderlik Koçluğu"));
        assert!(requests[0].prompt.contains("İyi lider kimdir?"));
        assert!(requests[0].prompt.contains(long_context().as_str()));
    }

    #[tokio::test]
    async fn test_other_reply_is_not_relevant() {
        let client = Arc::new(MockLlmClient::new().reply("Bence evet"));
        let decision = gate(client)
            .evaluate("Soru?", &long_context())
            .await
            .unwrap();
        assert_eq!(decision, GateDecision::JudgedNotRelevant);
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let client = Arc::new(MockLlmClient::new().fail("rate limited"));
        let result = gate(client).evaluate("Soru?", &long_context()).await;
        assert!(matches!(result, Err(AppError::Llm(_))));
    }
}
