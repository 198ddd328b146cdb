//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use coach_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// This function:
/// 1. Checks that every variable listed in `input.required` is present
/// 2. Renders the user template (and optional system template) with Handlebars
/// 3. Returns a `BuiltPrompt` ready for LLM execution
///
/// Values are inserted verbatim: HTML escaping is disabled.
///
/// # Example
/// ```no_run
/// use coach_prompt::{build_prompt, load_prompt};
/// use std::collections::HashMap;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = load_prompt(Path::new("."), "coach.answer.local")?;
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "İyi bir lider nasıl olur?".to_string());
/// vars.insert("context".to_string(), "Empati önemlidir.".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let missing: Vec<&str> = definition
        .input
        .required
        .iter()
        .filter(|name| !variables.contains_key(name.as_str()))
        .map(String::as_str)
        .collect();

    if !missing.is_empty() {
        return Err(AppError::Prompt(format!(
            "Prompt '{}' is missing required variables: {}",
            definition.id,
            missing.join(", ")
        )));
    }

    let user = render_template(&definition.template, &variables)?;
    let system = definition
        .system
        .as_deref()
        .map(|template| render_template(template, &variables))
        .transpose()?;

    Ok(BuiltPrompt::new(system, user, definition.id.clone(), variables))
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PromptBehavior, PromptInputSpec, PromptOutputSpec};

    fn create_test_definition(system: Option<&str>) -> PromptDefinition {
        PromptDefinition {
            id: "test.prompt".to_string(),
            title: "Test".to_string(),
            api_version: "1.0".to_string(),
            created_by: "test".to_string(),
            behavior: PromptBehavior {
                tone: "professional".to_string(),
                style: "concise".to_string(),
            },
            input: PromptInputSpec {
                required: vec!["question".to_string()],
            },
            system: system.map(str::to_string),
            template: "Soru: {{question}}".to_string(),
            output: PromptOutputSpec {
                format: "markdown".to_string(),
            },
        }
    }

    #[test]
    fn test_render_simple_template() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Hello, world!".to_string());

        let result = render_template("Soru: {{question}}", &vars).unwrap();
        assert_eq!(result, "Soru: Hello, world!");
    }

    #[test]
    fn test_values_are_not_html_escaped() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "A & B <ekip>".to_string());

        let result = render_template("{{question}}", &vars).unwrap();
        assert_eq!(result, "A & B <ekip>");
    }

    #[test]
    fn test_build_prompt_renders_user_and_system() {
        let def = create_test_definition(Some("Konu: {{question}}"));
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Liderlik".to_string());

        let built = build_prompt(&def, vars).unwrap();
        assert_eq!(built.user, "Soru: Liderlik");
        assert_eq!(built.system.as_deref(), Some("Konu: Liderlik"));
        assert_eq!(built.metadata.source_prompt_id, "test.prompt");
    }

    #[test]
    fn test_build_prompt_missing_required_variable() {
        let def = create_test_definition(None);
        let result = build_prompt(&def, HashMap::new());

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::Prompt(_)));
        assert!(err.to_string().contains("question"));
    }

    #[test]
    fn test_context_with_newlines_is_verbatim() {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "birinci\nikinci".to_string());

        let result = render_template("Bilgi: {{context}}", &vars).unwrap();
        assert_eq!(result, "Bilgi: birinci\nikinci");
    }
}
