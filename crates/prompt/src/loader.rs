//! Prompt loader for built-in and workspace YAML prompt definitions.

use crate::types::{PromptDefinition, PromptListing, PromptOrigin};
use coach_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Relevance check prompt id.
pub const RELEVANCE_PROMPT_ID: &str = "coach.relevance";

/// Corpus-grounded answer prompt id.
pub const LOCAL_ANSWER_PROMPT_ID: &str = "coach.answer.local";

/// Web-grounded answer prompt id.
pub const WEB_ANSWER_PROMPT_ID: &str = "coach.answer.web";

/// Prompt definitions compiled into the binary.
const BUILTIN_PROMPTS: [(&str, &str); 3] = [
    (
        RELEVANCE_PROMPT_ID,
        include_str!("../prompts/coach.relevance.yml"),
    ),
    (
        LOCAL_ANSWER_PROMPT_ID,
        include_str!("../prompts/coach.answer.local.yml"),
    ),
    (
        WEB_ANSWER_PROMPT_ID,
        include_str!("../prompts/coach.answer.web.yml"),
    ),
];

/// Load a prompt definition by ID.
///
/// A file named `<id>.yml` in the workspace's `.coach/prompts/` directory
/// takes precedence over the built-in definition with the same id.
///
/// # Arguments
/// * `workspace_path` - Root workspace directory containing `.coach/`
/// * `prompt_id` - Prompt identifier (e.g., "coach.relevance")
///
/// # Returns
/// A parsed `PromptDefinition` or an error if not found/invalid.
///
/// # Example
/// ```no_run
/// use coach_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "coach.relevance")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));

    let definition = if prompt_file.exists() {
        tracing::debug!("Loading prompt override from: {:?}", prompt_file);

        let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to read prompt file {:?}: {}",
                prompt_file, e
            ))
        })?;

        parse_prompt(&contents, &prompt_file.display().to_string())?
    } else {
        let contents = builtin_source(prompt_id).ok_or_else(|| {
            AppError::Prompt(format!(
                "Prompt '{}' not found (no built-in and no file at {:?})",
                prompt_id, prompt_file
            ))
        })?;

        parse_prompt(contents, "built-in")?
    };

    if definition.id != prompt_id {
        return Err(AppError::Prompt(format!(
            "Prompt file for '{}' declares id '{}'",
            prompt_id, definition.id
        )));
    }

    tracing::debug!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// List every resolvable prompt id with its origin, sorted by id.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<PromptListing>> {
    let mut listings: Vec<PromptListing> = BUILTIN_PROMPTS
        .iter()
        .map(|(id, _)| PromptListing {
            id: id.to_string(),
            origin: PromptOrigin::BuiltIn,
        })
        .collect();

    let dir = prompts_dir(workspace_path);
    if dir.exists() {
        for entry in walkdir::WalkDir::new(&dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("yml") {
                continue;
            }

            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                let origin = PromptOrigin::Workspace(path.to_path_buf());
                match listings.iter_mut().find(|l| l.id == stem) {
                    Some(existing) => existing.origin = origin,
                    None => listings.push(PromptListing {
                        id: stem.to_string(),
                        origin,
                    }),
                }
            }
        }
    }

    listings.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(listings)
}

fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".coach").join("prompts")
}

fn builtin_source(prompt_id: &str) -> Option<&'static str> {
    BUILTIN_PROMPTS
        .iter()
        .find(|(id, _)| *id == prompt_id)
        .map(|(_, source)| *source)
}

fn parse_prompt(contents: &str, origin: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt YAML ({}): {}", origin, e))
    })?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    // Validate API version format (simple check)
    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_override(dir: &Path, id: &str, body: &str) -> PathBuf {
        let prompts_dir = dir.join(".coach/prompts");
        fs::create_dir_all(&prompts_dir).unwrap();

        let file_path = prompts_dir.join(format!("{}.yml", id));
        fs::write(&file_path, body).unwrap();
        file_path
    }

    fn valid_override(id: &str) -> String {
        format!(
            r#"
id: {}
title: "Override"
apiVersion: "1.0"
behavior:
  tone: professional
  style: concise
input:
  required: [question, context]
template: "Q: {{{{question}}}} C: {{{{context}}}}"
output:
  format: markdown
"#,
            id
        )
    }

    #[test]
    fn test_builtins_parse_and_validate() {
        let temp_dir = TempDir::new().unwrap();
        for id in [RELEVANCE_PROMPT_ID, LOCAL_ANSWER_PROMPT_ID, WEB_ANSWER_PROMPT_ID] {
            let prompt = load_prompt(temp_dir.path(), id).unwrap();
            assert_eq!(prompt.id, id);
            assert!(!prompt.input.required.is_empty());
        }
    }

    #[test]
    fn test_relevance_builtin_names_both_sentinels() {
        let temp_dir = TempDir::new().unwrap();
        let prompt = load_prompt(temp_dir.path(), RELEVANCE_PROMPT_ID).unwrap();
        assert!(prompt.template.contains("'EVET'"));
        assert!(prompt.template.contains("'HAYIR'"));
        assert_eq!(prompt.output.format, "sentinel");
    }

    #[test]
    fn test_relevance_builtin_renders_exact_instruction() {
        let temp_dir = TempDir::new().unwrap();
        let prompt = load_prompt(temp_dir.path(), RELEVANCE_PROMPT_ID).unwrap();

        let mut variables = std::collections::HashMap::new();
        variables.insert("topic".to_string(), "Liderlik Koçluğu".to_string());
        variables.insert("question".to_string(), "Lider kimdir?".to_string());
        variables.insert("context".to_string(), "Empati".to_string());
        let built = crate::build_prompt(&prompt, variables).unwrap();

        assert_eq!(
            built.user,
            "Konu: Liderlik Koçluğu\n\
             Soru: Lider kimdir?\n\
             Bilgi: Empati\n\n\
             Konu liderlik veya Liderlik koçluğu değilse veya bilgiyle en azından makul bir bağ kurulamıyorsa sadece 'HAYIR' yaz.\n\
             Eğer liderlik koçluğu ile ilgiliyse veya bilgi soruya biraz bile bir şekilde yardımcı oluyorsa sadece 'EVET' yaz.\n\
             Başka hiçbir şey yazma."
        );
    }

    #[test]
    fn test_workspace_override_wins() {
        let temp_dir = TempDir::new().unwrap();
        write_override(
            temp_dir.path(),
            LOCAL_ANSWER_PROMPT_ID,
            &valid_override(LOCAL_ANSWER_PROMPT_ID),
        );

        let prompt = load_prompt(temp_dir.path(), LOCAL_ANSWER_PROMPT_ID).unwrap();
        assert_eq!(prompt.title, "Override");
    }

    #[test]
    fn test_load_nonexistent_prompt() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_prompt(temp_dir.path(), "nonexistent");
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        write_override(temp_dir.path(), "invalid", "invalid: yaml: content:");

        let result = load_prompt(temp_dir.path(), "invalid");
        assert!(result.is_err());
    }

    #[test]
    fn test_override_with_mismatched_id_rejected() {
        let temp_dir = TempDir::new().unwrap();
        write_override(
            temp_dir.path(),
            WEB_ANSWER_PROMPT_ID,
            &valid_override("something.else"),
        );

        let result = load_prompt(temp_dir.path(), WEB_ANSWER_PROMPT_ID);
        assert!(result.unwrap_err().to_string().contains("declares id"));
    }

    #[test]
    fn test_list_prompts_merges_overrides() {
        let temp_dir = TempDir::new().unwrap();
        write_override(
            temp_dir.path(),
            RELEVANCE_PROMPT_ID,
            &valid_override(RELEVANCE_PROMPT_ID),
        );
        write_override(temp_dir.path(), "custom.extra", &valid_override("custom.extra"));

        let prompts = list_prompts(temp_dir.path()).unwrap();
        assert_eq!(prompts.len(), 4);

        let relevance = prompts.iter().find(|p| p.id == RELEVANCE_PROMPT_ID).unwrap();
        assert!(matches!(relevance.origin, PromptOrigin::Workspace(_)));

        let local = prompts.iter().find(|p| p.id == LOCAL_ANSWER_PROMPT_ID).unwrap();
        assert_eq!(local.origin, PromptOrigin::BuiltIn);
    }
}
