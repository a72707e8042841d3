//! Content commands: generate, search and translate.
//!
//! Each command is one logical LLM call through the key-rotating client.
//! A missing or blank completion is reported as `EmptyOutput` so callers
//! leave their stored content unchanged.

use tracing::info;

use crate::content::prompts::{language_name, translate_system, SEARCH_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::LlmClient;

/// Generates content for a free-form prompt.
pub async fn generate_content(llm: &mut LlmClient, prompt: &str) -> Result<String, AppError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }

    info!("Generating content ({} chars of prompt)", prompt.len());
    let text = llm.call(None, prompt).await?;
    let content = require_output(text)?;
    info!("Generated {} chars", content.len());
    Ok(content)
}

/// Asks the model for content ideas. Returns the non-blank lines of the answer.
pub async fn search_content(llm: &mut LlmClient, query: &str) -> Result<Vec<String>, AppError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("search query cannot be empty".to_string()));
    }

    let text = llm.call(Some(SEARCH_SYSTEM), query).await?;
    let content = require_output(text)?;
    let recommendations: Vec<String> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect();
    info!("Search returned {} recommendations", recommendations.len());
    Ok(recommendations)
}

/// Translates `content` into the language identified by `language_code`.
pub async fn translate_content(
    llm: &mut LlmClient,
    content: &str,
    language_code: &str,
) -> Result<String, AppError> {
    if content.trim().is_empty() {
        return Err(AppError::Validation("there is no content to translate".to_string()));
    }
    let language = language_name(language_code).ok_or_else(|| {
        AppError::Validation(format!("unsupported language code '{language_code}'"))
    })?;

    info!("Translating {} chars to {language}", content.len());
    let text = llm.call(Some(&translate_system(language)), content).await?;
    require_output(text)
}

fn require_output(text: Option<String>) -> Result<String, AppError> {
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(AppError::EmptyOutput),
    }
}
