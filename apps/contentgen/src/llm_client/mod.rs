/// LLM Client: the single point of entry for all completion calls in contentgen.
///
/// ARCHITECTURAL RULE: No other module may call the completion API directly.
/// All LLM interactions MUST go through this module, so every call is
/// dispatched through the key pool.
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

pub mod dispatcher;
pub mod key_pool;
pub mod transport;

use dispatcher::Dispatcher;
use key_pool::KeyPool;
use transport::{CompletionTransport, HttpTransport};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No API keys configured")]
    NoCredentials,

    #[error("All {attempts} API keys are rate limited")]
    ExhaustedPool { attempts: usize },
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Content of the first choice. `None` means the service produced no output.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Sampling parameters shared by every call of a session.
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// The single LLM client used by every command.
/// Wraps the chat-completions API with key rotation.
pub struct LlmClient {
    dispatcher: Dispatcher,
    transport: Arc<dyn CompletionTransport>,
    settings: CompletionSettings,
}

impl LlmClient {
    pub fn new(
        pool: KeyPool,
        transport: Arc<dyn CompletionTransport>,
        settings: CompletionSettings,
    ) -> Self {
        Self {
            dispatcher: Dispatcher::new(pool),
            transport,
            settings,
        }
    }

    /// Builds the production client: HTTP transport plus the configured key pool.
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let transport = HttpTransport::new(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(Self::new(
            KeyPool::new(config.api_keys.iter().cloned()),
            Arc::new(transport),
            CompletionSettings {
                model: config.model.clone(),
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            },
        ))
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    pub fn key_count(&self) -> usize {
        self.dispatcher.pool().len()
    }

    #[cfg(test)]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Sends one logical completion request, rotating keys on 429.
    ///
    /// Returns `Ok(None)` when the service answered but produced no content.
    pub async fn call(&mut self, system: Option<&str>, user: &str) -> Result<Option<String>, LlmError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(user));

        let request = Arc::new(ChatRequest {
            model: self.settings.model.clone(),
            messages,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        });

        let transport = Arc::clone(&self.transport);
        let response = self
            .dispatcher
            .dispatch(|key| {
                let transport = Arc::clone(&transport);
                let request = Arc::clone(&request);
                async move { transport.send(&key, &request).await }
            })
            .await?;

        let text = response.text().map(str::to_string);
        debug!(
            "LLM call finished: model={}, has_content={}",
            self.settings.model,
            text.is_some()
        );
        Ok(text)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Test support
// ────────────────────────────────────────────────────────────────────────────
