//! Chat relay to the upstream completion API
//!
//! Each turn is sent with a fixed system prompt and only the most recent
//! history, and the reply is stripped of markup before it is returned.

pub mod context;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;

pub use context::{ChatMessage, Role, build_context};
pub use openai::{CompletionRequest, OpenAiClient};

use crate::sanitizer::sanitize;
use crate::{Error, Result};

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default system prompt for the tutor persona
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a friendly, patient language tutor. \
Reply in the language the learner is practicing, keep answers short and conversational, \
gently correct mistakes by restating the sentence correctly, and ask a follow-up question \
to keep the conversation going. Write plain text only, without Markdown formatting.";

/// Upstream API that turns a conversation into a reply
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send a completion request and return the first choice's text
    async fn complete(&self, request: &CompletionRequest, api_key: &SecretString) -> Result<String>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Fixed parameters applied to every upstream request
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub model: String,
    pub system_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Number of trailing history messages forwarded upstream
    pub history_limit: usize,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            history_limit: 2,
        }
    }
}

/// Builds context, calls the backend and sanitizes the reply
pub struct ChatRelay {
    backend: Arc<dyn CompletionBackend>,
    api_key: Option<SecretString>,
    settings: RelaySettings,
}

impl ChatRelay {
    /// Create a relay. A `None` key makes every chat fail with a configuration error.
    #[must_use]
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        api_key: Option<SecretString>,
        settings: RelaySettings,
    ) -> Self {
        Self {
            backend,
            api_key,
            settings,
        }
    }

    /// Whether an upstream credential is configured
    #[must_use]
    pub const fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Run one chat turn
    ///
    /// # Errors
    ///
    /// - `Error::Validation` if `message` is missing or blank
    /// - `Error::Config` if no API key is configured
    /// - `Error::Upstream` if the upstream call fails or returns no usable choice
    pub async fn handle_chat(&self, message: Option<&str>, history: &[ChatMessage]) -> Result<String> {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| Error::Validation("message is required".to_string()))?;

        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::Config("API key not configured".to_string()))?;

        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages: build_context(
                &self.settings.system_prompt,
                history,
                message,
                self.settings.history_limit,
            ),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        tracing::debug!(
            backend = self.backend.name(),
            model = %request.model,
            messages = request.messages.len(),
            "sending chat completion"
        );

        let raw = self.backend.complete(&request, api_key).await?;
        Ok(sanitize(&raw))
    }
}
