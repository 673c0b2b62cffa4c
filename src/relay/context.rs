//! Conversation context assembly

use serde::{Deserialize, Serialize};

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A role-tagged chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Build the message list sent upstream
///
/// Only the last `history_limit` history entries are kept so the model
/// answers the current turn instead of drifting back to older topics.
#[must_use]
pub fn build_context(
    system_prompt: &str,
    history: &[ChatMessage],
    message: &str,
    history_limit: usize,
) -> Vec<ChatMessage> {
    let recent = &history[history.len().saturating_sub(history_limit)..];

    let mut messages = Vec::with_capacity(recent.len() + 2);
    messages.push(ChatMessage::system(system_prompt));
    messages.extend(recent.iter().cloned());
    messages.push(ChatMessage::user(message));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history() {
        let ctx = build_context("prompt", &[], "hola", 2);
        assert_eq!(ctx, vec![ChatMessage::system("prompt"), ChatMessage::user("hola")]);
    }

    #[test]
    fn test_history_truncated_to_most_recent() {
        let history = vec![
            ChatMessage::user("1"),
            ChatMessage::assistant("2"),
            ChatMessage::user("3"),
            ChatMessage::assistant("4"),
            ChatMessage::user("5"),
        ];

        let ctx = build_context("prompt", &history, "6", 2);

        assert_eq!(ctx.len(), 4);
        assert_eq!(ctx[0], ChatMessage::system("prompt"));
        assert_eq!(ctx[1], ChatMessage::assistant("4"));
        assert_eq!(ctx[2], ChatMessage::user("5"));
        assert_eq!(ctx[3], ChatMessage::user("6"));
    }

    #[test]
    fn test_short_history_kept_whole() {
        let history = vec![ChatMessage::assistant("¡Hola!")];
        let ctx = build_context("prompt", &history, "¿Cómo estás?", 2);
        assert_eq!(ctx.len(), 3);
        assert_eq!(ctx[1], ChatMessage::assistant("¡Hola!"));
    }

    #[test]
    fn test_zero_limit_drops_history() {
        let history = vec![ChatMessage::user("old")];
        let ctx = build_context("prompt", &history, "new", 0);
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_value(ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json["role"], "assistant");

        let parsed: ChatMessage =
            serde_json::from_str(r#"{"role":"user","content":"x"}"#).unwrap();
        assert_eq!(parsed.role, Role::User);
    }
}
