//! The language-model trait and conversation window types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// The end user.
    User,
    /// The bot persona.
    Agent,
}

impl Role {
    /// Storage / wire string for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Agent => "assistant",
        }
    }

    /// Parse a stored role string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "assistant" | "agent" => Some(Role::Agent),
            _ => None,
        }
    }
}

/// One turn of the bounded recent-conversation window fed into a completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextTurn {
    pub role: Role,
    pub content: String,
}

impl ContextTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn agent(content: impl Into<String>) -> Self {
        Self {
            role: Role::Agent,
            content: content.into(),
        }
    }
}

/// A black-box completion backend.
///
/// Implementations are fully external and replaceable: the engine only ever
/// sees text in and text out. Calls must be bounded by a timeout inside the
/// implementation; callers treat a timeout like any other failure.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Produce a reply for `user_text` given persona instructions and a
    /// bounded window of recent turns.
    async fn complete(
        &self,
        system_prompt: &str,
        context: &[ContextTurn],
        user_text: &str,
    ) -> Result<String, ModelError>;

    /// Human-readable adapter name for logging.
    fn name(&self) -> &str;
}
