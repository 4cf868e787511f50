//! Mock implementations of [`bot_core::LanguageModel`] for testing.
//!
//! - [`EchoModel`] - Echoes the user text back
//! - [`ScriptedModel`] - Returns queued replies and records every call
//! - [`FailingModel`] - Always fails with a network error
//!
//! For production completions, use the `openai-brain` crate instead.

use std::sync::Mutex;

use bot_core::{async_trait, ContextTurn, LanguageModel, ModelError};

/// Echoes the user text back.
#[derive(Debug, Default)]
pub struct EchoModel;

#[async_trait]
impl LanguageModel for EchoModel {
    async fn complete(
        &self,
        _system_prompt: &str,
        _context: &[ContextTurn],
        user_text: &str,
    ) -> Result<String, ModelError> {
        Ok(user_text.to_string())
    }

    fn name(&self) -> &str {
        "EchoModel"
    }
}

/// One observed completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub context_len: usize,
    pub user_text: String,
}

/// Returns queued replies in order and records every call for assertions.
///
/// When the queue runs dry it falls back to echoing the user text, so tests
/// only script the replies they care about.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: Mutex<Vec<String>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies to return, in order.
    pub fn with_replies(replies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Push one more scripted reply.
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push(reply.into());
    }

    /// Number of completion calls observed.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Snapshot of all observed calls.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(
        &self,
        system_prompt: &str,
        context: &[ContextTurn],
        user_text: &str,
    ) -> Result<String, ModelError> {
        self.calls.lock().unwrap().push(RecordedCall {
            system_prompt: system_prompt.to_string(),
            context_len: context.len(),
            user_text: user_text.to_string(),
        });

        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            Ok(user_text.to_string())
        } else {
            Ok(replies.remove(0))
        }
    }

    fn name(&self) -> &str {
        "ScriptedModel"
    }
}

/// Always fails, counting the attempts.
#[derive(Debug, Default)]
pub struct FailingModel {
    attempts: Mutex<usize>,
}

impl FailingModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of failed completion attempts observed.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl LanguageModel for FailingModel {
    async fn complete(
        &self,
        _system_prompt: &str,
        _context: &[ContextTurn],
        _user_text: &str,
    ) -> Result<String, ModelError> {
        *self.attempts.lock().unwrap() += 1;
        Err(ModelError::Network("mock failure".to_string()))
    }

    fn name(&self) -> &str {
        "FailingModel"
    }
}
