//! OpenAiModel implementation of the LanguageModel trait.

use std::time::Duration;

use bot_core::{async_trait, ContextTurn, LanguageModel, ModelError};
use reqwest::Client;
use tracing::{debug, warn};

use crate::api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::OpenAiConfig;

/// A LanguageModel backed by the OpenAI chat-completions API.
///
/// Stateless between calls: the caller supplies the system prompt and the
/// bounded conversation window every time.
pub struct OpenAiModel {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiModel {
    /// Create a new adapter with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ModelError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        tracing::info!(
            "OpenAiModel initialized with model: {}, timeout: {}s",
            config.model,
            config.timeout_secs
        );

        Ok(Self { client, config })
    }

    /// Create an adapter from environment variables.
    ///
    /// See [`OpenAiConfig::from_env`] for the variables involved.
    pub fn from_env() -> Result<Self, ModelError> {
        let config = OpenAiConfig::from_env()?;
        Self::new(config)
    }

    /// Get the configuration.
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn build_messages(
        system_prompt: &str,
        context: &[ContextTurn],
        user_text: &str,
    ) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(context.len() + 2);

        if !system_prompt.is_empty() {
            messages.push(ChatMessage::system(system_prompt));
        }

        for turn in context {
            messages.push(ChatMessage {
                role: turn.role.as_str().to_string(),
                content: turn.content.clone(),
            });
        }

        messages.push(ChatMessage::user(user_text));
        messages
    }

    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<ChatCompletionResponse, ModelError> {
        let url = format!("{}/v1/chat/completions", self.config.api_url);

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Sending request to OpenAI API: model={}", request.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout(self.config.timeout_secs)
                } else {
                    ModelError::Network(format!("Failed to send request: {}", e))
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            // Try to parse as API error
            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                return Err(ModelError::CompletionFailed(format!(
                    "API error ({}): {}",
                    status.as_u16(),
                    api_error.error.message
                )));
            }

            return Err(ModelError::CompletionFailed(format!(
                "API error ({}): {}",
                status.as_u16(),
                error_text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            ModelError::CompletionFailed(format!("Failed to parse response: {}", e))
        })?;

        Ok(completion)
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    async fn complete(
        &self,
        system_prompt: &str,
        context: &[ContextTurn],
        user_text: &str,
    ) -> Result<String, ModelError> {
        let messages = Self::build_messages(system_prompt, context, user_text);
        let completion = self.chat_completion(messages).await?;

        let text = completion
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or(ModelError::Empty)?;

        if let Some(usage) = completion.usage {
            debug!(
                "Token usage - prompt: {}, completion: {}, total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        } else {
            warn!("No usage information in completion {}", completion.id);
        }

        Ok(text)
    }

    fn name(&self) -> &str {
        "OpenAiModel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bot_core::Role;

    #[test]
    fn test_build_messages_with_context() {
        let context = vec![ContextTurn::user("hi"), ContextTurn::agent("hey there")];
        let messages = OpenAiModel::build_messages("persona", &context, "how are you");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, "persona");
        assert_eq!(messages[1].role, Role::User.as_str());
        assert_eq!(messages[2].role, Role::Agent.as_str());
        assert_eq!(messages[3].role, "user");
        assert_eq!(messages[3].content, "how are you");
    }

    #[test]
    fn test_build_messages_empty_system_prompt() {
        let messages = OpenAiModel::build_messages("", &[], "hello");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
    }

    #[test]
    fn test_model_name() {
        let config = OpenAiConfig::builder().api_key("test-key").build();
        let model = OpenAiModel::new(config).unwrap();
        assert_eq!(model.name(), "OpenAiModel");
    }
}
