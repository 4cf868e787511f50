//! Typed HTTP client for the Bot API methods the bot uses.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::{Result, TelegramError};
use crate::types::{InlineKeyboardMarkup, LabeledPrice};

const DEFAULT_API_BASE: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Standard Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

/// The bot's own identity, from `getMe`.
#[derive(Debug, Clone, Deserialize)]
pub struct BotIdentity {
    pub id: i64,
    pub username: Option<String>,
}

pub struct BotClient {
    http: Client,
    token: String,
    api_base: String,
}

impl BotClient {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Point the client at a different API host (tests, local bot servers).
    pub fn with_api_base(token: impl Into<String>, api_base: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(TelegramError::Configuration(
                "Bot token must not be empty".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                TelegramError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            token,
            api_base: api_base.into(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &impl Serialize,
    ) -> Result<T> {
        debug!("Calling Bot API method {}", method);

        let response = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TelegramError::Timeout
                } else {
                    TelegramError::Network(format!("{} failed: {}", method, e))
                }
            })?;

        let envelope: ApiResponse<T> = response.json().await.map_err(|e| {
            TelegramError::UnexpectedResponse(format!("{} response: {}", method, e))
        })?;

        if !envelope.ok {
            return Err(TelegramError::Api {
                code: envelope.error_code.unwrap_or(0),
                description: envelope
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            });
        }

        envelope.result.ok_or_else(|| {
            TelegramError::UnexpectedResponse(format!("{}: ok but no result", method))
        })
    }

    pub async fn get_me(&self) -> Result<BotIdentity> {
        self.call("getMe", &json!({})).await
    }

    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<()> {
        let _: serde_json::Value = self
            .call("sendMessage", &json!({ "chat_id": chat_id, "text": text }))
            .await?;
        Ok(())
    }

    pub async fn send_message_with_keyboard(
        &self,
        chat_id: &str,
        text: &str,
        keyboard: &InlineKeyboardMarkup,
    ) -> Result<()> {
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                &json!({ "chat_id": chat_id, "text": text, "reply_markup": keyboard }),
            )
            .await?;
        Ok(())
    }

    pub async fn send_sticker(&self, chat_id: &str, file_id: &str) -> Result<()> {
        let _: serde_json::Value = self
            .call(
                "sendSticker",
                &json!({ "chat_id": chat_id, "sticker": file_id }),
            )
            .await?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn send_invoice(
        &self,
        chat_id: &str,
        title: &str,
        description: &str,
        payload: &str,
        currency: &str,
        prices: &[LabeledPrice],
    ) -> Result<()> {
        let _: serde_json::Value = self
            .call(
                "sendInvoice",
                &json!({
                    "chat_id": chat_id,
                    "title": title,
                    "description": description,
                    "payload": payload,
                    "currency": currency,
                    "prices": prices,
                }),
            )
            .await?;
        Ok(())
    }

    pub async fn answer_pre_checkout_query(
        &self,
        query_id: &str,
        ok: bool,
        error_message: Option<&str>,
    ) -> Result<()> {
        let mut body = json!({ "pre_checkout_query_id": query_id, "ok": ok });
        if let Some(message) = error_message {
            body["error_message"] = json!(message);
        }

        let _: serde_json::Value = self.call("answerPreCheckoutQuery", &body).await?;
        Ok(())
    }

    pub async fn answer_callback_query(&self, callback_id: &str) -> Result<()> {
        let _: serde_json::Value = self
            .call(
                "answerCallbackQuery",
                &json!({ "callback_query_id": callback_id }),
            )
            .await?;
        Ok(())
    }

    /// Register the webhook, limited to the update kinds the bot handles.
    pub async fn set_webhook(&self, url: &str) -> Result<()> {
        let _: serde_json::Value = self
            .call(
                "setWebhook",
                &json!({
                    "url": url,
                    "allowed_updates": ["message", "callback_query", "pre_checkout_query"],
                }),
            )
            .await?;
        Ok(())
    }
}
