//! Bot API wire types and the mapping into engine events.
//!
//! Only the fields the bot actually reads are modelled; everything else in
//! the update envelope is ignored on deserialization.

use bot_core::{GiftSelected, InboundEvent, PaymentConfirmed, PreCheckout, TextMessage};
use serde::{Deserialize, Serialize};

/// One incoming update from the webhook.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
    pub pre_checkout_query: Option<PreCheckoutQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    pub successful_payment: Option<SuccessfulPayment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Box<Message>>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreCheckoutQuery {
    pub id: String,
    pub from: User,
    pub currency: String,
    pub total_amount: i64,
    pub invoice_payload: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessfulPayment {
    pub currency: String,
    pub total_amount: i64,
    pub invoice_payload: String,
    pub telegram_payment_charge_id: String,
    pub provider_payment_charge_id: Option<String>,
}

/// Inline keyboard markup for outbound messages.
#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

/// One price row on an invoice.
#[derive(Debug, Clone, Serialize)]
pub struct LabeledPrice {
    pub label: String,
    pub amount: i64,
}

impl Update {
    /// Map this update into an engine event, if it carries one.
    ///
    /// Priority mirrors the payment flow: a successful payment inside a
    /// message wins over its (absent) text, callbacks and pre-checkouts are
    /// their own envelopes.
    pub fn into_event(self) -> Option<InboundEvent> {
        if let Some(query) = self.pre_checkout_query {
            return Some(InboundEvent::PreCheckout(PreCheckout {
                query_id: query.id,
                user_id: query.from.id.to_string(),
                payload: query.invoice_payload,
                amount: query.total_amount,
                currency: query.currency,
            }));
        }

        if let Some(query) = self.callback_query {
            let data = query.data?;
            let item_code = data.strip_prefix("gift:")?.to_string();
            let conversation_id = query
                .message
                .as_ref()
                .map(|m| m.chat.id.to_string())
                .unwrap_or_else(|| query.from.id.to_string());
            return Some(InboundEvent::GiftSelected(GiftSelected {
                user_id: query.from.id.to_string(),
                conversation_id,
                callback_id: query.id,
                item_code,
            }));
        }

        let message = self.message?;
        let from = message.from?;

        if let Some(payment) = message.successful_payment {
            let raw = serde_json::to_value(&payment).unwrap_or(serde_json::Value::Null);
            return Some(InboundEvent::PaymentConfirmed(PaymentConfirmed {
                user_id: from.id.to_string(),
                conversation_id: message.chat.id.to_string(),
                charge_id: payment.telegram_payment_charge_id,
                payload: payment.invoice_payload,
                amount: payment.total_amount,
                currency: payment.currency,
                raw,
            }));
        }

        let text = message.text?;
        Some(InboundEvent::Text(TextMessage {
            user_id: from.id.to_string(),
            conversation_id: message.chat.id.to_string(),
            display_name: from.first_name,
            text,
        }))
    }
}
