//! Engine-facing inbound events.
//!
//! The webhook layer parses the chat platform's update envelope into these
//! types; everything below the ingress boundary works in terms of them.

use serde::{Deserialize, Serialize};

/// A plain text message from a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessage {
    /// Stable external user identity.
    pub user_id: String,
    /// Delivery destination (may differ from `user_id` in group chats).
    pub conversation_id: String,
    /// Display name as reported by the platform, if any.
    pub display_name: Option<String>,
    /// Message text.
    pub text: String,
}

impl TextMessage {
    /// Convenience constructor for direct chats where user and conversation
    /// identity coincide.
    pub fn direct(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        let user_id = user_id.into();
        Self {
            conversation_id: user_id.clone(),
            user_id,
            display_name: None,
            text: text.into(),
        }
    }
}

/// The user tapped a gift button in the shop offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftSelected {
    pub user_id: String,
    pub conversation_id: String,
    /// Callback id the platform expects an acknowledgement for.
    pub callback_id: String,
    /// Item code from the button payload.
    pub item_code: String,
}

/// Pre-confirmation handshake for a purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreCheckout {
    pub query_id: String,
    pub user_id: String,
    /// Invoice payload (`gift:<code>`).
    pub payload: String,
    /// Total amount in minimal currency units.
    pub amount: i64,
    /// Currency code (stars are "XTR").
    pub currency: String,
}

/// Final confirmed-payment notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmed {
    pub user_id: String,
    pub conversation_id: String,
    /// Provider charge id; idempotency key for the whole purchase.
    pub charge_id: String,
    pub payload: String,
    pub amount: i64,
    pub currency: String,
    /// Raw provider payload, retained for audit.
    pub raw: serde_json::Value,
}

/// Everything the ingress can hand to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InboundEvent {
    Text(TextMessage),
    GiftSelected(GiftSelected),
    PreCheckout(PreCheckout),
    PaymentConfirmed(PaymentConfirmed),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_message() {
        let msg = TextMessage::direct("42", "hello");
        assert_eq!(msg.user_id, "42");
        assert_eq!(msg.conversation_id, "42");
        assert!(msg.display_name.is_none());
    }

    #[test]
    fn test_event_serde() {
        let event = InboundEvent::PreCheckout(PreCheckout {
            query_id: "q1".into(),
            user_id: "42".into(),
            payload: "gift:beer".into(),
            amount: 50,
            currency: "XTR".into(),
        });
        let json = serde_json::to_string(&event).unwrap();
        let back: InboundEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
