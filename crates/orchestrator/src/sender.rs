//! Outbound dispatch seam.
//!
//! The engine never talks to the chat platform directly; it goes through an
//! [`OutboundGate`]. The transport crate implements it for the real
//! platform, tests use [`RecordingGate`].

use async_trait::async_trait;
use bot_core::SideSignal;

use crate::economy::GiftItem;
use crate::error::Result;

/// Everything the engine can push outward.
#[async_trait]
pub trait OutboundGate: Send + Sync {
    /// Send a text reply into a conversation.
    async fn send_text(&self, conversation_id: &str, text: &str) -> Result<()>;

    /// Dispatch a side-signal (sticker-like reaction) into a conversation.
    async fn send_side_signal(&self, conversation_id: &str, signal: SideSignal) -> Result<()>;

    /// Show the gift catalog as a button list.
    async fn send_gift_offer(
        &self,
        conversation_id: &str,
        intro: &str,
        items: &[GiftItem],
    ) -> Result<()>;

    /// Send an invoice for one catalog item.
    async fn send_invoice(&self, conversation_id: &str, item: &GiftItem) -> Result<()>;

    /// Answer a pre-checkout handshake.
    async fn answer_pre_checkout(
        &self,
        query_id: &str,
        ok: bool,
        error_message: Option<&str>,
    ) -> Result<()>;

    /// Acknowledge a button callback so the client stops its spinner.
    async fn answer_callback(&self, callback_id: &str) -> Result<()>;
}

/// Gate that drops everything. Placeholder for wiring and benchmarks.
#[derive(Debug, Default)]
pub struct NoOpGate;

#[async_trait]
impl OutboundGate for NoOpGate {
    async fn send_text(&self, _conversation_id: &str, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn send_side_signal(&self, _conversation_id: &str, _signal: SideSignal) -> Result<()> {
        Ok(())
    }

    async fn send_gift_offer(
        &self,
        _conversation_id: &str,
        _intro: &str,
        _items: &[GiftItem],
    ) -> Result<()> {
        Ok(())
    }

    async fn send_invoice(&self, _conversation_id: &str, _item: &GiftItem) -> Result<()> {
        Ok(())
    }

    async fn answer_pre_checkout(
        &self,
        _query_id: &str,
        _ok: bool,
        _error_message: Option<&str>,
    ) -> Result<()> {
        Ok(())
    }

    async fn answer_callback(&self, _callback_id: &str) -> Result<()> {
        Ok(())
    }
}

/// One observed outbound action, in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundAction {
    Text {
        conversation_id: String,
        text: String,
    },
    Signal {
        conversation_id: String,
        signal: SideSignal,
    },
    GiftOffer {
        conversation_id: String,
        item_codes: Vec<String>,
    },
    Invoice {
        conversation_id: String,
        item_code: String,
    },
    PreCheckoutAnswer {
        query_id: String,
        ok: bool,
        error_message: Option<String>,
    },
    CallbackAnswer {
        callback_id: String,
    },
}

/// Gate that records every action for assertions.
#[derive(Debug, Default)]
pub struct RecordingGate {
    actions: std::sync::Mutex<Vec<OutboundAction>>,
}

impl RecordingGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all dispatched actions, in order.
    pub fn actions(&self) -> Vec<OutboundAction> {
        self.actions.lock().unwrap().clone()
    }

    /// Texts only, in dispatch order.
    pub fn texts(&self) -> Vec<String> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                OutboundAction::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Signals only, in dispatch order.
    pub fn signals(&self) -> Vec<SideSignal> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                OutboundAction::Signal { signal, .. } => Some(signal),
                _ => None,
            })
            .collect()
    }

    fn record(&self, action: OutboundAction) {
        self.actions.lock().unwrap().push(action);
    }
}

#[async_trait]
impl OutboundGate for RecordingGate {
    async fn send_text(&self, conversation_id: &str, text: &str) -> Result<()> {
        self.record(OutboundAction::Text {
            conversation_id: conversation_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_side_signal(&self, conversation_id: &str, signal: SideSignal) -> Result<()> {
        self.record(OutboundAction::Signal {
            conversation_id: conversation_id.to_string(),
            signal,
        });
        Ok(())
    }

    async fn send_gift_offer(
        &self,
        conversation_id: &str,
        _intro: &str,
        items: &[GiftItem],
    ) -> Result<()> {
        self.record(OutboundAction::GiftOffer {
            conversation_id: conversation_id.to_string(),
            item_codes: items.iter().map(|i| i.code.to_string()).collect(),
        });
        Ok(())
    }

    async fn send_invoice(&self, conversation_id: &str, item: &GiftItem) -> Result<()> {
        self.record(OutboundAction::Invoice {
            conversation_id: conversation_id.to_string(),
            item_code: item.code.to_string(),
        });
        Ok(())
    }

    async fn answer_pre_checkout(
        &self,
        query_id: &str,
        ok: bool,
        error_message: Option<&str>,
    ) -> Result<()> {
        self.record(OutboundAction::PreCheckoutAnswer {
            query_id: query_id.to_string(),
            ok,
            error_message: error_message.map(str::to_string),
        });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<()> {
        self.record(OutboundAction::CallbackAnswer {
            callback_id: callback_id.to_string(),
        });
        Ok(())
    }
}
