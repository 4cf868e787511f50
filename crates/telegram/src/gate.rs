//! The engine's outbound gate, implemented over the Bot API client.

use async_trait::async_trait;
use bot_core::SideSignal;
use orchestrator::economy::{GiftItem, GIFT_CURRENCY};
use orchestrator::sender::OutboundGate;
use orchestrator::EngineError;

use crate::client::BotClient;
use crate::error::TelegramError;
use crate::stickers;
use crate::types::{InlineKeyboardButton, InlineKeyboardMarkup, LabeledPrice};

pub struct TelegramGate {
    client: BotClient,
}

impl TelegramGate {
    pub fn new(client: BotClient) -> Self {
        Self { client }
    }
}

fn dispatch_err(e: TelegramError) -> EngineError {
    EngineError::Dispatch(e.to_string())
}

/// One button per catalog item, stacked vertically.
fn gift_keyboard(items: &[GiftItem]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: items
            .iter()
            .map(|item| {
                vec![InlineKeyboardButton {
                    text: item.label(),
                    callback_data: item.payload(),
                }]
            })
            .collect(),
    }
}

#[async_trait]
impl OutboundGate for TelegramGate {
    async fn send_text(&self, conversation_id: &str, text: &str) -> Result<(), EngineError> {
        self.client
            .send_message(conversation_id, text)
            .await
            .map_err(dispatch_err)
    }

    async fn send_side_signal(
        &self,
        conversation_id: &str,
        signal: SideSignal,
    ) -> Result<(), EngineError> {
        self.client
            .send_sticker(conversation_id, stickers::file_id(signal))
            .await
            .map_err(dispatch_err)
    }

    async fn send_gift_offer(
        &self,
        conversation_id: &str,
        intro: &str,
        items: &[GiftItem],
    ) -> Result<(), EngineError> {
        self.client
            .send_message_with_keyboard(conversation_id, intro, &gift_keyboard(items))
            .await
            .map_err(dispatch_err)
    }

    async fn send_invoice(
        &self,
        conversation_id: &str,
        item: &GiftItem,
    ) -> Result<(), EngineError> {
        let prices = [LabeledPrice {
            label: item.title.to_string(),
            amount: item.price_units,
        }];

        self.client
            .send_invoice(
                conversation_id,
                &format!("Подарок: {}", item.title),
                "Напиток для твоей собутыльницы 🥂",
                &item.payload(),
                GIFT_CURRENCY,
                &prices,
            )
            .await
            .map_err(dispatch_err)
    }

    async fn answer_pre_checkout(
        &self,
        query_id: &str,
        ok: bool,
        error_message: Option<&str>,
    ) -> Result<(), EngineError> {
        self.client
            .answer_pre_checkout_query(query_id, ok, error_message)
            .await
            .map_err(dispatch_err)
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), EngineError> {
        self.client
            .answer_callback_query(callback_id)
            .await
            .map_err(dispatch_err)
    }
}
