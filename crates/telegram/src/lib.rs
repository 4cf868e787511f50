//! Telegram Bot API adapter.
//!
//! Thin typed client over the HTTP API, the update-to-event mapping the
//! webhook uses, and the [`orchestrator::sender::OutboundGate`]
//! implementation that turns engine actions into Bot API calls.

pub mod client;
pub mod error;
pub mod gate;
pub mod stickers;
pub mod types;

pub use client::BotClient;
pub use error::TelegramError;
pub use gate::TelegramGate;
pub use types::Update;
