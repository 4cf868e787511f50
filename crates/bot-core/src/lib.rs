//! Core trait and types for the drinking-buddy bot engine.
//!
//! This crate provides the shared interface between the engine crates:
//!
//! - [`LanguageModel`] - The trait every model adapter implements
//! - [`ContextTurn`] / [`Role`] - The bounded conversation window fed to a model
//! - [`SideSignal`] - Non-text reactions (themed stickers) emitted alongside replies
//! - Inbound event types parsed out of the chat platform's webhook envelope
//! - [`ModelError`] - Error taxonomy for model calls
//!
//! # Example
//!
//! ```rust
//! use bot_core::{async_trait, ContextTurn, LanguageModel, ModelError};
//!
//! struct StaticModel;
//!
//! #[async_trait]
//! impl LanguageModel for StaticModel {
//!     async fn complete(
//!         &self,
//!         _system_prompt: &str,
//!         _context: &[ContextTurn],
//!         _user_text: &str,
//!     ) -> Result<String, ModelError> {
//!         Ok("cheers!".to_string())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "StaticModel"
//!     }
//! }
//! ```

mod error;
mod event;
mod model;
mod signal;

pub use error::ModelError;
pub use event::{GiftSelected, InboundEvent, PaymentConfirmed, PreCheckout, TextMessage};
pub use model::{ContextTurn, LanguageModel, Role};
pub use signal::SideSignal;

// Re-export async_trait for convenience
pub use async_trait::async_trait;
