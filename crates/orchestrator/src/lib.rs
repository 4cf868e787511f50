//! Reply orchestration for the drinking-buddy bot.
//!
//! This crate contains the engine proper: the pure fact extractor, the
//! per-message reply state machine, the side-signal classifier, the drink
//! economy with its gift/purchase flow, and the outbound gate trait the
//! transport adapter implements.
//!
//! Everything is dependency-injected at construction time: the engine holds
//! a [`database::Database`], an `Arc<dyn LanguageModel>` and an
//! [`OutboundGate`]; there are no process-wide singletons.

pub mod config;
pub mod economy;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod prompts;
pub mod sender;
pub mod signals;
pub mod stats;

pub use config::EngineConfig;
pub use economy::{GiftItem, CATALOG, GIFT_CURRENCY};
pub use engine::Orchestrator;
pub use error::EngineError;
pub use extractor::{extract, DrinkReport, FactUpdateSet};
pub use sender::{NoOpGate, OutboundAction, OutboundGate, RecordingGate};
