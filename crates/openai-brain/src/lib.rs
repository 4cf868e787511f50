//! OpenAI chat-completions implementation of [`bot_core::LanguageModel`].
//!
//! The adapter is intentionally thin: persona instructions, the bounded
//! context window and the user text come in per call, text comes out. All
//! persona and prompt-building logic lives in the orchestrator.

mod api_types;
mod config;
mod model;

pub use config::{load_prompt_file, OpenAiConfig, OpenAiConfigBuilder, DEFAULT_PROMPT_FILE};
pub use model::OpenAiModel;
