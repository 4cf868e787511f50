//! Engine configuration.

use std::env;

use crate::prompts;

/// Tunables for the reply engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Free consumption events per user per daily window.
    pub quota_max: i64,
    /// Reported units per day that trigger the overuse warning.
    pub overuse_threshold: i64,
    /// Conversation turns fed to the model per completion.
    pub context_window: i64,
    /// Persona instructions prepended to every completion.
    pub persona_prompt: String,
    /// Canned reply when the model is unavailable.
    pub fallback_reply: String,
    /// Canned reply when handling fails internally.
    pub apology_reply: String,
    /// Pause between gratitude messages after a purchase, in milliseconds.
    /// Tests set this to zero.
    pub thank_you_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quota_max: 5,
            overuse_threshold: 10,
            context_window: 12,
            persona_prompt: prompts::DEFAULT_PERSONA.to_string(),
            fallback_reply: prompts::FALLBACK_REPLY.to_string(),
            apology_reply: prompts::APOLOGY_REPLY.to_string(),
            thank_you_delay_ms: 1_500,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from environment variables.
    ///
    /// Recognized: `BOT_QUOTA_MAX`, `BOT_OVERUSE_THRESHOLD`,
    /// `BOT_CONTEXT_WINDOW`, `BOT_THANK_YOU_DELAY_MS`. Unset or unparseable
    /// values keep the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = read_i64("BOT_QUOTA_MAX") {
            config.quota_max = v;
        }
        if let Some(v) = read_i64("BOT_OVERUSE_THRESHOLD") {
            config.overuse_threshold = v;
        }
        if let Some(v) = read_i64("BOT_CONTEXT_WINDOW") {
            config.context_window = v;
        }
        if let Some(v) = read_u64("BOT_THANK_YOU_DELAY_MS") {
            config.thank_you_delay_ms = v;
        }

        config
    }

    /// Replace the persona instructions.
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona_prompt = persona.into();
        self
    }

    /// Configuration for tests: no gratitude delays.
    pub fn for_tests() -> Self {
        Self {
            thank_you_delay_ms: 0,
            ..Self::default()
        }
    }
}

fn read_i64(key: &str) -> Option<i64> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn read_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
