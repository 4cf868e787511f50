//! Scheduler configuration.

use std::env;

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How often the quick timer scans, in seconds.
    pub quick_tick_secs: u64,
    /// Idle threshold for the quick prompt, in seconds.
    pub quick_idle_secs: i64,
    /// How often the daily timer scans, in seconds.
    pub daily_tick_secs: u64,
    /// Idle threshold (and re-send window) for the daily prompt, in seconds.
    pub daily_idle_secs: i64,
    /// Candidates handled per tick.
    pub batch_limit: i64,
    /// URL pinged to keep the hosting platform from idling the process.
    pub keepalive_url: Option<String>,
    /// Ping period, in seconds.
    pub keepalive_period_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            quick_tick_secs: 120,
            quick_idle_secs: 900,
            daily_tick_secs: 3_600,
            daily_idle_secs: 86_400,
            batch_limit: 50,
            keepalive_url: None,
            keepalive_period_secs: 3_600,
        }
    }
}

impl SchedulerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from environment variables.
    ///
    /// Recognized: `BOT_QUICK_IDLE_SECS`, `BOT_DAILY_IDLE_SECS`,
    /// `BOT_SCHEDULER_BATCH_LIMIT`, `BOT_KEEPALIVE_URL`. Unset or
    /// unparseable values keep the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = read_i64("BOT_QUICK_IDLE_SECS") {
            config.quick_idle_secs = v;
        }
        if let Some(v) = read_i64("BOT_DAILY_IDLE_SECS") {
            config.daily_idle_secs = v;
        }
        if let Some(v) = read_i64("BOT_SCHEDULER_BATCH_LIMIT") {
            config.batch_limit = v;
        }
        if let Ok(url) = env::var("BOT_KEEPALIVE_URL") {
            if !url.is_empty() {
                config.keepalive_url = Some(url);
            }
        }

        config
    }
}

fn read_i64(key: &str) -> Option<i64> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.quick_idle_secs, 900);
        assert_eq!(config.daily_idle_secs, 86_400);
        assert_eq!(config.batch_limit, 50);
        assert!(config.keepalive_url.is_none());
    }
}
