//! The re-engagement timers.
//!
//! Per candidate the order is generate, claim, send: a model failure skips
//! the user without burning their claim, and a lost claim (another replica
//! got there first, or the user wrote back mid-tick) skips the send.

use std::sync::Arc;
use std::time::Duration;

use bot_core::{LanguageModel, Role};
use chrono::Utc;
use database::models::PromptCandidate;
use database::{conversation, reengagement, Database, Result};
use orchestrator::sender::OutboundGate;
use orchestrator::prompts;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::SchedulerConfig;
use crate::keepalive;

/// Which of the two timers a tick belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    Quick,
    Daily,
}

/// Handles to the spawned loops; the ingress health check watches these.
pub struct SchedulerHandles {
    pub quick: JoinHandle<()>,
    pub daily: JoinHandle<()>,
    pub keepalive: Option<JoinHandle<()>>,
}

impl SchedulerHandles {
    /// True while both timer loops are still running.
    pub fn is_alive(&self) -> bool {
        !self.quick.is_finished() && !self.daily.is_finished()
    }
}

/// Owns the timer state and dependencies. Cheap to share behind an `Arc`.
pub struct Scheduler {
    db: Database,
    model: Arc<dyn LanguageModel>,
    gate: Arc<dyn OutboundGate>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(
        db: Database,
        model: Arc<dyn LanguageModel>,
        gate: Arc<dyn OutboundGate>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            db,
            model,
            gate,
            config,
        }
    }

    /// Spawn the two timer loops (and the keepalive ping when configured).
    pub fn spawn(self: Arc<Self>) -> SchedulerHandles {
        let quick = {
            let scheduler = self.clone();
            tokio::spawn(async move {
                let mut interval =
                    tokio::time::interval(Duration::from_secs(scheduler.config.quick_tick_secs));
                loop {
                    interval.tick().await;
                    let now = Utc::now().timestamp();
                    if let Err(e) = scheduler.run_quick_tick(now).await {
                        error!("Quick re-engagement tick failed: {}", e);
                    }
                }
            })
        };

        let daily = {
            let scheduler = self.clone();
            tokio::spawn(async move {
                let mut interval =
                    tokio::time::interval(Duration::from_secs(scheduler.config.daily_tick_secs));
                loop {
                    interval.tick().await;
                    let now = Utc::now().timestamp();
                    if let Err(e) = scheduler.run_daily_tick(now).await {
                        error!("Daily re-engagement tick failed: {}", e);
                    }
                }
            })
        };

        let keepalive = self.config.keepalive_url.clone().map(|url| {
            let period = Duration::from_secs(self.config.keepalive_period_secs);
            tokio::spawn(keepalive::run(url, period))
        });

        SchedulerHandles {
            quick,
            daily,
            keepalive,
        }
    }

    /// One pass of the quick timer. Returns how many prompts went out.
    pub async fn run_quick_tick(&self, now: i64) -> Result<usize> {
        let candidates = reengagement::quick_prompt_candidates(
            self.db.pool(),
            now,
            self.config.quick_idle_secs,
            self.config.batch_limit,
        )
        .await?;

        self.prompt_candidates(Timer::Quick, &candidates, now).await
    }

    /// One pass of the daily timer.
    pub async fn run_daily_tick(&self, now: i64) -> Result<usize> {
        let candidates = reengagement::daily_prompt_candidates(
            self.db.pool(),
            now,
            self.config.daily_idle_secs,
            self.config.batch_limit,
        )
        .await?;

        self.prompt_candidates(Timer::Daily, &candidates, now).await
    }

    async fn prompt_candidates(
        &self,
        timer: Timer,
        candidates: &[PromptCandidate],
        now: i64,
    ) -> Result<usize> {
        let mut sent = 0;

        for candidate in candidates {
            let instruction = match timer {
                Timer::Quick => prompts::quick_reengagement(
                    candidate.display_name.as_deref(),
                    candidate.preference_tags.as_deref(),
                ),
                Timer::Daily => prompts::daily_reengagement(
                    candidate.display_name.as_deref(),
                    candidate.preference_tags.as_deref(),
                ),
            };

            let text = match self
                .model
                .complete(prompts::DEFAULT_PERSONA, &[], &instruction)
                .await
            {
                Ok(text) => text,
                Err(e) => {
                    // No claim burned: this user stays eligible next tick.
                    debug!("Skipping {} prompt for {}: {}", label(timer), candidate.user_id, e);
                    continue;
                }
            };

            let claimed = match timer {
                Timer::Quick => {
                    reengagement::claim_quick_prompt(self.db.pool(), &candidate.user_id, now)
                        .await?
                }
                Timer::Daily => {
                    reengagement::claim_daily_prompt(
                        self.db.pool(),
                        &candidate.user_id,
                        now,
                        self.config.daily_idle_secs,
                    )
                    .await?
                }
            };
            if !claimed {
                continue;
            }

            if let Err(e) = self
                .gate
                .send_text(&candidate.conversation_id, &text)
                .await
            {
                warn!(
                    "Failed to send {} prompt to {}: {}",
                    label(timer),
                    candidate.conversation_id,
                    e
                );
                continue;
            }

            // Keep the prompt in the transcript so the next completion sees it.
            if let Err(e) = conversation::append_turn(
                self.db.pool(),
                &candidate.conversation_id,
                Role::Agent.as_str(),
                &text,
                None,
                now,
            )
            .await
            {
                error!("Failed to log {} prompt for {}: {}", label(timer), candidate.user_id, e);
            }

            sent += 1;
        }

        if sent > 0 {
            info!("Sent {} {} re-engagement prompt(s)", sent, label(timer));
        }
        Ok(sent)
    }
}

fn label(timer: Timer) -> &'static str {
    match timer {
        Timer::Quick => "quick",
        Timer::Daily => "daily",
    }
}
