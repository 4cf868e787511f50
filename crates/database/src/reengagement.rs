//! Selection queries and send-claims for the re-engagement scheduler.
//!
//! Both timers follow the same shape: a set-based, bounded candidate query,
//! then a conditional claim per user before anything is dispatched. The claim
//! is what makes the timers idempotent and safe to run on several replicas.

use sqlx::SqlitePool;

use crate::models::PromptCandidate;
use crate::Result;

/// Users idle past `idle_secs` who have not been quick-prompted since their
/// last inbound message. Bounded by `limit`; oldest idleness first.
pub async fn quick_prompt_candidates(
    pool: &SqlitePool,
    now: i64,
    idle_secs: i64,
    limit: i64,
) -> Result<Vec<PromptCandidate>> {
    let candidates = sqlx::query_as::<_, PromptCandidate>(
        r#"
        SELECT user_id, conversation_id, display_name, preference_tags
        FROM users
        WHERE last_inbound_at > 0
          AND last_inbound_at <= ? - ?
          AND quick_prompt_pending = 0
        ORDER BY last_inbound_at ASC
        LIMIT ?
        "#,
    )
    .bind(now)
    .bind(idle_secs)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(candidates)
}

/// Claim the quick prompt for this idle period.
///
/// Returns false when another replica (or an interleaved inbound message
/// followed by a faster tick) already claimed it. A new inbound message
/// clears the flag again via `profile::upsert_on_inbound`.
pub async fn claim_quick_prompt(pool: &SqlitePool, user_id: &str, now: i64) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET quick_prompt_pending = 1, last_quick_prompt_at = ?, updated_at = ?
        WHERE user_id = ? AND quick_prompt_pending = 0
        "#,
    )
    .bind(now)
    .bind(now)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Users idle past `idle_secs` who have not received a daily prompt within
/// that same window. Bounded by `limit`.
pub async fn daily_prompt_candidates(
    pool: &SqlitePool,
    now: i64,
    idle_secs: i64,
    limit: i64,
) -> Result<Vec<PromptCandidate>> {
    let candidates = sqlx::query_as::<_, PromptCandidate>(
        r#"
        SELECT user_id, conversation_id, display_name, preference_tags
        FROM users
        WHERE last_inbound_at > 0
          AND last_inbound_at <= ? - ?
          AND (last_daily_prompt_at IS NULL OR last_daily_prompt_at <= ? - ?)
        ORDER BY last_inbound_at ASC
        LIMIT ?
        "#,
    )
    .bind(now)
    .bind(idle_secs)
    .bind(now)
    .bind(idle_secs)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(candidates)
}

/// Claim the daily prompt for the current window.
pub async fn claim_daily_prompt(
    pool: &SqlitePool,
    user_id: &str,
    now: i64,
    window_secs: i64,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET last_daily_prompt_at = ?, updated_at = ?
        WHERE user_id = ?
          AND (last_daily_prompt_at IS NULL OR last_daily_prompt_at <= ? - ?)
        "#,
    )
    .bind(now)
    .bind(now)
    .bind(user_id)
    .bind(now)
    .bind(window_secs)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
