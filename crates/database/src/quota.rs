//! Daily free-consumption quota ledger.
//!
//! The quota lives on the user row and follows a rolling 24h window applied
//! lazily: the counter resets to zero the first time it is read or written
//! after `quota_reset_at` is a full day old. All mutations are single
//! conditional read-modify-write statements keyed by user id, so concurrent
//! handlers for the same user cannot lose updates and the counter can never
//! exceed the configured maximum.

use sqlx::SqlitePool;
use tracing::debug;

use crate::{Result, DAY_SECS};

/// Make sure a ledger row exists (first-ever check creates it with used=0).
async fn ensure_row(pool: &SqlitePool, user_id: &str, now: i64) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (user_id, conversation_id, quota_reset_at, last_inbound_at,
                           created_at, updated_at)
        VALUES (?, ?, ?, 0, ?, ?)
        ON CONFLICT(user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .bind(now)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

/// Reset the counter if the current window is over.
async fn apply_lazy_reset(pool: &SqlitePool, user_id: &str, now: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE users SET daily_free_quota_used = 0, quota_reset_at = ?, updated_at = ?
        WHERE user_id = ? AND ? - quota_reset_at >= ?
        "#,
    )
    .bind(now)
    .bind(now)
    .bind(user_id)
    .bind(now)
    .bind(DAY_SECS)
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        debug!("Reset free quota window for user {}", user_id);
    }

    Ok(())
}

/// Whether the user's ledger still has free consumption events available.
///
/// Applies the lazy reset first; creates the ledger row on first sight.
pub async fn can_consume_free(
    pool: &SqlitePool,
    user_id: &str,
    now: i64,
    quota_max: i64,
) -> Result<bool> {
    ensure_row(pool, user_id, now).await?;
    apply_lazy_reset(pool, user_id, now).await?;

    let (used,): (i64,) =
        sqlx::query_as("SELECT daily_free_quota_used FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    Ok(used < quota_max)
}

/// Consume one free event. Returns false when the quota is exhausted.
///
/// The reset and the increment are separate statements, but the increment is
/// guarded by `used < quota_max`, so a reset-then-increment in the same call
/// never double-counts and concurrent calls never push past the maximum.
pub async fn record_consumption(
    pool: &SqlitePool,
    user_id: &str,
    now: i64,
    quota_max: i64,
) -> Result<bool> {
    ensure_row(pool, user_id, now).await?;
    apply_lazy_reset(pool, user_id, now).await?;

    let result = sqlx::query(
        r#"
        UPDATE users
        SET daily_free_quota_used = daily_free_quota_used + 1, updated_at = ?
        WHERE user_id = ? AND daily_free_quota_used < ?
        "#,
    )
    .bind(now)
    .bind(user_id)
    .bind(quota_max)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
