//! User profile storage.

use sqlx::SqlitePool;
use tracing::debug;

use crate::models::{Gender, UserProfile};
use crate::{DatabaseError, Result};

const PROFILE_COLUMNS: &str = "user_id, conversation_id, display_name, gender, preference_tags, \
     age_hint, daily_free_quota_used, quota_reset_at, last_inbound_at, last_quick_prompt_at, \
     last_daily_prompt_at, quick_prompt_pending, last_stats_reminder_at, last_overuse_warning_at, \
     created_at, updated_at";

/// Upsert a profile for an inbound message (create-on-first-sight).
///
/// Refreshes the delivery destination and display name, stamps
/// `last_inbound_at` and clears `quick_prompt_pending` in the same statement,
/// so a new inbound message atomically resets quick-prompt eligibility.
pub async fn upsert_on_inbound(
    pool: &SqlitePool,
    user_id: &str,
    conversation_id: &str,
    display_name: Option<&str>,
    now: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (user_id, conversation_id, display_name, quota_reset_at,
                           last_inbound_at, quick_prompt_pending, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, 0, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            conversation_id = excluded.conversation_id,
            display_name = COALESCE(excluded.display_name, users.display_name),
            last_inbound_at = excluded.last_inbound_at,
            quick_prompt_pending = 0,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(user_id)
    .bind(conversation_id)
    .bind(display_name)
    .bind(now)
    .bind(now)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    debug!("Upserted profile for user {}", user_id);
    Ok(())
}

/// Get a user's profile.
pub async fn get_profile(pool: &SqlitePool, user_id: &str) -> Result<Option<UserProfile>> {
    let record = sqlx::query_as::<_, UserProfile>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM users WHERE user_id = ?"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Get a user's profile, erroring when it does not exist.
pub async fn require_profile(pool: &SqlitePool, user_id: &str) -> Result<UserProfile> {
    get_profile(pool, user_id)
        .await?
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "user",
            id: user_id.to_string(),
        })
}

/// Set the age hint. Values outside 1-120 are rejected.
pub async fn set_age_hint(pool: &SqlitePool, user_id: &str, age: i64, now: i64) -> Result<()> {
    if !(1..=120).contains(&age) {
        return Err(DatabaseError::Invalid {
            field: "age_hint",
            reason: format!("{} outside 1-120", age),
        });
    }

    sqlx::query("UPDATE users SET age_hint = ?, updated_at = ? WHERE user_id = ?")
        .bind(age)
        .bind(now)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Replace the preference tags (last write wins).
pub async fn set_preference_tags(
    pool: &SqlitePool,
    user_id: &str,
    tags: &str,
    now: i64,
) -> Result<()> {
    sqlx::query("UPDATE users SET preference_tags = ?, updated_at = ? WHERE user_id = ?")
        .bind(tags)
        .bind(now)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Set the inferred gender, but only while it is still unknown.
///
/// Returns true if the row was updated. The conditional keeps the
/// "derived once" invariant under concurrent handlers.
pub async fn set_gender_if_unknown(
    pool: &SqlitePool,
    user_id: &str,
    gender: Gender,
    now: i64,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE users SET gender = ?, updated_at = ? WHERE user_id = ? AND gender = 'unknown'",
    )
    .bind(gender)
    .bind(now)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Whether the stats-feature reminder is due (never sent, or >24h ago).
pub async fn stats_reminder_due(pool: &SqlitePool, user_id: &str, now: i64) -> Result<bool> {
    let row: Option<(Option<i64>,)> =
        sqlx::query_as("SELECT last_stats_reminder_at FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    Ok(match row {
        Some((Some(sent_at),)) => now - sent_at > crate::DAY_SECS,
        Some((None,)) => true,
        None => false,
    })
}

/// Record that the stats-feature reminder was sent.
pub async fn mark_stats_reminder(pool: &SqlitePool, user_id: &str, now: i64) -> Result<()> {
    sqlx::query("UPDATE users SET last_stats_reminder_at = ?, updated_at = ? WHERE user_id = ?")
        .bind(now)
        .bind(now)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Whether the overuse warning has not yet been sent within the current day.
pub async fn overuse_warning_due(pool: &SqlitePool, user_id: &str, now: i64) -> Result<bool> {
    let row: Option<(Option<i64>,)> =
        sqlx::query_as("SELECT last_overuse_warning_at FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    Ok(match row {
        Some((Some(sent_at),)) => now - sent_at >= crate::DAY_SECS,
        Some((None,)) => true,
        None => false,
    })
}

/// Record that the overuse warning was sent. Conditional so two concurrent
/// handlers can't both claim the warning for the same day.
pub async fn mark_overuse_warning(pool: &SqlitePool, user_id: &str, now: i64) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE users SET last_overuse_warning_at = ?, updated_at = ?
        WHERE user_id = ?
          AND (last_overuse_warning_at IS NULL OR ? - last_overuse_warning_at >= ?)
        "#,
    )
    .bind(now)
    .bind(now)
    .bind(user_id)
    .bind(now)
    .bind(crate::DAY_SECS)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    const NOW: i64 = 1_700_000_000;

    async fn test_db() -> Database {
        Database::connect_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_upsert_creates_then_updates() {
        let db = test_db().await;

        upsert_on_inbound(db.pool(), "42", "42", Some("Ivan"), NOW)
            .await
            .unwrap();
        let profile = require_profile(db.pool(), "42").await.unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("Ivan"));
        assert_eq!(profile.gender, Gender::Unknown);
        assert_eq!(profile.last_inbound_at, NOW);
        assert!(!profile.quick_prompt_pending);

        // A later message without a display name keeps the stored one.
        upsert_on_inbound(db.pool(), "42", "chat-9", None, NOW + 60)
            .await
            .unwrap();
        let profile = require_profile(db.pool(), "42").await.unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("Ivan"));
        assert_eq!(profile.conversation_id, "chat-9");
        assert_eq!(profile.last_inbound_at, NOW + 60);
    }

    #[tokio::test]
    async fn test_upsert_clears_quick_prompt_flag() {
        let db = test_db().await;

        upsert_on_inbound(db.pool(), "42", "42", None, NOW).await.unwrap();
        sqlx::query("UPDATE users SET quick_prompt_pending = 1 WHERE user_id = '42'")
            .execute(db.pool())
            .await
            .unwrap();

        upsert_on_inbound(db.pool(), "42", "42", None, NOW + 10)
            .await
            .unwrap();
        let profile = require_profile(db.pool(), "42").await.unwrap();
        assert!(!profile.quick_prompt_pending);
    }

    #[tokio::test]
    async fn test_age_hint_bounds() {
        let db = test_db().await;
        upsert_on_inbound(db.pool(), "42", "42", None, NOW).await.unwrap();

        set_age_hint(db.pool(), "42", 25, NOW).await.unwrap();
        let profile = require_profile(db.pool(), "42").await.unwrap();
        assert_eq!(profile.age_hint, Some(25));

        assert!(set_age_hint(db.pool(), "42", 0, NOW).await.is_err());
        assert!(set_age_hint(db.pool(), "42", 121, NOW).await.is_err());
    }

    #[tokio::test]
    async fn test_gender_set_only_once() {
        let db = test_db().await;
        upsert_on_inbound(db.pool(), "42", "42", None, NOW).await.unwrap();

        assert!(set_gender_if_unknown(db.pool(), "42", Gender::Female, NOW)
            .await
            .unwrap());
        // Second derivation must not overwrite.
        assert!(!set_gender_if_unknown(db.pool(), "42", Gender::Male, NOW)
            .await
            .unwrap());

        let profile = require_profile(db.pool(), "42").await.unwrap();
        assert_eq!(profile.gender, Gender::Female);
    }

    #[tokio::test]
    async fn test_stats_reminder_window() {
        let db = test_db().await;
        upsert_on_inbound(db.pool(), "42", "42", None, NOW).await.unwrap();

        // Never told yet.
        assert!(stats_reminder_due(db.pool(), "42", NOW).await.unwrap());

        mark_stats_reminder(db.pool(), "42", NOW).await.unwrap();
        assert!(!stats_reminder_due(db.pool(), "42", NOW + 100).await.unwrap());
        assert!(stats_reminder_due(db.pool(), "42", NOW + crate::DAY_SECS + 1)
            .await
            .unwrap());

        // Unknown user is never due.
        assert!(!stats_reminder_due(db.pool(), "nobody", NOW).await.unwrap());
    }

    #[tokio::test]
    async fn test_overuse_warning_claimed_once_per_day() {
        let db = test_db().await;
        upsert_on_inbound(db.pool(), "42", "42", None, NOW).await.unwrap();

        assert!(overuse_warning_due(db.pool(), "42", NOW).await.unwrap());
        assert!(mark_overuse_warning(db.pool(), "42", NOW).await.unwrap());
        // Second claim in the same window fails.
        assert!(!mark_overuse_warning(db.pool(), "42", NOW + 60).await.unwrap());
        assert!(!overuse_warning_due(db.pool(), "42", NOW + 60).await.unwrap());
        // Next day reopens.
        assert!(mark_overuse_warning(db.pool(), "42", NOW + crate::DAY_SECS)
            .await
            .unwrap());
    }
}
