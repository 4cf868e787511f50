//! Append-only conversation log.

use sqlx::SqlitePool;

use crate::models::ConversationTurn;
use crate::Result;

/// Append one turn to a conversation.
pub async fn append_turn(
    pool: &SqlitePool,
    conversation_id: &str,
    role: &str,
    content: &str,
    side_signal: Option<&str>,
    now: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO conversation_turns (conversation_id, role, content, side_signal, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(conversation_id)
    .bind(role)
    .bind(content)
    .bind(side_signal)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(())
}

/// The most recent `limit` turns, oldest first.
///
/// Older turns stay in the table but are never read back; only this bounded
/// window feeds the model.
pub async fn recent_turns(
    pool: &SqlitePool,
    conversation_id: &str,
    limit: i64,
) -> Result<Vec<ConversationTurn>> {
    let turns = sqlx::query_as::<_, ConversationTurn>(
        r#"
        SELECT id, conversation_id, role, content, side_signal, created_at
        FROM (
            SELECT id, conversation_id, role, content, side_signal, created_at
            FROM conversation_turns
            WHERE conversation_id = ?
            ORDER BY id DESC
            LIMIT ?
        )
        ORDER BY id ASC
        "#,
    )
    .bind(conversation_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(turns)
}

/// Count all turns in a conversation.
pub async fn turn_count(pool: &SqlitePool, conversation_id: &str) -> Result<i64> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM conversation_turns WHERE conversation_id = ?")
            .bind(conversation_id)
            .fetch_one(pool)
            .await?;

    Ok(count)
}
