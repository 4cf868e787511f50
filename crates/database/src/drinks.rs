//! Drink ledger: user-reported consumption events and their aggregates.

use sqlx::SqlitePool;

use crate::models::DrinkTotal;
use crate::Result;

/// Record one reported consumption event.
pub async fn insert_event(
    pool: &SqlitePool,
    user_id: &str,
    kind: &str,
    amount: i64,
    unit: &str,
    occurred_at: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO drink_events (user_id, kind, amount, unit, occurred_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(kind)
    .bind(amount)
    .bind(unit)
    .bind(occurred_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Totals since a timestamp, grouped by kind and unit, largest first.
pub async fn totals_since(
    pool: &SqlitePool,
    user_id: &str,
    since: i64,
) -> Result<Vec<DrinkTotal>> {
    let totals = sqlx::query_as::<_, DrinkTotal>(
        r#"
        SELECT kind, unit, SUM(amount) AS total
        FROM drink_events
        WHERE user_id = ? AND occurred_at >= ?
        GROUP BY kind, unit
        ORDER BY total DESC
        "#,
    )
    .bind(user_id)
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(totals)
}

/// Total units reported since a timestamp, ignoring kind and unit.
///
/// Feeds the overuse-warning threshold check.
pub async fn total_units_since(pool: &SqlitePool, user_id: &str, since: i64) -> Result<i64> {
    let (total,): (Option<i64>,) = sqlx::query_as(
        "SELECT SUM(amount) FROM drink_events WHERE user_id = ? AND occurred_at >= ?",
    )
    .bind(user_id)
    .bind(since)
    .fetch_one(pool)
    .await?;

    Ok(total.unwrap_or(0))
}
