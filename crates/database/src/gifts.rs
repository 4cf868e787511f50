//! Gift transaction ledger.

use sqlx::SqlitePool;
use tracing::info;

use crate::models::GiftTransaction;
use crate::Result;

/// Transaction status for a confirmed purchase.
pub const STATUS_SUCCESSFUL: &str = "successful";

/// Record a confirmed purchase, idempotently.
///
/// The provider charge id is the idempotency key: replaying the same
/// confirmation inserts nothing and returns false, so the caller can skip
/// the thank-you sequence on duplicates.
pub async fn insert_successful(
    pool: &SqlitePool,
    user_id: &str,
    item_code: &str,
    price_units: i64,
    currency: &str,
    provider_charge_id: &str,
    raw_payload: Option<&str>,
    now: i64,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO gift_transactions
            (user_id, item_code, price_units, currency, provider_charge_id, status,
             raw_payload, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(provider_charge_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(item_code)
    .bind(price_units)
    .bind(currency)
    .bind(provider_charge_id)
    .bind(STATUS_SUCCESSFUL)
    .bind(raw_payload)
    .bind(now)
    .execute(pool)
    .await?;

    let inserted = result.rows_affected() > 0;
    if inserted {
        info!(
            "Recorded gift transaction {} for user {} ({} {} {})",
            provider_charge_id, user_id, item_code, price_units, currency
        );
    }

    Ok(inserted)
}

/// Look up a transaction by its provider charge id.
pub async fn get_by_charge_id(
    pool: &SqlitePool,
    provider_charge_id: &str,
) -> Result<Option<GiftTransaction>> {
    let record = sqlx::query_as::<_, GiftTransaction>(
        r#"
        SELECT id, user_id, item_code, price_units, currency, provider_charge_id,
               status, raw_payload, created_at
        FROM gift_transactions
        WHERE provider_charge_id = ?
        "#,
    )
    .bind(provider_charge_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// All transactions for a user, newest first.
pub async fn list_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<GiftTransaction>> {
    let records = sqlx::query_as::<_, GiftTransaction>(
        r#"
        SELECT id, user_id, item_code, price_units, currency, provider_charge_id,
               status, raw_payload, created_at
        FROM gift_transactions
        WHERE user_id = ?
        ORDER BY id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(records)
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
    async fn test_insert_and_lookup() {
        let db = test_db().await;

        let inserted = insert_successful(
            db.pool(),
            "42",
            "wine",
            250,
            "XTR",
            "charge-1",
            Some(r#"{"ok":true}"#),
            NOW,
        )
        .await
        .unwrap();
        assert!(inserted);

        let tx = get_by_charge_id(db.pool(), "charge-1").await.unwrap().unwrap();
        assert_eq!(tx.item_code, "wine");
        assert_eq!(tx.price_units, 250);
        assert_eq!(tx.status, STATUS_SUCCESSFUL);
    }

    #[tokio::test]
    async fn test_replay_is_idempotent() {
        let db = test_db().await;

        assert!(
            insert_successful(db.pool(), "42", "beer", 50, "XTR", "charge-2", None, NOW)
                .await
                .unwrap()
        );
        // Same charge id again: no duplicate row, caller told it was a replay.
        assert!(
            !insert_successful(db.pool(), "42", "beer", 50, "XTR", "charge-2", None, NOW + 5)
                .await
                .unwrap()
        );

        assert_eq!(list_for_user(db.pool(), "42").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_charge() {
        let db = test_db().await;
        assert!(get_by_charge_id(db.pool(), "nope").await.unwrap().is_none());
    }
}
