//! SQLite persistence layer for the drinking-buddy bot.
//!
//! This crate provides async database operations for user profiles, the
//! conversation log, the drink ledger and gift transactions using SQLx with
//! SQLite. Each entity gets its own repository module of free functions over
//! a [`sqlx::SqlitePool`]; timestamps are unix epoch seconds passed in
//! explicitly so callers (and tests) control the clock.
//!
//! # Example
//!
//! ```no_run
//! use database::{profile, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:buddy.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     profile::upsert_on_inbound(db.pool(), "42", "42", Some("Ivan"), 1_700_000_000).await?;
//!     Ok(())
//! }
//! ```

pub mod conversation;
pub mod drinks;
pub mod error;
pub mod gifts;
pub mod models;
pub mod profile;
pub mod quota;
pub mod reengagement;

pub use error::{DatabaseError, Result};
pub use models::{
    ConversationTurn, DrinkEvent, DrinkTotal, Gender, GiftTransaction, PromptCandidate,
    UserProfile,
};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Seconds in the rolling daily window used by the quota and reminders.
pub const DAY_SECS: i64 = 86_400;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// Set high enough to handle concurrent webhook handlers plus schedulers.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!("Connected to database: {} (pool size: {})", url, pool_size);

        Ok(Self { pool })
    }

    /// Connect to a fresh in-memory database and run migrations.
    ///
    /// Pool size is pinned to 1 because every in-memory connection is its
    /// own database.
    pub async fn connect_in_memory() -> Result<Self> {
        let db = Self::connect_with_pool_size("sqlite::memory:", 1).await?;
        db.migrate().await?;
        Ok(db)
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_and_migrate_in_memory() {
        let db = Database::connect_in_memory().await.unwrap();

        // Schema should exist after migration.
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 0);

        db.close().await;
    }
}
