//! # ss-local-sqlite
//!
//! SQLite implementation of `LocalStore`: one row per logical key, the value
//! being the JSON document the facade wrote.

use async_trait::async_trait;
use chrono::Utc;
use ss_core::traits::{LocalKey, LocalStore};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tracing::info;

pub struct SqliteLocalStore {
    pool: SqlitePool,
}

impl SqliteLocalStore {
    /// Opens (creating if needed) the database at `url` and ensures the
    /// schema exists. Accepts `sqlite::memory:` for throwaway stores.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // A single connection keeps `:memory:` databases shared.
        let pool = SqlitePoolOptions::new().max_connections(1).connect_with(options).await?;
        Self::setup_schema(&pool).await?;
        info!(url, "Local fallback store ready");
        Ok(Self { pool })
    }

    async fn setup_schema(pool: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS local_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl LocalStore for SqliteLocalStore {
    async fn get(&self, key: LocalKey) -> anyhow::Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM local_store WHERE key = ?")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|row| row.get::<String, _>("value")))
    }

    /// Upsert: the latest write for a key wins.
    async fn set(&self, key: LocalKey, value: &str) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO local_store (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key.as_str())
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear(&self, key: LocalKey) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM local_store WHERE key = ?")
            .bind(key.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
