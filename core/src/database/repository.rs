//! Repository layer for database operations
//!
//! Read and write whole named slots of the key-value table. There are no
//! partial updates: callers serialize the complete document themselves.

use crate::error::Result;
use chrono::Utc;
use sqlx::SqlitePool;

/// Repository for key-value slot operations
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Read the raw value stored under `key`
    pub async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    /// Replace the value stored under `key` in a single statement
    pub async fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Stored {} bytes under key {}", value.len(), key);
        Ok(())
    }

    /// Remove a slot. Returns whether anything was stored.
    pub async fn delete_value(&self, key: &str) -> Result<bool> {
        let rows = sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::debug!("Deleted key {} ({} rows)", key, rows);
        Ok(rows > 0)
    }

    /// Store `value` under a new `{prefix}.{millis}` key without touching
    /// earlier entries. Returns the key used.
    pub async fn quarantine(&self, prefix: &str, value: &str) -> Result<String> {
        let mut stamp = Utc::now().timestamp_millis();

        loop {
            let key = format!("{}.{}", prefix, stamp);
            let inserted = sqlx::query(
                "INSERT OR IGNORE INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)",
            )
            .bind(&key)
            .bind(value)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

            if inserted > 0 {
                tracing::warn!("Quarantined {} bytes under key {}", value.len(), key);
                return Ok(key);
            }
            stamp += 1;
        }
    }

    /// Entries stored by [`Repository::quarantine`] under `prefix`, oldest first
    pub async fn quarantined(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        let key_prefix = format!("{}.", prefix);
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT key, value FROM kv_store WHERE substr(key, 1, length(?)) = ? ORDER BY key ASC",
        )
        .bind(&key_prefix)
        .bind(&key_prefix)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// List stored keys in alphabetical order
    pub async fn list_keys(&self) -> Result<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM kv_store ORDER BY key ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(keys)
    }

    /// Remove every slot. Returns the number of removed slots.
    pub async fn clear_all(&self) -> Result<u64> {
        let rows = sqlx::query("DELETE FROM kv_store")
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!("Cleared {} stored keys", rows);
        Ok(rows)
    }
}
