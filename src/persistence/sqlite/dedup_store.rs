//! SQLite-backed implementation of the `DedupStore` trait.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::dedup::DedupStore;
use crate::persistence::error::PersistenceError;
use crate::persistence::sqlite::SqliteRepository;

/// Dedup markers kept in the shared database, so every process writing to the
/// same database observes the same cooldown windows.
pub struct SqliteDedupStore {
    pool: SqlitePool,
}

impl SqliteDedupStore {
    /// Creates a store sharing the repository's connection pool.
    pub fn new(repo: &SqliteRepository) -> Self {
        Self { pool: repo.pool().clone() }
    }
}

#[async_trait]
impl DedupStore for SqliteDedupStore {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn set_if_absent(&self, key: &str, ttl: Duration) -> Result<bool, PersistenceError> {
        let now_ms = Utc::now().timestamp_millis();
        let expires_at = now_ms + ttl.as_millis() as i64;

        // One conditional upsert: the insert wins when the key is absent, the
        // update only fires when the existing marker has expired. Exactly one
        // of any set of racing callers gets a changed row.
        let result = sqlx::query(
            "INSERT INTO dedup_markers (key, expires_at) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET expires_at = excluded.expires_at \
             WHERE dedup_markers.expires_at <= ?3",
        )
        .bind(key)
        .bind(expires_at)
        .bind(now_ms)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, key, "Dedup marker write failed.");
            PersistenceError::OperationFailed(e.to_string())
        })?;

        Ok(result.rows_affected() > 0)
    }
}
