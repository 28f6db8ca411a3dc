//! This module provides a concrete implementation of the repository using
//! SQLite.

use std::str::FromStr;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;

mod app_repository;
mod dedup_store;

pub use dedup_store::SqliteDedupStore;

use crate::persistence::error::PersistenceError;

/// SQLite-backed repository holding the shared connection pool.
pub struct SqliteRepository {
    /// The SQLite connection pool used for database operations.
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connects to the database at `database_url`, creating the file if it
    /// does not exist. Foreign keys are enabled so deleting a service removes
    /// its check history.
    #[tracing::instrument(level = "info")]
    pub async fn new(database_url: &str) -> Result<Self, PersistenceError> {
        tracing::debug!(database_url, "Attempting to connect to SQLite database.");
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| PersistenceError::InvalidInput(e.to_string()))?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePool::connect_with(options).await.map_err(|e| {
            PersistenceError::OperationFailed(format!("Failed to connect to database: {}", e))
        })?;
        tracing::info!(database_url, "Successfully connected to SQLite database.");
        Ok(Self { pool })
    }

    /// Runs database migrations.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn run_migrations(&self) -> Result<(), PersistenceError> {
        sqlx::migrate!("./migrations").run(&self.pool).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run database migrations.");
            PersistenceError::MigrationError(e.to_string())
        })?;
        tracing::info!("Database migrations completed successfully.");
        Ok(())
    }

    /// Gets access to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the connection pool gracefully.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("SQLite connection pool closed.");
    }

    /// Helper to execute database queries with consistent error handling
    async fn execute_query_with_error_handling<F, T, E>(
        &self,
        operation: &str,
        query_fn: F,
    ) -> Result<T, PersistenceError>
    where
        F: std::future::Future<Output = Result<T, E>>,
        E: std::error::Error,
    {
        query_fn.await.map_err(|e| {
            tracing::error!(error = %e, operation = %operation, "Database operation failed.");
            PersistenceError::OperationFailed(e.to_string())
        })
    }
}
