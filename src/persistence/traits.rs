//! Repository contract for services and their check history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;

use crate::models::{Check, NewService, Service};
use crate::persistence::error::PersistenceError;

/// Storage interface consumed by the scheduler, the probe executor and the
/// HTTP API.
///
/// Reads over the check history must be snapshot-consistent: a query never
/// observes a row whose derived metrics columns are only partially written.
/// The SQLite implementation satisfies this with single-statement inserts.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AppRepository: Send + Sync {
    /// Registers a new service and returns the stored row with its id.
    async fn insert_service(&self, service: NewService) -> Result<Service, PersistenceError>;

    /// Fetches one service by id.
    async fn get_service(&self, id: i64) -> Result<Option<Service>, PersistenceError>;

    /// Lists all registered services.
    async fn list_services(&self) -> Result<Vec<Service>, PersistenceError>;

    /// Removes a service and, transitively, its check history. Returns whether
    /// a row was deleted.
    async fn delete_service(&self, id: i64) -> Result<bool, PersistenceError>;

    /// Persists one check and returns the stored row with its id.
    async fn insert_check(&self, check: Check) -> Result<Check, PersistenceError>;

    /// Returns the checks for a service with `timestamp >= since`, oldest
    /// first.
    async fn checks_since(
        &self,
        service_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<Check>, PersistenceError>;

    /// Returns the most recent checks for a service, newest first.
    async fn recent_checks(
        &self,
        service_id: i64,
        limit: i64,
    ) -> Result<Vec<Check>, PersistenceError>;
}
