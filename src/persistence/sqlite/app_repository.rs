//! Implementation of the `AppRepository` trait for `SqliteRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Check, NewService, Service};
use crate::persistence::error::PersistenceError;
use crate::persistence::sqlite::SqliteRepository;
use crate::persistence::traits::AppRepository;

#[async_trait]
impl AppRepository for SqliteRepository {
    #[tracing::instrument(skip(self, service), level = "debug")]
    async fn insert_service(&self, service: NewService) -> Result<Service, PersistenceError> {
        let created = self
            .execute_query_with_error_handling(
                "insert service",
                sqlx::query_as::<_, Service>(
                    "INSERT INTO services (name, url, interval_seconds, timeout_seconds, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5) \
                     RETURNING id, name, url, interval_seconds, timeout_seconds, created_at",
                )
                .bind(&service.name)
                .bind(service.url.as_str())
                .bind(service.interval_seconds)
                .bind(service.timeout_seconds)
                .bind(Utc::now())
                .fetch_one(&self.pool),
            )
            .await?;

        tracing::info!(service_id = created.id, name = %created.name, "Service registered.");
        Ok(created)
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn get_service(&self, id: i64) -> Result<Option<Service>, PersistenceError> {
        self.execute_query_with_error_handling(
            "get service",
            sqlx::query_as::<_, Service>(
                "SELECT id, name, url, interval_seconds, timeout_seconds, created_at \
                 FROM services WHERE id = ?1",
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn list_services(&self) -> Result<Vec<Service>, PersistenceError> {
        self.execute_query_with_error_handling(
            "list services",
            sqlx::query_as::<_, Service>(
                "SELECT id, name, url, interval_seconds, timeout_seconds, created_at \
                 FROM services ORDER BY id",
            )
            .fetch_all(&self.pool),
        )
        .await
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn delete_service(&self, id: i64) -> Result<bool, PersistenceError> {
        let result = self
            .execute_query_with_error_handling(
                "delete service",
                sqlx::query("DELETE FROM services WHERE id = ?1").bind(id).execute(&self.pool),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self, check), level = "debug")]
    async fn insert_check(&self, check: Check) -> Result<Check, PersistenceError> {
        // A single INSERT carries the probe outcome and the full metrics
        // snapshot, so concurrent readers never observe a partially-populated
        // row.
        self.execute_query_with_error_handling(
            "insert check",
            sqlx::query_as::<_, Check>(
                "INSERT INTO checks (service_id, timestamp, status, response_time_ms, error, \
                 latency_p50_ms, latency_p95_ms, latency_p99_ms, request_rate_rpm, \
                 error_rate_percent, uptime_percent, throughput_rps, apdex_score) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13) \
                 RETURNING *",
            )
            .bind(check.service_id)
            .bind(check.timestamp)
            .bind(check.status)
            .bind(check.response_time_ms)
            .bind(&check.error)
            .bind(check.latency_p50_ms)
            .bind(check.latency_p95_ms)
            .bind(check.latency_p99_ms)
            .bind(check.request_rate_rpm)
            .bind(check.error_rate_percent)
            .bind(check.uptime_percent)
            .bind(check.throughput_rps)
            .bind(check.apdex_score)
            .fetch_one(&self.pool),
        )
        .await
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn checks_since(
        &self,
        service_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<Check>, PersistenceError> {
        self.execute_query_with_error_handling(
            "query checks since",
            sqlx::query_as::<_, Check>(
                "SELECT * FROM checks WHERE service_id = ?1 AND timestamp >= ?2 \
                 ORDER BY timestamp ASC",
            )
            .bind(service_id)
            .bind(since)
            .fetch_all(&self.pool),
        )
        .await
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn recent_checks(
        &self,
        service_id: i64,
        limit: i64,
    ) -> Result<Vec<Check>, PersistenceError> {
        self.execute_query_with_error_handling(
            "query recent checks",
            sqlx::query_as::<_, Check>(
                "SELECT * FROM checks WHERE service_id = ?1 \
                 ORDER BY timestamp DESC LIMIT ?2",
            )
            .bind(service_id)
            .bind(limit)
            .fetch_all(&self.pool),
        )
        .await
    }
}
