//! HTTP API: service registration, check history, and metrics exposition.

mod checks;
mod error;
mod services;
mod status;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

pub use checks::ServiceMetricsSummary;
pub use error::ApiError;

use crate::config::AppConfig;
use crate::metrics::ProbeMetrics;
use crate::persistence::traits::AppRepository;
use crate::scheduler::ProbeScheduler;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Service and check storage.
    pub repo: Arc<dyn AppRepository>,
    /// Scheduler kept in lockstep with service registrations.
    pub scheduler: Arc<ProbeScheduler>,
    /// Prometheus registry backing `/metrics`.
    pub metrics: Arc<ProbeMetrics>,
}

/// Builds the API router over the shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(status::health))
        .route("/metrics", get(status::metrics_exposition))
        .route("/services", post(services::create_service).get(services::list_services))
        .route("/services/:id", get(services::get_service).delete(services::delete_service))
        .route("/services/:id/checks", get(checks::list_checks))
        .route("/services/:id/metrics", get(checks::metrics_summary))
        .with_state(state)
}

/// Runs the HTTP server based on the provided application configuration.
pub async fn run_server_from_config(config: Arc<AppConfig>, state: AppState) {
    let addr: SocketAddr =
        config.server.listen_address.parse().expect("Invalid server.listen_address format");

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await.expect("Failed to bind address");
    tracing::info!(%addr, "HTTP API listening.");

    axum::serve(listener, app.into_make_service()).await.expect("Server failed");
}
