//! The Supervisor module manages the lifecycle of the pulseatlas process.
//!
//! This module implements the **Supervisor Pattern**: one top-level owner for
//! the long-running parts of the application: the probe scheduler and the
//! HTTP API server.
//!
//! ## Responsibilities
//!
//! - **Initialization**: the `SupervisorBuilder` constructs and wires the
//!   probe pipeline (executor, alert gate, scheduler) from its collaborators.
//! - **Lifecycle Management**: `run` establishes the probe timers from the
//!   registered services and starts the API server.
//! - **Graceful Shutdown**: it listens for shutdown signals (Ctrl+C or
//!   SIGTERM), cancels every probe timer, and flushes the event publisher
//!   within a bounded cleanup window.

mod builder;

use std::sync::Arc;

pub use builder::SupervisorBuilder;
use thiserror::Error;
use tokio::signal;

use crate::config::AppConfig;
use crate::http_server::{self, AppState};
use crate::metrics::ProbeMetrics;
use crate::persistence::traits::AppRepository;
use crate::publisher::EventPublisher;
use crate::scheduler::ProbeScheduler;

/// Represents the set of errors that can occur during the supervisor's
/// operation.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A required configuration was not provided to the `SupervisorBuilder`.
    #[error("Missing configuration for Supervisor")]
    MissingConfig,

    /// A repository was not provided to the `SupervisorBuilder`.
    #[error("Missing repository for Supervisor")]
    MissingRepository,

    /// A dedup store was not provided to the `SupervisorBuilder`.
    #[error("Missing dedup store for Supervisor")]
    MissingDedupStore,

    /// An event publisher was not provided to the `SupervisorBuilder`.
    #[error("Missing event publisher for Supervisor")]
    MissingPublisher,

    /// A notification service was not provided to the `SupervisorBuilder`.
    #[error("Missing notification service for Supervisor")]
    MissingNotifier,

    /// The Prometheus instruments could not be registered.
    #[error("Failed to register probe metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// The primary runtime manager for the application.
///
/// The Supervisor owns the scheduler and the API server and is responsible
/// for their startup, shutdown, and health monitoring. Once `run` is called,
/// it becomes the main process loop for the entire application.
pub struct Supervisor {
    /// Shared application configuration.
    config: Arc<AppConfig>,

    /// Service and check storage, shared with the API server.
    repo: Arc<dyn AppRepository>,

    /// The per-service probe scheduler.
    scheduler: Arc<ProbeScheduler>,

    /// The event publisher, flushed on shutdown.
    publisher: Arc<dyn EventPublisher>,

    /// Prometheus instruments, exposed by the API server.
    metrics: Arc<ProbeMetrics>,

    /// A token used to signal a graceful shutdown to all supervised tasks.
    cancellation_token: tokio_util::sync::CancellationToken,

    /// A set of all spawned tasks that the supervisor is actively managing.
    join_set: tokio::task::JoinSet<()>,
}

impl Supervisor {
    /// Returns a new `SupervisorBuilder` instance.
    ///
    /// This is the public entry point for creating a supervisor.
    pub fn builder() -> SupervisorBuilder {
        SupervisorBuilder::new()
    }

    /// Starts the supervisor and all its managed services.
    ///
    /// This method is the main entry point for the application's runtime. It
    /// performs the following steps:
    /// 1. Spawns a signal handler to listen for `SIGINT` (Ctrl+C) and
    ///    `SIGTERM`.
    /// 2. Establishes probe timers for every registered service.
    /// 3. Spawns the HTTP API server when enabled.
    /// 4. Monitors the health of all spawned tasks via the `JoinSet` until a
    ///    shutdown is requested.
    /// 5. Upon shutdown, cancels all probe timers and flushes the event
    ///    publisher within the configured cleanup timeout.
    pub async fn run(mut self) -> Result<(), SupervisorError> {
        // Clone the token for the signal handler task.
        let cancellation_token = self.cancellation_token.clone();

        // Spawn a task to listen for shutdown signals.
        self.join_set.spawn(async move {
            let ctrl_c = signal::ctrl_c();
            #[cfg(unix)]
            let terminate = async {
                signal::unix::signal(signal::unix::SignalKind::terminate())
                    .expect("Failed to register SIGTERM handler")
                    .recv()
                    .await;
            };
            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => tracing::info!("SIGINT (Ctrl+C) received, initiating graceful shutdown."),
                _ = terminate => tracing::info!("SIGTERM received, initiating graceful shutdown."),
            }

            // Notify all other tasks to begin shutting down.
            cancellation_token.cancel();
        });

        // Establish the probe timers before accepting registration changes
        // over the API.
        self.scheduler.init().await;

        // Spawn the HTTP server as a background task when enabled.
        if self.config.server.enabled {
            let server_config = Arc::clone(&self.config);
            let http_cancellation_token = self.cancellation_token.clone();
            let state = AppState {
                repo: Arc::clone(&self.repo),
                scheduler: Arc::clone(&self.scheduler),
                metrics: Arc::clone(&self.metrics),
            };
            self.join_set.spawn(async move {
                tokio::select! {
                    _ = http_server::run_server_from_config(server_config, state) => {},
                    _ = http_cancellation_token.cancelled() => {
                        tracing::info!("HTTP server received shutdown signal.");
                    }
                }
            });
        }

        // --- Main Supervisor Loop ---

        loop {
            tokio::select! {
                maybe_result = self.join_set.join_next() => {
                    match maybe_result {
                        Some(Ok(_)) => {
                            // Task completed successfully, continue monitoring.
                        }
                        Some(Err(e)) => {
                            tracing::error!("A critical task failed: {:?}. Initiating shutdown.", e);
                            self.cancellation_token.cancel();
                        }
                        None => {
                            // All tasks have completed.
                            break;
                        }
                    }
                }
                _ = self.cancellation_token.cancelled() => {
                    // Cancellation requested externally, break the loop.
                    break;
                }
            }
        }

        // --- Graceful Shutdown ---

        self.join_set.shutdown().await;
        tracing::info!("All supervised tasks have completed.");

        let shutdown_timeout = self.config.shutdown_timeout;
        let cleanup_logic = async {
            self.scheduler.shutdown();

            if let Err(e) = self.publisher.flush(shutdown_timeout).await {
                tracing::error!(error = %e, "Failed to flush pending events, but continuing cleanup.");
            }
        };

        if tokio::time::timeout(shutdown_timeout, cleanup_logic).await.is_err() {
            tracing::warn!(
                "Cleanup did not complete within the timeout of {:?}. Continuing shutdown.",
                shutdown_timeout
            );
        } else {
            tracing::info!("Cleanup completed successfully.");
        }

        tracing::info!("Supervisor shutdown complete.");
        Ok(())
    }
}
