//! Per-service probe scheduling.
//!
//! Every registered service owns exactly one recurring timer task. Timers are
//! fully independent: a slow or failing probe delays nothing but its own
//! service. Within one service consecutive probes are never concurrent: a
//! tick that fires while the previous probe is still running is skipped
//! rather than queued, so an overrunning probe can never build a backlog.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::engine::alerts::AlertGate;
use crate::engine::prober::ProbeExecutor;
use crate::models::Service;
use crate::persistence::traits::AppRepository;

/// Smallest allowed probe period, applied regardless of configuration.
pub const MIN_PROBE_INTERVAL_SECS: u64 = 5;

/// A scheduled probe timer for one service.
struct ScheduledProbe {
    /// Cancels this service's timer task.
    token: CancellationToken,
    /// Effective (floored) probe period.
    interval: Duration,
}

/// Owns the map from service identity to its running timer task.
///
/// Lifecycle: `init` loads all currently registered services and establishes
/// their timers; `register` adds or replaces a timer in place; `deregister`
/// cancels one; `shutdown` cancels them all.
pub struct ProbeScheduler {
    /// Source of registered services at startup.
    repo: Arc<dyn AppRepository>,
    /// Runs the probe for each tick.
    executor: Arc<ProbeExecutor>,
    /// Evaluates and dispatches alerts for each completed check.
    alerts: Arc<AlertGate>,
    /// Active timers keyed by service id.
    tasks: DashMap<i64, ScheduledProbe>,
    /// Parent token; cancelling it stops every timer.
    root_token: CancellationToken,
}

impl ProbeScheduler {
    /// Creates an empty scheduler.
    pub fn new(
        repo: Arc<dyn AppRepository>,
        executor: Arc<ProbeExecutor>,
        alerts: Arc<AlertGate>,
    ) -> Self {
        Self {
            repo,
            executor,
            alerts,
            tasks: DashMap::new(),
            root_token: CancellationToken::new(),
        }
    }

    /// Loads all registered services and establishes their timers.
    ///
    /// When the store is unreachable the scheduler starts with zero timers
    /// and keeps accepting dynamic registrations, so a storage outage at boot
    /// never requires a restart.
    pub async fn init(&self) {
        match self.repo.list_services().await {
            Ok(services) => {
                let count = services.len();
                for service in services {
                    self.register(service);
                }
                tracing::info!(count, "Scheduler initialized with registered services.");
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Could not load services from store; scheduler starting with no timers."
                );
            }
        }
    }

    /// Starts (or replaces in place) the timer for `service`.
    ///
    /// The probe period is `max(5, interval_seconds)`. Re-registering an
    /// existing id cancels the old timer and installs the new one.
    pub fn register(&self, service: Service) {
        let interval =
            Duration::from_secs((service.interval_seconds.max(0) as u64).max(MIN_PROBE_INTERVAL_SECS));
        let token = self.root_token.child_token();
        let service_id = service.id;

        let task_token = token.clone();
        let executor = Arc::clone(&self.executor);
        let alerts = Arc::clone(&self.alerts);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of a tokio interval completes immediately;
            // consume it so probing starts one period after registration.
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;

                    _ = task_token.cancelled() => break,

                    _ = ticker.tick() => {
                        match executor.execute(&service).await {
                            Ok(check) => alerts.process_check(&service, &check).await,
                            Err(e) => {
                                tracing::error!(
                                    service_id = service.id,
                                    error = %e,
                                    "Probe cycle failed."
                                );
                            }
                        }
                    }
                }
            }
            tracing::debug!(service_id, "Probe timer stopped.");
        });

        if let Some(previous) = self.tasks.insert(service_id, ScheduledProbe { token, interval }) {
            previous.token.cancel();
            tracing::info!(service_id, ?interval, "Probe timer replaced.");
        } else {
            tracing::info!(service_id, ?interval, "Probe timer scheduled.");
        }
    }

    /// Cancels the timer for a service. Returns whether one was scheduled.
    pub fn deregister(&self, service_id: i64) -> bool {
        match self.tasks.remove(&service_id) {
            Some((_, scheduled)) => {
                scheduled.token.cancel();
                tracing::info!(service_id, "Probe timer removed.");
                true
            }
            None => false,
        }
    }

    /// Whether a timer is currently scheduled for the service.
    pub fn is_scheduled(&self, service_id: i64) -> bool {
        self.tasks.contains_key(&service_id)
    }

    /// The effective probe period of a scheduled service.
    pub fn scheduled_interval(&self, service_id: i64) -> Option<Duration> {
        self.tasks.get(&service_id).map(|entry| entry.interval)
    }

    /// Number of scheduled timers.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no timers are scheduled.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Cancels every timer.
    pub fn shutdown(&self) {
        self.root_token.cancel();
        self.tasks.clear();
        tracing::info!("Scheduler shut down, all probe timers cancelled.");
    }
}
