//! Keyed, TTL-based alert suppression.
//!
//! The gate contract is a single atomic check-and-set: `set_if_absent` returns
//! `true` exactly once per key within any overlapping cooldown window, no
//! matter how many probes race on it. Two implementations exist: a
//! database-backed store shared by every process that talks to the same
//! database (see `persistence::sqlite::SqliteDedupStore`) and the in-memory
//! map below for storeless deployments and tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::persistence::error::PersistenceError;

/// Atomic TTL marker store used to suppress duplicate alerts.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Atomically sets a marker for `key` expiring after `ttl`.
    ///
    /// Returns `true` when the marker was absent (or expired) and the caller
    /// should proceed, `false` when an unexpired marker already exists and the
    /// caller must suppress.
    async fn set_if_absent(&self, key: &str, ttl: Duration) -> Result<bool, PersistenceError>;
}

/// Process-local TTL map. Markers live only as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryDedupStore {
    entries: Mutex<HashMap<String, Instant>>,
}

impl InMemoryDedupStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DedupStore for InMemoryDedupStore {
    async fn set_if_absent(&self, key: &str, ttl: Duration) -> Result<bool, PersistenceError> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        // Drop expired markers so the map does not grow with dead keys.
        entries.retain(|_, expires_at| *expires_at > now);

        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), now + ttl);
        Ok(true)
    }
}
