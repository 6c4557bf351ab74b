//! In-memory snapshot cache
//!
//! The controller is either cold (no snapshot yet) or warm. Reads inside the
//! TTL are served from memory without I/O; anything else runs the pipeline.
//! Snapshots are swapped whole behind an `Arc`, so concurrent readers always
//! see a complete generation. At most one refresh runs at a time.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::data::{FetchError, Snapshot};
use crate::pipeline::SnapshotSource;

/// Body served when nothing has ever been fetched and the fetch just failed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackPayload {
    pub source: &'static str,
    pub last_updated: Option<DateTime<Utc>>,
    pub perks: Vec<Value>,
    pub error: &'static str,
    /// The underlying fetch failure
    pub detail: String,
}

impl FallbackPayload {
    fn new(error: &FetchError) -> Self {
        Self {
            source: "fallback",
            last_updated: None,
            perks: Vec::new(),
            error: "Upstream fetch failed",
            detail: error.to_string(),
        }
    }
}

/// Outcome of a read through [`CacheController::read`]
#[derive(Debug, Clone)]
pub enum CacheRead {
    /// Snapshot is within TTL or was just refreshed
    Fresh(Arc<Snapshot>),
    /// Refresh failed; the previous snapshot is still held and served
    Stale { snapshot: Arc<Snapshot>, error: String },
    /// Refresh failed on a cold cache
    Fallback(FallbackPayload),
    /// Refresh failed on a warm cache in strict mode
    Unavailable(String),
}

/// Cache status as reported by the health endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheHealth {
    pub status: &'static str,
    pub cache_age_ms: Option<i64>,
    pub cached: bool,
    pub source: &'static str,
    pub source_used: Option<String>,
}

/// Owns the current snapshot and decides when to refresh it
pub struct CacheController {
    source: Box<dyn SnapshotSource>,
    ttl: chrono::Duration,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    refresh_lock: Mutex<()>,
    serve_stale: bool,
}

impl CacheController {
    /// Creates a cold cache. Out-of-range TTLs saturate to the maximum duration.
    pub fn new(source: impl SnapshotSource + 'static, ttl: Duration) -> Self {
        Self {
            source: Box::new(source),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            snapshot: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            serve_stale: true,
        }
    }

    /// In strict mode a failed refresh on a warm cache is reported as
    /// unavailable instead of serving the previous snapshot.
    pub fn strict(mut self, strict: bool) -> Self {
        self.serve_stale = !strict;
        self
    }

    /// The snapshot currently held, if any
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        match self.snapshot.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn store(&self, snapshot: Arc<Snapshot>) {
        match self.snapshot.write() {
            Ok(mut guard) => *guard = Some(snapshot),
            Err(poisoned) => *poisoned.into_inner() = Some(snapshot),
        }
    }

    /// Returns the cached snapshot when fresh, otherwise refreshes it
    ///
    /// On failure the previous snapshot is left untouched and the error is returned.
    pub async fn get(&self, force: bool) -> Result<Arc<Snapshot>, FetchError> {
        self.get_at(force, Utc::now()).await
    }

    /// [`get`](Self::get) evaluated at an explicit instant
    pub async fn get_at(&self, force: bool, now: DateTime<Utc>) -> Result<Arc<Snapshot>, FetchError> {
        if let Some(hit) = self.fresh_at(force, now) {
            return Ok(hit);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited for the lock
        if let Some(hit) = self.fresh_at(force, now) {
            return Ok(hit);
        }

        let snapshot = Arc::new(self.source.fetch_snapshot().await?);
        self.store(snapshot.clone());
        Ok(snapshot)
    }

    fn fresh_at(&self, force: bool, now: DateTime<Utc>) -> Option<Arc<Snapshot>> {
        if force {
            return None;
        }
        let current = self.current()?;
        if is_fresh(current.fetched_at, now, self.ttl) {
            debug!(fetched_at = %current.fetched_at, "cache hit");
            Some(current)
        } else {
            None
        }
    }

    /// Reads for an external caller, never failing outright on a cold cache
    pub async fn read(&self, force: bool) -> CacheRead {
        match self.get(force).await {
            Ok(snapshot) => CacheRead::Fresh(snapshot),
            Err(e) => match self.current() {
                None => {
                    warn!(error = %e, "shrine fetch failed with empty cache, serving fallback");
                    CacheRead::Fallback(FallbackPayload::new(&e))
                }
                Some(snapshot) if self.serve_stale => {
                    warn!(error = %e, fetched_at = %snapshot.fetched_at, "refresh failed, serving previous snapshot");
                    CacheRead::Stale {
                        snapshot,
                        error: e.to_string(),
                    }
                }
                Some(_) => {
                    warn!(error = %e, "refresh failed");
                    CacheRead::Unavailable(e.to_string())
                }
            },
        }
    }

    pub fn health(&self) -> CacheHealth {
        self.health_at(Utc::now())
    }

    pub fn health_at(&self, now: DateTime<Utc>) -> CacheHealth {
        let current = self.current();
        CacheHealth {
            status: "ok",
            cache_age_ms: current
                .as_ref()
                .map(|s| (now - s.fetched_at).num_milliseconds()),
            cached: current.is_some(),
            source: if current.is_some() { "cache" } else { "none" },
            source_used: current.map(|s| s.source_used.clone()),
        }
    }
}

/// A snapshot is fresh while strictly less than `ttl` old
pub fn is_fresh(fetched_at: DateTime<Utc>, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
    now - fetched_at < ttl
}
