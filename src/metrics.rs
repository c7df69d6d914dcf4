// Performance metrics module
//
// Lightweight counters for state traffic and load outcomes

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Process-wide counters.
///
/// Uses atomic operations for thread-safe tracking without locks. Owned by
/// [`StateManager`](crate::state::StateManager) and logged on shutdown.
#[derive(Debug)]
pub struct Metrics {
    /// Updates that changed at least one part of the state
    pub state_updates: AtomicU64,

    /// Change notifications published to subscribers
    pub state_broadcasts: AtomicU64,

    /// Snapshots forwarded to a screen by a change filter
    pub snapshots_forwarded: AtomicU64,

    /// Notifications a change filter swallowed because its snapshot was unchanged
    pub snapshots_suppressed: AtomicU64,

    pub loads_started: AtomicU64,
    pub loads_succeeded: AtomicU64,
    pub loads_failed: AtomicU64,
    pub loads_cancelled: AtomicU64,

    /// Completions dropped because a newer load had started
    pub stale_completions: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            state_updates: AtomicU64::new(0),
            state_broadcasts: AtomicU64::new(0),
            snapshots_forwarded: AtomicU64::new(0),
            snapshots_suppressed: AtomicU64::new(0),
            loads_started: AtomicU64::new(0),
            loads_succeeded: AtomicU64::new(0),
            loads_failed: AtomicU64::new(0),
            loads_cancelled: AtomicU64::new(0),
            stale_completions: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_state_update(&self) {
        self.state_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_state_broadcast(&self) {
        self.state_broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_snapshot_forwarded(&self) {
        self.snapshots_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_snapshot_suppressed(&self) {
        self.snapshots_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load_started(&self) {
        self.loads_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load_succeeded(&self) {
        self.loads_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load_failed(&self) {
        self.loads_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load_cancelled(&self) {
        self.loads_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_completion(&self) {
        self.stale_completions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Share of filter notifications that did not cause a re-render.
    pub fn suppression_ratio(&self) -> f64 {
        let forwarded = self.snapshots_forwarded.load(Ordering::Relaxed);
        let suppressed = self.snapshots_suppressed.load(Ordering::Relaxed);
        let total = forwarded + suppressed;
        if total > 0 {
            suppressed as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Loads: {} started, {} succeeded, {} failed, {} cancelled, {} stale completions",
            self.loads_started.load(Ordering::Relaxed),
            self.loads_succeeded.load(Ordering::Relaxed),
            self.loads_failed.load(Ordering::Relaxed),
            self.loads_cancelled.load(Ordering::Relaxed),
            self.stale_completions.load(Ordering::Relaxed)
        );
        tracing::info!(
            "State updates: {}, broadcasts: {}",
            self.state_updates.load(Ordering::Relaxed),
            self.state_broadcasts.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Snapshots: {} forwarded, {} suppressed ({:.0}% suppressed)",
            self.snapshots_forwarded.load(Ordering::Relaxed),
            self.snapshots_suppressed.load(Ordering::Relaxed),
            self.suppression_ratio() * 100.0
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
