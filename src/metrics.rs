use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use serde::Serialize;

/// Request counters for observability.
/// All metrics are atomic counters for thread-safety
#[derive(Clone, Default)]
pub struct Metrics {
    /// Dashboard reads served
    pub dashboard_requests: Arc<AtomicU64>,
    /// Dashboard reads answered with a hidden (locked) suggestion
    pub locked_reads: Arc<AtomicU64>,
    /// Dev overrides honoured (day offset or lock bypass)
    pub overrides_applied: Arc<AtomicU64>,
    /// Lock-today calls
    pub locks_total: Arc<AtomicU64>,
    /// Unlock-today calls
    pub unlocks_total: Arc<AtomicU64>,
    /// Reviews and skips written back to the record store
    pub reviews_total: Arc<AtomicU64>,
    /// Failed requests
    pub errors_total: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub dashboard_requests: u64,
    pub locked_reads: u64,
    pub overrides_applied: u64,
    pub locks_total: u64,
    pub unlocks_total: u64,
    pub reviews_total: u64,
    pub errors_total: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_dashboard(&self, locked: bool) {
        self.dashboard_requests.fetch_add(1, Ordering::Relaxed);
        if locked {
            self.locked_reads.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_override(&self) {
        self.overrides_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lock(&self) {
        self.locks_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unlock(&self) {
        self.unlocks_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_review(&self) {
        self.reviews_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            dashboard_requests: self.dashboard_requests.load(Ordering::Relaxed),
            locked_reads: self.locked_reads.load(Ordering::Relaxed),
            overrides_applied: self.overrides_applied.load(Ordering::Relaxed),
            locks_total: self.locks_total.load(Ordering::Relaxed),
            unlocks_total: self.unlocks_total.load(Ordering::Relaxed),
            reviews_total: self.reviews_total.load(Ordering::Relaxed),
            errors_total: self.errors_total.load(Ordering::Relaxed),
        }
    }
}
