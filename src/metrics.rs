// Store metrics
//
// Lightweight counters for how the store is being driven

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Store activity counters
///
/// Uses atomic operations so the store can record metrics through `&self`.
/// Logged on shutdown.
#[derive(Debug)]
pub struct Metrics {
    /// Mutations that produced a new snapshot
    pub mutations_applied: AtomicU64,

    /// Mutations rejected by validation
    pub mutations_rejected: AtomicU64,

    /// Successful persistence writes
    pub persist_writes: AtomicU64,

    /// Persistence writes dropped after an error
    pub persist_failures: AtomicU64,

    /// Change events sent to at least one subscriber
    pub broadcasts: AtomicU64,

    /// Change events sent while nobody was subscribed
    pub broadcast_misses: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            mutations_applied: AtomicU64::new(0),
            mutations_rejected: AtomicU64::new(0),
            persist_writes: AtomicU64::new(0),
            persist_failures: AtomicU64::new(0),
            broadcasts: AtomicU64::new(0),
            broadcast_misses: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_mutation(&self) {
        self.mutations_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejection(&self) {
        self.mutations_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persist(&self, written: bool) {
        if written {
            self.persist_writes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.persist_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_broadcast(&self, delivered: bool) {
        if delivered {
            self.broadcasts.fetch_add(1, Ordering::Relaxed);
        } else {
            self.broadcast_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Store Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Mutations: {} applied, {} rejected",
            self.mutations_applied.load(Ordering::Relaxed),
            self.mutations_rejected.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Persistence: {} writes, {} dropped",
            self.persist_writes.load(Ordering::Relaxed),
            self.persist_failures.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Broadcasts: {} delivered, {} without subscribers",
            self.broadcasts.load(Ordering::Relaxed),
            self.broadcast_misses.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
