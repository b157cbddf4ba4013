//! Concurrency-safe aggregation of fetch results.
//!
//! Exactly one [`ByteCounter`] exists per run. It is owned by the driving
//! strategy and passed explicitly to every worker; increments are atomic so
//! no update is lost when requests complete concurrently.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::report::RunSummary;
use crate::FetchOutcome;

/// Running totals for one benchmark run.
///
/// Reading the totals is only meaningful after the driving strategy has
/// joined all outstanding work; values observed while fetches are still in
/// flight are unreliable intermediates and carry no consistency guarantee.
#[derive(Debug, Default)]
pub struct ByteCounter {
    bytes: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

impl ByteCounter {
    /// Create a counter with all totals at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a successfully downloaded byte count to the running total.
    pub fn add_bytes(&self, bytes: u64) {
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed fetch; contributes zero bytes.
    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a terminal fetch outcome.
    pub fn apply(&self, outcome: &FetchOutcome) {
        if outcome.is_success() {
            self.add_bytes(outcome.bytes());
        } else {
            self.record_failure();
        }
    }

    /// Total bytes across successful fetches. Valid after the join barrier.
    pub fn total_bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    /// Number of successful fetches. Valid after the join barrier.
    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    /// Number of failed fetches. Valid after the join barrier.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Freeze the totals into an immutable summary once every outstanding
    /// fetch has reached a terminal state.
    pub fn freeze(&self, elapsed: Duration, requests: usize) -> RunSummary {
        RunSummary::new(
            elapsed,
            self.total_bytes(),
            requests,
            self.succeeded() as usize,
            self.failed() as usize,
        )
    }
}
