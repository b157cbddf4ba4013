//! Run summaries and throughput computation.
//!
//! Throughput is derived at report time from elapsed wall-clock time and the
//! aggregate byte count. A zero-duration run yields an explicit error rather
//! than infinity; the reporter never emits NaN or `inf` silently.

use serde::Serialize;
use std::time::Duration;

/// Reporting errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReportError {
    /// Elapsed time was zero; throughput is undefined
    #[error("undefined throughput: elapsed time is zero")]
    ZeroDuration,
}

/// Throughput in the three units the report prints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Throughput {
    /// Bytes per second
    pub bytes_per_sec: f64,
    /// Megabytes per second (1 MB = 1024 * 1024 bytes)
    pub megabytes_per_sec: f64,
    /// Megabits per second
    pub megabits_per_sec: f64,
}

impl Throughput {
    /// Compute throughput from elapsed time and total byte count.
    ///
    /// Fails with [`ReportError::ZeroDuration`] when `elapsed` is zero
    /// instead of dividing by zero. Byte counts are unsigned, so a negative
    /// total is unrepresentable by construction.
    pub fn compute(elapsed: Duration, total_bytes: u64) -> Result<Self, ReportError> {
        let secs = elapsed.as_secs_f64();
        if secs == 0.0 {
            return Err(ReportError::ZeroDuration);
        }

        let bytes_per_sec = total_bytes as f64 / secs;
        let megabytes_per_sec = bytes_per_sec / 1024.0 / 1024.0;
        let megabits_per_sec = megabytes_per_sec * 8.0;

        Ok(Self {
            bytes_per_sec,
            megabytes_per_sec,
            megabits_per_sec,
        })
    }
}

/// Immutable summary of one benchmark run.
///
/// Created only after every fetch in the batch has reached a terminal state;
/// a run never reports partial totals while work is still in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Wall-clock time from first dispatch to last response consumed
    pub elapsed: Duration,
    /// Total bytes across successful fetches only
    pub total_bytes: u64,
    /// Number of logical requests in the batch
    pub requests: usize,
    /// Number of fetches that completed successfully
    pub succeeded: usize,
    /// Number of fetches that failed (classified and logged at occurrence)
    pub failed: usize,
}

impl RunSummary {
    /// Create a summary from finalized totals.
    pub fn new(
        elapsed: Duration,
        total_bytes: u64,
        requests: usize,
        succeeded: usize,
        failed: usize,
    ) -> Self {
        Self {
            elapsed,
            total_bytes,
            requests,
            succeeded,
            failed,
        }
    }

    /// Summary for a zero-length batch: no bytes, no elapsed time.
    pub fn empty() -> Self {
        Self::new(Duration::ZERO, 0, 0, 0, 0)
    }

    /// Elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    /// Derive throughput figures, failing explicitly on a zero-duration run.
    pub fn throughput(&self) -> Result<Throughput, ReportError> {
        Throughput::compute(self.elapsed, self.total_bytes)
    }

    /// Render the human-readable multi-line report.
    ///
    /// `request` describes the constructed request: the URL list for
    /// in-process strategies, the equivalent external command line for the
    /// multiplexed variant.
    pub fn render(&self, request: &str) -> String {
        let mut lines = Vec::new();
        lines.push(format!("Request:\n{request}"));
        lines.push(String::new());
        lines.push(format!("Bytes downloaded: {}", self.total_bytes));
        lines.push(format!(
            "Requests: {} ({} succeeded, {} failed)",
            self.requests, self.succeeded, self.failed
        ));
        lines.push(format!("Elapsed time: {:.4} milliseconds", self.elapsed_ms()));
        lines.push(String::new());

        match self.throughput() {
            Ok(throughput) => {
                lines.push(format!("Bytes / second: {:.2}", throughput.bytes_per_sec));
                lines.push(format!(
                    "Megabytes / second: {:.4}",
                    throughput.megabytes_per_sec
                ));
                lines.push(format!(
                    "Megabits / second: {:.4}",
                    throughput.megabits_per_sec
                ));
            }
            Err(e) => lines.push(format!("Throughput: {e}")),
        }

        lines.join("\n")
    }
}
