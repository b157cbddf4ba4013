//! # Tile Fetch Bench
//!
//! A network-throughput benchmarking harness that measures download
//! performance for a fixed batch of tile-metadata resources under different
//! concurrency strategies.
//!
//! ## Strategies
//!
//! - **Multiplexed**: delegate the whole batch to a single external
//!   `curl --parallel` invocation over multiplexed connections
//! - **Spawn-per-request**: one spawned task per URL, deliberately unbounded
//! - **Pooled, shared client**: a bounded worker pool reusing one persistent
//!   HTTP client across all requests
//! - **Pooled, isolated client**: the same bounded pool, but a freshly built
//!   client per request, characterizing connection-reuse overhead
//!
//! All four satisfy the same contract: one logical GET per URL, the full
//! header set on every request, wall-clock timing from first dispatch to last
//! response consumed, and a summary that counts only the bytes of requests
//! that actually succeeded. A failing request never aborts its siblings.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tile_fetch_bench::provision::{RequestHeaderSet, UrlBatch, DEFAULT_BASE_RESOURCES};
//! use tile_fetch_bench::strategy::{PooledConfig, PooledShared, TransportStrategy};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let headers = RequestHeaderSet::standard("my-access-token");
//! let batch = UrlBatch::build(&DEFAULT_BASE_RESOURCES, "session=abc123");
//!
//! let strategy = PooledShared::new(PooledConfig::default());
//! let summary = strategy.execute(&batch, &headers).await?;
//! println!("{}", summary.render(&strategy.describe(&batch, &headers)));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`provision`] - Header set and URL batch construction (pure, no I/O)
//! - [`transport`] - HTTP transport seam and error classification
//! - [`strategy`] - The four transport strategies
//! - [`metrics`] - Concurrency-safe byte aggregation
//! - [`report`] - Run summaries and throughput computation

#![warn(missing_docs)]
#![warn(clippy::all)]

/// CLI command implementations
pub mod cli;

/// Aggregate run metrics
pub mod metrics;

/// Header set and URL batch construction
pub mod provision;

/// Run summaries and throughput reporting
pub mod report;

/// Transport strategies
pub mod strategy;

/// HTTP transport seam
pub mod transport;

// Re-export commonly used types
pub use provision::{RequestHeaderSet, UrlBatch};
pub use report::RunSummary;
pub use strategy::StrategyKind;

/// Terminal state of a single fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    /// The request completed with a 2xx status code.
    Success {
        /// HTTP status code of the response
        code: u16,
    },
    /// The request failed; the classification describes how.
    Failed {
        /// Failure classification, e.g. "exception: timeout" or "status: 503"
        classification: String,
    },
}

/// Per-request outcome: payload byte length plus a status indicator.
///
/// Created when a request reaches a terminal state and consumed immediately
/// by the aggregator; failed fetches always carry zero bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    bytes: u64,
    status: FetchStatus,
}

impl FetchOutcome {
    /// Outcome of a request that completed successfully.
    pub fn success(bytes: u64, code: u16) -> Self {
        Self {
            bytes,
            status: FetchStatus::Success { code },
        }
    }

    /// Outcome of a request that failed, with its classification.
    pub fn failed(classification: impl Into<String>) -> Self {
        Self {
            bytes: 0,
            status: FetchStatus::Failed {
                classification: classification.into(),
            },
        }
    }

    /// Whether the request completed successfully.
    pub fn is_success(&self) -> bool {
        matches!(self.status, FetchStatus::Success { .. })
    }

    /// Payload byte length. Zero for failed fetches.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Status indicator for this fetch.
    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    /// Failure classification, if this fetch failed.
    pub fn classification(&self) -> Option<&str> {
        match &self.status {
            FetchStatus::Failed { classification } => Some(classification),
            FetchStatus::Success { .. } => None,
        }
    }
}
