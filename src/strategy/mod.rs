//! Transport strategies.
//!
//! Four interchangeable concurrency disciplines fetch the same URL batch:
//!
//! 1. [`multiplexed::MultiplexedStrategy`] - one external `curl --parallel`
//!    invocation for the whole batch
//! 2. [`spawn_per_request::SpawnPerRequest`] - one spawned task per URL,
//!    deliberately unbounded (the comparison baseline, not an oversight)
//! 3. [`pooled_shared::PooledShared`] - bounded pool, one persistent client
//! 4. [`pooled_isolated::PooledIsolated`] - bounded pool, fresh client per
//!    request
//!
//! Every strategy satisfies the same contract from the caller's perspective:
//! strategy choice changes timing, never correctness. Individual fetch
//! failures are classified and logged where they occur, contribute zero
//! bytes, and never escape [`TransportStrategy::execute`]; only a failure of
//! the concurrency primitive itself aborts the run.

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::provision::{RequestHeaderSet, UrlBatch};
use crate::report::RunSummary;
use crate::transport::{HttpTransport, TransportError};
use crate::FetchOutcome;

pub mod multiplexed;
pub mod pooled_isolated;
pub mod pooled_shared;
pub mod spawn_per_request;

pub use multiplexed::{CurlTransfer, MultiplexedStrategy, MultiplexedTransfer};
pub use pooled_isolated::PooledIsolated;
pub use pooled_shared::PooledShared;
pub use spawn_per_request::SpawnPerRequest;

/// Default bound on concurrent in-flight requests for the pooled variants.
///
/// The effective worker count is always `min(max_workers, batch_len)`.
pub const DEFAULT_MAX_WORKERS: usize = 100;

/// Strategy errors. Only catastrophic failures of the concurrency primitive
/// itself surface here; per-request failures are recovered locally.
#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    /// Transport setup failure (client build, header encoding)
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A spawned task panicked or was cancelled before joining
    #[error("task join error: {0}")]
    TaskJoin(String),

    /// The external transfer process could not be started
    #[error("process error: {0}")]
    Process(String),
}

/// Configuration for the bounded-pool variants.
#[derive(Debug, Clone)]
pub struct PooledConfig {
    /// Maximum concurrent in-flight requests (bounded by batch size)
    pub max_workers: usize,
    /// Optional per-request timeout. Defaults to none: a hung request stalls
    /// the run, matching the measured client's behavior.
    pub request_timeout: Option<std::time::Duration>,
}

impl Default for PooledConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            request_timeout: None,
        }
    }
}

/// The four transport strategies, as selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Single multiplexed external transfer
    Multiplexed,
    /// One spawned task per URL, unbounded
    SpawnPerRequest,
    /// Bounded pool with a shared persistent client
    PooledShared,
    /// Bounded pool with a fresh client per request
    PooledIsolated,
}

impl StrategyKind {
    /// All strategies, in the order `compare` runs them.
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Multiplexed,
        StrategyKind::SpawnPerRequest,
        StrategyKind::PooledShared,
        StrategyKind::PooledIsolated,
    ];
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StrategyKind::Multiplexed => "multiplexed",
            StrategyKind::SpawnPerRequest => "spawn",
            StrategyKind::PooledShared => "pooled-shared",
            StrategyKind::PooledIsolated => "pooled-isolated",
        };
        write!(f, "{s}")
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "multiplexed" => Ok(StrategyKind::Multiplexed),
            "spawn" => Ok(StrategyKind::SpawnPerRequest),
            "pooled-shared" => Ok(StrategyKind::PooledShared),
            "pooled-isolated" => Ok(StrategyKind::PooledIsolated),
            _ => Err(format!(
                "Invalid strategy: {s}. Valid options: multiplexed, spawn, pooled-shared, pooled-isolated"
            )),
        }
    }
}

/// Common contract every strategy implements.
#[async_trait]
pub trait TransportStrategy: Send + Sync {
    /// Short name for logs and the comparison report.
    fn name(&self) -> &'static str;

    /// Describe the constructed request for the report: the URL list by
    /// default, the equivalent external command line for the multiplexed
    /// variant.
    fn describe(&self, batch: &UrlBatch, headers: &RequestHeaderSet) -> String {
        let _ = headers;
        batch.urls().join("\n")
    }

    /// Fetch every URL in the batch per this strategy's concurrency
    /// discipline and return the finalized summary.
    ///
    /// The summary is produced only after every request has reached a
    /// terminal state. A zero-length batch yields an empty summary.
    async fn execute(
        &self,
        batch: &UrlBatch,
        headers: &RequestHeaderSet,
    ) -> Result<RunSummary, StrategyError>;
}

/// Issue one GET through the transport and fold the result into a terminal
/// [`FetchOutcome`]. Failures are classified and logged here, immediately
/// upon occurrence; nothing propagates.
pub(crate) async fn fetch_one(
    transport: &dyn HttpTransport,
    url: &str,
    headers: &RequestHeaderSet,
) -> FetchOutcome {
    match transport.get(url, headers).await {
        Ok(payload) if (200..300).contains(&payload.status) => {
            debug!(url, bytes = payload.len, status = payload.status, "fetch completed");
            FetchOutcome::success(payload.len, payload.status)
        }
        Ok(payload) => {
            let classification = format!("status: {}", payload.status);
            warn!(url, %classification, "fetch failed");
            FetchOutcome::failed(classification)
        }
        Err(e) => {
            let classification = format!("exception: {e}");
            warn!(url, %classification, "fetch failed");
            FetchOutcome::failed(classification)
        }
    }
}
