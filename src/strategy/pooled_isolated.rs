//! Bounded worker pool with a fresh client per request.
//!
//! Identical pool discipline to the shared-session variant, but every fetch
//! builds its own client and connection pool, characterizing the cost of
//! connection setup versus reuse. A per-request client build failure is
//! classified as that fetch's failure; it never aborts siblings.

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use std::time::Instant;
use tracing::{info, warn};

use crate::metrics::ByteCounter;
use crate::provision::{RequestHeaderSet, UrlBatch};
use crate::report::RunSummary;
use crate::strategy::{fetch_one, PooledConfig, StrategyError, TransportStrategy};
use crate::transport::{ReqwestFactory, TransportFactory};
use crate::FetchOutcome;

/// Bounded pool building an isolated client for every fetch.
pub struct PooledIsolated {
    config: PooledConfig,
    factory: Box<dyn TransportFactory>,
}

impl PooledIsolated {
    /// Create the strategy with the default reqwest-backed factory.
    pub fn new(config: PooledConfig) -> Self {
        let factory = Box::new(ReqwestFactory::new(config.request_timeout));
        Self { config, factory }
    }

    /// Create the strategy over an injected transport factory.
    pub fn with_factory(config: PooledConfig, factory: Box<dyn TransportFactory>) -> Self {
        Self { config, factory }
    }
}

#[async_trait]
impl TransportStrategy for PooledIsolated {
    fn name(&self) -> &'static str {
        "pooled-isolated"
    }

    async fn execute(
        &self,
        batch: &UrlBatch,
        headers: &RequestHeaderSet,
    ) -> Result<RunSummary, StrategyError> {
        if batch.is_empty() {
            return Ok(RunSummary::empty());
        }

        // Never more workers than URLs.
        let workers = self.config.max_workers.clamp(1, batch.len());
        let counter = ByteCounter::new();
        let counter_ref = &counter;
        let factory_ref: &dyn TransportFactory = self.factory.as_ref();

        let start = Instant::now();

        let tasks: Vec<_> = batch
            .urls()
            .iter()
            .map(String::as_str)
            .map(|url| async move {
                let outcome = match factory_ref.create() {
                    Ok(transport) => fetch_one(transport.as_ref(), url, headers).await,
                    Err(e) => {
                        let classification = format!("exception: {e}");
                        warn!(url, %classification, "client construction failed");
                        FetchOutcome::failed(classification)
                    }
                };
                counter_ref.apply(&outcome);
            })
            .collect();

        stream::iter(tasks)
            .buffer_unordered(workers)
            .collect::<Vec<()>>()
            .await;

        let elapsed = start.elapsed();
        let summary = counter.freeze(elapsed, batch.len());
        info!(
            workers,
            bytes = summary.total_bytes,
            succeeded = summary.succeeded,
            failed = summary.failed,
            elapsed_ms = elapsed.as_millis() as u64,
            "pooled-isolated run finished"
        );
        Ok(summary)
    }
}
