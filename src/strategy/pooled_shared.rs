//! Bounded worker pool over one persistent shared client.
//!
//! A single connection-reusing client is shared across a bounded set of
//! concurrent workers; one fetch task per URL is submitted and results are
//! collected as each completes, not in submission order. The effective bound
//! is `min(max_workers, batch_len)`.

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::metrics::ByteCounter;
use crate::provision::{RequestHeaderSet, UrlBatch};
use crate::report::RunSummary;
use crate::strategy::{fetch_one, PooledConfig, StrategyError, TransportStrategy};
use crate::transport::{build_client, HttpTransport, ReqwestTransport};

/// Bounded pool sharing one persistent session across all workers.
pub struct PooledShared {
    config: PooledConfig,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl PooledShared {
    /// Create the strategy; the shared client is built at execute time.
    pub fn new(config: PooledConfig) -> Self {
        Self {
            config,
            transport: None,
        }
    }

    /// Create the strategy over an injected shared transport.
    pub fn with_transport(config: PooledConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config,
            transport: Some(transport),
        }
    }
}

#[async_trait]
impl TransportStrategy for PooledShared {
    fn name(&self) -> &'static str {
        "pooled-shared"
    }

    async fn execute(
        &self,
        batch: &UrlBatch,
        headers: &RequestHeaderSet,
    ) -> Result<RunSummary, StrategyError> {
        if batch.is_empty() {
            return Ok(RunSummary::empty());
        }

        let transport: Arc<dyn HttpTransport> = match &self.transport {
            Some(transport) => Arc::clone(transport),
            None => Arc::new(ReqwestTransport::with_client(build_client(
                self.config.request_timeout,
            )?)),
        };

        // Never more workers than URLs.
        let workers = self.config.max_workers.clamp(1, batch.len());
        let counter = ByteCounter::new();
        let counter_ref = &counter;
        let transport_ref = transport.as_ref();

        let start = Instant::now();

        let tasks: Vec<_> = batch
            .urls()
            .iter()
            .map(String::as_str)
            .map(|url| async move {
                let outcome = fetch_one(transport_ref, url, headers).await;
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
            "pooled-shared run finished"
        );
        Ok(summary)
    }
}
