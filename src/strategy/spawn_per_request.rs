//! Unbounded spawn-per-request strategy.
//!
//! Spawns exactly one task per URL with no concurrency bound: batch size
//! equals the number of in-flight units. This is a deliberate comparison
//! point against the bounded pools, not an oversight. All tasks share one
//! default-configured client and header set; the parent joins every task
//! before finalizing the summary.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::metrics::ByteCounter;
use crate::provision::{RequestHeaderSet, UrlBatch};
use crate::report::RunSummary;
use crate::strategy::{fetch_one, StrategyError, TransportStrategy};
use crate::transport::{HttpTransport, ReqwestTransport};

/// One spawned task per URL, join-all before summarizing.
pub struct SpawnPerRequest {
    transport: Option<Arc<dyn HttpTransport>>,
}

impl SpawnPerRequest {
    /// Create the strategy; a shared default-configured client is built at
    /// execute time.
    pub fn new() -> Self {
        Self { transport: None }
    }

    /// Create the strategy over an injected shared transport.
    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport: Some(transport),
        }
    }
}

impl Default for SpawnPerRequest {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransportStrategy for SpawnPerRequest {
    fn name(&self) -> &'static str {
        "spawn"
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
            None => Arc::new(ReqwestTransport::new()?),
        };
        let headers = Arc::new(headers.clone());
        let counter = Arc::new(ByteCounter::new());

        let start = Instant::now();

        let handles: Vec<_> = batch
            .urls()
            .iter()
            .cloned()
            .map(|url| {
                let transport = Arc::clone(&transport);
                let headers = Arc::clone(&headers);
                let counter = Arc::clone(&counter);
                tokio::spawn(async move {
                    let outcome = fetch_one(transport.as_ref(), &url, &headers).await;
                    counter.apply(&outcome);
                })
            })
            .collect();

        // Join barrier: every task terminal before the summary exists.
        for handle in handles {
            handle
                .await
                .map_err(|e| StrategyError::TaskJoin(e.to_string()))?;
        }

        let elapsed = start.elapsed();
        let summary = counter.freeze(elapsed, batch.len());
        info!(
            bytes = summary.total_bytes,
            succeeded = summary.succeeded,
            failed = summary.failed,
            elapsed_ms = elapsed.as_millis() as u64,
            "spawn-per-request run finished"
        );
        Ok(summary)
    }
}
