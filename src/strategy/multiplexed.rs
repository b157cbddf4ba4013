//! Multiplexed single-invocation transfer.
//!
//! The whole batch is delegated to one external download process capable of
//! fetching several resources over shared parallel connections. The process
//! detail stays behind the [`MultiplexedTransfer`] capability so the
//! strategy presents the same interface as the in-process variants.

use async_trait::async_trait;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::provision::{RequestHeaderSet, UrlBatch};
use crate::report::RunSummary;
use crate::strategy::{StrategyError, TransportStrategy};
use crate::transport::TransportError;

/// Capability: given N URLs and headers, return the combined byte count of
/// one multiplexed transfer.
#[async_trait]
pub trait MultiplexedTransfer: Send + Sync {
    /// Fetch all URLs in a single invocation and return combined bytes.
    async fn transfer(
        &self,
        urls: &[String],
        headers: &RequestHeaderSet,
    ) -> Result<u64, TransportError>;

    /// The equivalent external command line, for the report.
    fn command_line(&self, urls: &[String], headers: &RequestHeaderSet) -> String;
}

/// Default transfer backend: one `curl --parallel` invocation writing every
/// payload to stdout; combined stdout length is the byte total.
pub struct CurlTransfer {
    curl_path: String,
}

impl CurlTransfer {
    /// Use the `curl` binary found on `PATH`.
    pub fn new() -> Self {
        Self {
            curl_path: "curl".to_string(),
        }
    }

    /// Use a specific curl binary.
    pub fn with_path(curl_path: impl Into<String>) -> Self {
        Self {
            curl_path: curl_path.into(),
        }
    }

    fn args(&self, urls: &[String], headers: &RequestHeaderSet) -> Vec<String> {
        let mut args = vec![
            "--parallel".to_string(),
            "--silent".to_string(),
            "--show-error".to_string(),
        ];
        for (name, value) in headers.entries() {
            args.push("-H".to_string());
            args.push(format!("{name}: {value}"));
        }
        args.extend(urls.iter().cloned());
        args
    }
}

impl Default for CurlTransfer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MultiplexedTransfer for CurlTransfer {
    async fn transfer(
        &self,
        urls: &[String],
        headers: &RequestHeaderSet,
    ) -> Result<u64, TransportError> {
        let output = Command::new(&self.curl_path)
            .args(self.args(urls, headers))
            .output()
            .await
            .map_err(|e| TransportError::Spawn(format!("{}: {e}", self.curl_path)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TransportError::Process(format!(
                "curl exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        debug!(bytes = output.stdout.len(), "multiplexed transfer complete");
        Ok(output.stdout.len() as u64)
    }

    fn command_line(&self, urls: &[String], headers: &RequestHeaderSet) -> String {
        let mut parts = vec![self.curl_path.clone()];
        for arg in self.args(urls, headers) {
            if arg.contains(' ') || arg.is_empty() {
                parts.push(format!("\"{arg}\""));
            } else {
                parts.push(arg);
            }
        }
        parts.join(" ")
    }
}

/// Strategy delegating the entire batch to one multiplexed transfer.
///
/// Elapsed time is measured around the single invocation; total bytes is the
/// length of the combined response payload. All requests in the batch share
/// one terminal state: a transfer failure marks the whole batch failed with
/// its classification, without escaping `execute`.
pub struct MultiplexedStrategy {
    transfer: Box<dyn MultiplexedTransfer>,
}

impl MultiplexedStrategy {
    /// Create the strategy with the default curl backend.
    pub fn new() -> Self {
        Self {
            transfer: Box::new(CurlTransfer::new()),
        }
    }

    /// Create the strategy with a custom transfer backend.
    pub fn with_transfer(transfer: Box<dyn MultiplexedTransfer>) -> Self {
        Self { transfer }
    }
}

impl Default for MultiplexedStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransportStrategy for MultiplexedStrategy {
    fn name(&self) -> &'static str {
        "multiplexed"
    }

    fn describe(&self, batch: &UrlBatch, headers: &RequestHeaderSet) -> String {
        self.transfer.command_line(batch.urls(), headers)
    }

    async fn execute(
        &self,
        batch: &UrlBatch,
        headers: &RequestHeaderSet,
    ) -> Result<RunSummary, StrategyError> {
        if batch.is_empty() {
            return Ok(RunSummary::empty());
        }

        let requests = batch.len();
        let start = Instant::now();

        match self.transfer.transfer(batch.urls(), headers).await {
            Ok(bytes) => {
                let elapsed = start.elapsed();
                info!(bytes, elapsed_ms = elapsed.as_millis() as u64, "multiplexed run finished");
                Ok(RunSummary::new(elapsed, bytes, requests, requests, 0))
            }
            Err(TransportError::Spawn(e)) => Err(StrategyError::Process(e)),
            Err(e) => {
                let elapsed = start.elapsed();
                warn!(classification = %format!("exception: {e}"), "multiplexed transfer failed");
                Ok(RunSummary::new(elapsed, 0, requests, 0, requests))
            }
        }
    }
}
