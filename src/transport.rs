//! HTTP transport seam used by every strategy.
//!
//! Strategies go through the [`HttpTransport`] trait for per-request fetches
//! so the concurrency discipline can be exercised against a deterministic
//! transport in tests. The production implementation wraps a
//! [`reqwest::Client`]; the isolated-client pool variant builds transports
//! through a [`TransportFactory`] instead of sharing one.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;

use crate::provision::RequestHeaderSet;

/// Transport-level errors.
///
/// Everything except [`TransportError::Spawn`] and
/// [`TransportError::ClientBuild`] is recovered locally per-request: the
/// error's display form becomes the fetch's failure classification and the
/// run continues.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Request exceeded the configured timeout
    #[error("timeout")]
    Timeout,

    /// Connection could not be established
    #[error("connect: {0}")]
    Connect(String),

    /// Request failed mid-flight (TLS, protocol, body read)
    #[error("request: {0}")]
    Request(String),

    /// A header name or value could not be encoded for the wire
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// HTTP client could not be constructed. Fatal for the run.
    #[error("client build: {0}")]
    ClientBuild(String),

    /// External process could not be started. Fatal for the run.
    #[error("process spawn: {0}")]
    Spawn(String),

    /// External process ran but exited unsuccessfully
    #[error("process: {0}")]
    Process(String),
}

/// Classify a reqwest error into a transport error kind.
pub fn classify(err: &reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}

/// Raw response payload: byte length plus HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payload {
    /// Byte length of the fully consumed response body
    pub len: u64,
    /// HTTP status code
    pub status: u16,
}

/// Capability to issue a single GET and return the payload size and status.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue one GET for `url` with the full header set applied, blocking the
    /// calling unit until the response body has been fully consumed.
    async fn get(&self, url: &str, headers: &RequestHeaderSet) -> Result<Payload, TransportError>;
}

/// Builds a fresh [`HttpTransport`] per request, for strategies that
/// deliberately avoid connection reuse.
pub trait TransportFactory: Send + Sync {
    /// Construct a new transport with its own connection pool.
    fn create(&self) -> Result<Box<dyn HttpTransport>, TransportError>;
}

/// Build an HTTP client, optionally with a per-request timeout.
pub fn build_client(timeout: Option<Duration>) -> Result<Client, TransportError> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| TransportError::ClientBuild(e.to_string()))
}

/// Convert the header set into reqwest header types.
pub fn header_map(headers: &RequestHeaderSet) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.entries() {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TransportError::InvalidHeader(format!("{name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| TransportError::InvalidHeader(format!("{name}: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Production transport backed by a [`reqwest::Client`].
///
/// The client may be shared across workers (connection reuse) or built fresh
/// per request via [`ReqwestFactory`]; the strategy decides.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with a default-configured client.
    pub fn new() -> Result<Self, TransportError> {
        Ok(Self {
            client: build_client(None)?,
        })
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &RequestHeaderSet) -> Result<Payload, TransportError> {
        let response = self
            .client
            .get(url)
            .headers(header_map(headers)?)
            .send()
            .await
            .map_err(|e| classify(&e))?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| classify(&e))?;

        Ok(Payload {
            len: body.len() as u64,
            status,
        })
    }
}

/// Factory producing a fresh default-configured [`ReqwestTransport`] per
/// request.
pub struct ReqwestFactory {
    timeout: Option<Duration>,
}

impl ReqwestFactory {
    /// Create a factory, optionally applying a per-request timeout to each
    /// client it builds.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl TransportFactory for ReqwestFactory {
    fn create(&self) -> Result<Box<dyn HttpTransport>, TransportError> {
        let client = build_client(self.timeout)?;
        Ok(Box::new(ReqwestTransport::with_client(client)))
    }
}
