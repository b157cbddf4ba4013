//! Integration tests for the four transport strategies.
//!
//! All strategies run against deterministic mock transports: strategy choice
//! must never change correctness, only timing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tile_fetch_bench::provision::{RequestHeaderSet, UrlBatch};
use tile_fetch_bench::strategy::{
    MultiplexedStrategy, MultiplexedTransfer, PooledConfig, PooledIsolated, PooledShared,
    SpawnPerRequest, TransportStrategy,
};
use tile_fetch_bench::transport::{
    HttpTransport, Payload, TransportError, TransportFactory,
};

/// Deterministic transport returning a fixed-size payload per request, with
/// optional per-URL failures, a completion delay, and in-flight tracking.
struct MockTransport {
    payload_len: u64,
    fail_urls: HashSet<String>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requests: AtomicUsize,
}

impl MockTransport {
    fn new(payload_len: u64) -> Self {
        Self {
            payload_len,
            fail_urls: HashSet::new(),
            delay: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            requests: AtomicUsize::new(0),
        }
    }

    fn failing_on(mut self, url: impl Into<String>) -> Self {
        self.fail_urls.insert(url.into());
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &str, _headers: &RequestHeaderSet) -> Result<Payload, TransportError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let result = if self.fail_urls.contains(url) {
            Err(TransportError::Connect("connection refused".to_string()))
        } else {
            Ok(Payload {
                len: self.payload_len,
                status: 200,
            })
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Factory handing each request a view of the same shared mock, so the test
/// can still observe totals across isolated "clients".
struct MockFactory {
    transport: Arc<MockTransport>,
}

struct MockFactoryTransport {
    transport: Arc<MockTransport>,
}

#[async_trait]
impl HttpTransport for MockFactoryTransport {
    async fn get(&self, url: &str, headers: &RequestHeaderSet) -> Result<Payload, TransportError> {
        self.transport.get(url, headers).await
    }
}

impl TransportFactory for MockFactory {
    fn create(&self) -> Result<Box<dyn HttpTransport>, TransportError> {
        Ok(Box::new(MockFactoryTransport {
            transport: Arc::clone(&self.transport),
        }))
    }
}

/// Multiplexed transfer backend returning a fixed combined byte count.
struct MockTransfer {
    bytes: u64,
}

#[async_trait]
impl MultiplexedTransfer for MockTransfer {
    async fn transfer(
        &self,
        _urls: &[String],
        _headers: &RequestHeaderSet,
    ) -> Result<u64, TransportError> {
        Ok(self.bytes)
    }

    fn command_line(&self, urls: &[String], _headers: &RequestHeaderSet) -> String {
        format!("mock-transfer {}", urls.join(" "))
    }
}

fn batch_of(n: usize) -> UrlBatch {
    let bases: Vec<String> = (0..n)
        .map(|i| format!("https://tiles.example/resource-{i}.json"))
        .collect();
    UrlBatch::build(&bases, "session=test")
}

fn headers() -> RequestHeaderSet {
    RequestHeaderSet::standard("test-token")
}

/// Four URLs at 1024 bytes each must total 4096 regardless of strategy.
#[tokio::test]
async fn test_all_strategies_agree_on_total_bytes() {
    let batch = batch_of(4);
    let headers = headers();
    let config = PooledConfig::default();

    let strategies: Vec<Box<dyn TransportStrategy>> = vec![
        Box::new(MultiplexedStrategy::with_transfer(Box::new(MockTransfer {
            bytes: 4096,
        }))),
        Box::new(SpawnPerRequest::with_transport(Arc::new(MockTransport::new(
            1024,
        )))),
        Box::new(PooledShared::with_transport(
            config.clone(),
            Arc::new(MockTransport::new(1024)),
        )),
        Box::new(PooledIsolated::with_factory(
            config,
            Box::new(MockFactory {
                transport: Arc::new(MockTransport::new(1024)),
            }),
        )),
    ];

    for strategy in strategies {
        let summary = strategy.execute(&batch, &headers).await.unwrap();
        assert_eq!(
            summary.total_bytes, 4096,
            "strategy {} reported wrong total",
            strategy.name()
        );
        assert_eq!(summary.requests, 4);
        assert_eq!(summary.succeeded, 4);
        assert_eq!(summary.failed, 0);
    }
}

/// One failing fetch among four must not prevent the other three from
/// contributing their bytes.
#[tokio::test]
async fn test_single_failure_does_not_abort_siblings() {
    let batch = batch_of(4);
    let failing_url = batch.urls()[1].clone();
    let headers = headers();

    let transport = Arc::new(MockTransport::new(1024).failing_on(failing_url));
    let strategy = PooledShared::with_transport(
        PooledConfig::default(),
        Arc::clone(&transport) as Arc<dyn HttpTransport>,
    );

    let summary = strategy.execute(&batch, &headers).await.unwrap();
    assert_eq!(summary.total_bytes, 3072);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 1);
    // Every URL was still attempted exactly once.
    assert_eq!(transport.requests(), 4);
}

#[tokio::test]
async fn test_spawn_strategy_tolerates_failures() {
    let batch = batch_of(3);
    let failing_url = batch.urls()[0].clone();
    let headers = headers();

    let transport = Arc::new(MockTransport::new(512).failing_on(failing_url));
    let strategy =
        SpawnPerRequest::with_transport(Arc::clone(&transport) as Arc<dyn HttpTransport>);

    let summary = strategy.execute(&batch, &headers).await.unwrap();
    assert_eq!(summary.total_bytes, 1024);
    assert_eq!(summary.failed, 1);
}

/// A zero-length batch reports zero bytes and produces no throughput figure,
/// with no panic and no division by zero.
#[tokio::test]
async fn test_zero_length_batch() {
    let batch = UrlBatch::from_urls(Vec::new());
    let headers = headers();
    let config = PooledConfig::default();

    let strategies: Vec<Box<dyn TransportStrategy>> = vec![
        Box::new(MultiplexedStrategy::with_transfer(Box::new(MockTransfer {
            bytes: 0,
        }))),
        Box::new(SpawnPerRequest::with_transport(Arc::new(MockTransport::new(1)))),
        Box::new(PooledShared::with_transport(
            config.clone(),
            Arc::new(MockTransport::new(1)),
        )),
        Box::new(PooledIsolated::with_factory(
            config,
            Box::new(MockFactory {
                transport: Arc::new(MockTransport::new(1)),
            }),
        )),
    ];

    for strategy in strategies {
        let summary = strategy.execute(&batch, &headers).await.unwrap();
        assert_eq!(summary.total_bytes, 0);
        assert_eq!(summary.requests, 0);
        assert!(summary.throughput().is_err());
        // Rendering must not crash on the undefined case.
        let report = summary.render("(empty)");
        assert!(report.contains("undefined throughput"));
    }
}

/// Pooled strategies must never run more in-flight requests than
/// min(max_workers, batch_len).
#[tokio::test]
async fn test_pooled_shared_respects_worker_bound() {
    let batch = batch_of(8);
    let headers = headers();
    let transport =
        Arc::new(MockTransport::new(64).with_delay(Duration::from_millis(20)));

    let config = PooledConfig {
        max_workers: 3,
        request_timeout: None,
    };
    let strategy =
        PooledShared::with_transport(config, Arc::clone(&transport) as Arc<dyn HttpTransport>);

    let summary = strategy.execute(&batch, &headers).await.unwrap();
    assert_eq!(summary.total_bytes, 8 * 64);
    assert!(
        transport.max_in_flight() <= 3,
        "observed {} in-flight requests, bound is 3",
        transport.max_in_flight()
    );
}

#[tokio::test]
async fn test_pooled_isolated_never_exceeds_batch_size() {
    let batch = batch_of(4);
    let headers = headers();
    let transport =
        Arc::new(MockTransport::new(64).with_delay(Duration::from_millis(20)));

    // Worker bound far above batch size: effective bound is the batch size.
    let config = PooledConfig {
        max_workers: 100,
        request_timeout: None,
    };
    let strategy = PooledIsolated::with_factory(
        config,
        Box::new(MockFactory {
            transport: Arc::clone(&transport),
        }),
    );

    let summary = strategy.execute(&batch, &headers).await.unwrap();
    assert_eq!(summary.succeeded, 4);
    assert!(transport.max_in_flight() <= 4);
}

/// The multiplexed strategy surfaces the external command line through its
/// request description.
#[tokio::test]
async fn test_multiplexed_describe_uses_command_line() {
    let batch = batch_of(2);
    let headers = headers();
    let strategy = MultiplexedStrategy::with_transfer(Box::new(MockTransfer { bytes: 10 }));

    let description = strategy.describe(&batch, &headers);
    assert!(description.starts_with("mock-transfer "));
    assert!(description.contains(&batch.urls()[0]));
}

/// A whole-batch transfer failure is classified and summarized, never raised
/// out of execute.
#[tokio::test]
async fn test_multiplexed_process_failure_is_classified() {
    struct FailingTransfer;

    #[async_trait]
    impl MultiplexedTransfer for FailingTransfer {
        async fn transfer(
            &self,
            _urls: &[String],
            _headers: &RequestHeaderSet,
        ) -> Result<u64, TransportError> {
            Err(TransportError::Process("curl exited with 7".to_string()))
        }

        fn command_line(&self, _urls: &[String], _headers: &RequestHeaderSet) -> String {
            "failing-transfer".to_string()
        }
    }

    let batch = batch_of(4);
    let strategy = MultiplexedStrategy::with_transfer(Box::new(FailingTransfer));

    let summary = strategy.execute(&batch, &headers()).await.unwrap();
    assert_eq!(summary.total_bytes, 0);
    assert_eq!(summary.failed, 4);
}
