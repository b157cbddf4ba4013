//! Unit tests for the byte aggregator's concurrency guarantees.

use std::sync::Arc;
use tile_fetch_bench::metrics::ByteCounter;
use tile_fetch_bench::FetchOutcome;

/// 1000 concurrent workers each incrementing by one byte must yield exactly
/// 1000 once every worker has been joined: no lost updates.
#[tokio::test]
async fn test_concurrent_increments_lose_no_updates() {
    let counter = Arc::new(ByteCounter::new());

    let handles: Vec<_> = (0..1000)
        .map(|_| {
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                counter.add_bytes(1);
            })
        })
        .collect();

    for handle in handles {
        handle.await.expect("worker panicked");
    }

    // Barrier reached: totals are now reliable.
    assert_eq!(counter.total_bytes(), 1000);
    assert_eq!(counter.succeeded(), 1000);
    assert_eq!(counter.failed(), 0);
}

#[tokio::test]
async fn test_concurrent_mixed_outcomes() {
    let counter = Arc::new(ByteCounter::new());

    let handles: Vec<_> = (0..100)
        .map(|i| {
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                if i % 4 == 0 {
                    counter.apply(&FetchOutcome::failed("exception: timeout"));
                } else {
                    counter.apply(&FetchOutcome::success(10, 200));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.expect("worker panicked");
    }

    assert_eq!(counter.total_bytes(), 750);
    assert_eq!(counter.succeeded(), 75);
    assert_eq!(counter.failed(), 25);
}
