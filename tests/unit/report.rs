//! Unit tests for throughput computation and report rendering.

use std::time::Duration;
use tile_fetch_bench::report::{ReportError, RunSummary, Throughput};

#[test]
fn test_throughput_units_are_consistent() {
    let throughput = Throughput::compute(Duration::from_secs(2), 4 * 1024 * 1024).unwrap();
    assert_eq!(throughput.bytes_per_sec, 2.0 * 1024.0 * 1024.0);
    assert_eq!(throughput.megabytes_per_sec, 2.0);
    assert_eq!(throughput.megabits_per_sec, 16.0);
}

#[test]
fn test_zero_elapsed_yields_explicit_error() {
    assert_eq!(
        Throughput::compute(Duration::ZERO, 1024).unwrap_err(),
        ReportError::ZeroDuration
    );
    // Zero bytes over nonzero time is fine: zero throughput, not an error.
    let throughput = Throughput::compute(Duration::from_secs(1), 0).unwrap();
    assert_eq!(throughput.bytes_per_sec, 0.0);
}

#[test]
fn test_summary_render_includes_request_description() {
    let summary = RunSummary::new(Duration::from_millis(250), 2048, 2, 2, 0);
    let report = summary.render("curl --parallel https://a https://b");

    assert!(report.contains("curl --parallel https://a https://b"));
    assert!(report.contains("Bytes downloaded: 2048"));
    assert!(report.contains("Elapsed time: 250.0000 milliseconds"));
    assert!(report.contains("Megabits / second:"));
}

#[test]
fn test_empty_run_renders_without_dividing_by_zero() {
    let report = RunSummary::empty().render("(empty batch)");
    assert!(report.contains("Bytes downloaded: 0"));
    assert!(report.contains("undefined throughput"));
    assert!(!report.contains("inf"));
}

#[test]
fn test_summary_serializes_to_json() {
    let summary = RunSummary::new(Duration::from_secs(1), 4096, 4, 3, 1);
    let json = serde_json::to_string(&summary).unwrap();
    assert!(json.contains("\"total_bytes\":4096"));
    assert!(json.contains("\"failed\":1"));
}
