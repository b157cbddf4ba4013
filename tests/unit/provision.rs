//! Unit tests for header set and URL batch construction.

use tile_fetch_bench::provision::{RequestHeaderSet, UrlBatch, DEFAULT_BASE_RESOURCES};

#[test]
fn test_batch_has_one_url_per_base() {
    let bases = ["https://a.example/one", "https://a.example/two", "https://a.example/three"];
    let batch = UrlBatch::build(&bases, "session=tok");

    assert_eq!(batch.len(), bases.len());
    for (url, base) in batch.urls().iter().zip(bases) {
        assert_eq!(url, &format!("{base}?session=tok"));
    }
}

#[test]
fn test_batch_preserves_configured_order() {
    let batch = UrlBatch::build(&DEFAULT_BASE_RESOURCES, "s");
    let expected: Vec<String> = DEFAULT_BASE_RESOURCES
        .iter()
        .map(|b| format!("{b}?s"))
        .collect();
    assert_eq!(batch.urls(), expected.as_slice());
}

#[test]
fn test_empty_credential_is_not_a_construction_failure() {
    // Credential validity is the transport's concern; construction always
    // succeeds.
    let batch = UrlBatch::build(&["https://a.example/r"], "");
    assert_eq!(batch.urls(), ["https://a.example/r?"]);
}

#[test]
fn test_zero_length_base_list() {
    let bases: [&str; 0] = [];
    let batch = UrlBatch::build(&bases, "session=tok");
    assert!(batch.is_empty());
}

#[test]
fn test_header_set_is_fixed_and_complete() {
    let headers = RequestHeaderSet::standard("token-1");

    // Content negotiation / client identification / authorization.
    assert_eq!(headers.get("Authorization"), Some("Bearer token-1"));
    assert!(headers.get("User-Agent").is_some());
    assert!(headers.get("X-Cesium-Client").is_some());

    // Zero-body GET tuning.
    assert_eq!(headers.get("Content-Length"), Some("0"));
    assert_eq!(headers.get("Expect"), Some(""));
}

#[test]
fn test_header_lookup_is_case_insensitive() {
    let headers = RequestHeaderSet::standard("t");
    assert_eq!(headers.get("authorization"), headers.get("Authorization"));
}
