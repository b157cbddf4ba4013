//! Header set and URL batch construction.
//!
//! Everything in this module is pure data construction: building the header
//! set and the target URL batch involves no network access and is fully
//! deterministic. Credential validity is the transport's concern and surfaces
//! as a fetch failure, never as a construction failure.

/// The four tile-metadata resources benchmarked by default.
///
/// Each is combined with `?` + the session credential string at batch build
/// time; the query parameter carries the per-session token required by the
/// tile service.
pub const DEFAULT_BASE_RESOURCES: [&str; 4] = [
    "https://tile.googleapis.com/v1/3dtiles/datasets/CgA/files/UlRPVEYuYnVsa21ldGFkYXRhLnBsYW5ldG9pZD1lYXJ0aCxidWxrX21ldGFkYXRhX2Vwb2NoPTk2MixwYXRoPTIxNjAsY2FjaGVfdmVyc2lvbj02.json",
    "https://tile.googleapis.com/v1/3dtiles/datasets/CgA/files/UlRPVEYuYnVsa21ldGFkYXRhLnBsYW5ldG9pZD1lYXJ0aCxidWxrX21ldGFkYXRhX2Vwb2NoPTk2MixwYXRoPTIxNDMsY2FjaGVfdmVyc2lvbj02.json",
    "https://tile.googleapis.com/v1/3dtiles/datasets/CgA/files/UlRPVEYuYnVsa21ldGFkYXRhLnBsYW5ldG9pZD1lYXJ0aCxidWxrX21ldGFkYXRhX2Vwb2NoPTk2MixwYXRoPTIxNDIsY2FjaGVfdmVyc2lvbj02.json",
    "https://tile.googleapis.com/v1/3dtiles/datasets/CgA/files/UlRPVEYuYnVsa21ldGFkYXRhLnBsYW5ldG9pZD1lYXJ0aCxidWxrX21ldGFkYXRhX2Vwb2NoPTk2MixwYXRoPTIwNjEsY2FjaGVfdmVyc2lvbj02.json",
];

/// Fixed header name/value pairs applied to every request.
///
/// The set mirrors the engine client whose traffic this harness reproduces:
/// client identification strings, a user agent, and zero-body GET tuning
/// (`Content-Length: 0`, empty `Expect`). The bearer token is appended
/// separately at build time.
const FIXED_HEADERS: [(&str, &str); 8] = [
    ("X-Cesium-Client", "Cesium For Unreal"),
    ("X-Cesium-Client-Version", "2.0.0"),
    ("X-Cesium-Client-Project", "CesiumForUnrealSamples"),
    (
        "X-Cesium-Client-Engine",
        "Unreal Engine 5.3.1-28051148+++UE5+Release-5.3",
    ),
    (
        "X-Cesium-Client-OS",
        "Windows 10 (22H2) [10.0.19045.3570] 10.0.19045.1.256.64bit",
    ),
    (
        "User-Agent",
        "Mozilla/5.0 (Windows 10 (22H2) [10.0.19045.3570] 10.0.19045.1.256.64bit) Cesium For Unreal/2.0.0 (Project CesiumForUnrealSamples Engine Unreal Engine 5.3.1-28051148+++UE5+Release-5.3)",
    ),
    ("Content-Length", "0"),
    ("Expect", ""),
];

/// Immutable set of request headers shared read-only across all concurrent
/// requests in a run.
///
/// Keys are unique; order is preserved so the equivalent external command
/// line is reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHeaderSet {
    entries: Vec<(String, String)>,
}

impl RequestHeaderSet {
    /// Build the standard header set with the given bearer token.
    ///
    /// Deterministic and side-effect-free; an empty token still produces a
    /// well-formed `Authorization: Bearer ` header, matching the zero-body
    /// GET the tile service expects from the emulated client.
    pub fn standard(bearer_token: &str) -> Self {
        let mut entries = Vec::with_capacity(FIXED_HEADERS.len() + 1);
        entries.push(("Authorization".to_string(), format!("Bearer {bearer_token}")));
        for (name, value) in FIXED_HEADERS {
            entries.push((name.to_string(), value.to_string()));
        }
        Self { entries }
    }

    /// Ordered name/value pairs.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Number of headers in the set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a header value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Ordered batch of target URLs for one benchmark run.
///
/// URL strings are opaque: the harness never parses or validates them beyond
/// the `base + "?" + session` concatenation. Concurrent strategies make no
/// guarantee that completion order matches this sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBatch {
    urls: Vec<String>,
}

impl UrlBatch {
    /// Build a batch of exactly one URL per base resource by concatenating
    /// each base with `?` + the session credential string.
    ///
    /// An empty credential still constructs the URL; whether the service
    /// accepts it is surfaced later as a fetch failure.
    pub fn build<S: AsRef<str>>(bases: &[S], session: &str) -> Self {
        let urls = bases
            .iter()
            .map(|base| format!("{}?{}", base.as_ref(), session))
            .collect();
        Self { urls }
    }

    /// Construct a batch from already-complete URLs.
    pub fn from_urls(urls: Vec<String>) -> Self {
        Self { urls }
    }

    /// Target URLs in configured order.
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Number of URLs in the batch.
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Whether the batch contains no URLs.
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
