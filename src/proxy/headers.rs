//! Hop-by-hop header stripping for both directions of a proxied flow.
//!
//! Only connection-level headers are removed. `Host` is deliberately left
//! alone on the way out: after the interceptor has run it carries the
//! value the upstream must see.

use std::sync::LazyLock;

use http::{HeaderMap, HeaderName};

static HOP_BY_HOP: LazyLock<Vec<HeaderName>> = LazyLock::new(|| {
    [
        "connection",
        "keep-alive",
        "proxy-connection",
        "transfer-encoding",
        "te",
        "trailer",
        "upgrade",
        "proxy-authorization",
        "proxy-authenticate",
    ]
    .iter()
    .filter_map(|name| name.parse::<HeaderName>().ok())
    .collect()
});

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    // Headers named in `Connection` are hop-by-hop too.
    let listed: Vec<HeaderName> = headers
        .get_all(http::header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| name.trim().parse::<HeaderName>().ok())
        .collect();
    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

/// Strip hop-by-hop headers from a request before it is sent upstream.
pub fn strip_request_hop_by_hop(headers: &mut HeaderMap) {
    strip_hop_by_hop(headers);
}

/// Strip hop-by-hop headers and `content-length` from an upstream response.
///
/// The body has already been fully collected, so `transfer-encoding` and
/// `content-length` from the origin are no longer accurate. Axum sets the
/// correct `content-length` from the actual body bytes.
pub fn strip_response_hop_by_hop(headers: &mut HeaderMap) {
    strip_hop_by_hop(headers);
    headers.remove(http::header::CONTENT_LENGTH);
}
