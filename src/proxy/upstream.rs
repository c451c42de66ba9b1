//! Sending a flow's request to wherever the interceptor left it pointing.

use std::time::{Duration, Instant};

use bytes::Bytes;
use http::{HeaderMap, StatusCode, Uri};
use http_body_util::{BodyExt, Full};

use super::headers::strip_request_hop_by_hop;
use crate::flow::FlowRequest;
use crate::server::HttpClient;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("invalid upstream URI '{uri}'")]
    InvalidUri { uri: String },

    #[error("failed to build upstream request: {0}")]
    Build(#[from] http::Error),

    #[error("upstream request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("failed to read upstream body: {0}")]
    Body(#[from] hyper::Error),
}

impl UpstreamError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub latency_ms: u64,
}

#[allow(clippy::cast_possible_truncation)]
pub async fn forward(
    client: &HttpClient,
    request: &FlowRequest,
    body: Bytes,
    timeout: Duration,
) -> Result<UpstreamResponse, UpstreamError> {
    let url = request.url();
    let uri: Uri = url
        .parse()
        .map_err(|_| UpstreamError::InvalidUri { uri: url.clone() })?;

    let mut headers = request.headers.clone();
    strip_request_hop_by_hop(&mut headers);

    let mut builder = hyper::Request::builder()
        .method(request.method.clone())
        .uri(uri);
    for (key, value) in &headers {
        builder = builder.header(key, value);
    }
    let upstream_req = builder.body(Full::new(body))?;

    let start = Instant::now();
    let response = tokio::time::timeout(timeout, client.request(upstream_req))
        .await
        .map_err(|_| UpstreamError::Timeout(timeout))??;

    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await?.to_bytes();

    Ok(UpstreamResponse {
        status,
        headers,
        body,
        latency_ms: start.elapsed().as_millis() as u64,
    })
}
