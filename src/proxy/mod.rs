//! The host proxy: drives the interception hooks over real HTTP traffic.
//!
//! [`intercept_handler`] is the Axum fallback that receives every
//! request, builds a [`Flow`], runs the request hook, forwards the
//! request to the (possibly rewritten) destination, runs the response
//! hook, and replies. Flows that would land back on the proxy's own
//! listener get a 508 instead of being forwarded. Submodules handle destination parsing
//! ([`target`]), hop-by-hop headers ([`headers`]), and the upstream
//! round trip ([`upstream`]).

pub mod headers;
pub mod target;
pub mod upstream;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::flow::{Flow, FlowResponse};
use crate::server::AppState;

pub async fn intercept_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    req_headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method == Method::CONNECT {
        tracing::warn!(authority = %uri, "CONNECT tunnelling is not supported");
        return (
            StatusCode::NOT_IMPLEMENTED,
            "CONNECT is not supported: send plain HTTP through this proxy\n",
        )
            .into_response();
    }

    let Some(request) = target::flow_request(method, &uri, req_headers, state.default_scheme)
    else {
        tracing::warn!(uri = %uri, "request has no destination host");
        return (StatusCode::BAD_REQUEST, "missing Host header\n").into_response();
    };

    let mut flow = Flow::new(request);
    state.hooks.on_request(&mut flow);
    state.stats.record(flow.decision());

    if target::targets_listener(&flow.request, state.listen_addr) {
        tracing::warn!(
            flow_id = %flow.id,
            destination = %flow.request.url(),
            "request addressed to the proxy itself, not forwarding"
        );
        return (
            StatusCode::LOOP_DETECTED,
            "this is splitproxy: configure it as the browser's HTTP proxy \
             instead of opening it directly\n",
        )
            .into_response();
    }

    let upstream = match upstream::forward(
        &state.http_client,
        &flow.request,
        body,
        state.upstream_timeout,
    )
    .await
    {
        Ok(upstream) => upstream,
        Err(e) => {
            state.stats.failed.fetch_add(1, Ordering::Relaxed);
            tracing::error!(
                flow_id = %flow.id,
                destination = %flow.request.url(),
                decision = flow.decision().map_or("none", |d| d.as_str()),
                error = %e,
                "upstream request failed"
            );
            return e.status().into_response();
        }
    };

    tracing::debug!(
        flow_id = %flow.id,
        destination = %flow.request.url(),
        status = upstream.status.as_u16(),
        latency_ms = upstream.latency_ms,
        "upstream responded"
    );

    let mut resp_headers = upstream.headers;
    headers::strip_response_hop_by_hop(&mut resp_headers);
    flow.response = Some(FlowResponse {
        status: upstream.status,
        headers: resp_headers,
    });
    state.hooks.on_response(&mut flow);

    let Some(response) = flow.response else {
        return StatusCode::BAD_GATEWAY.into_response();
    };

    let mut builder = Response::builder().status(response.status);
    for (key, value) in &response.headers {
        builder = builder.header(key, value);
    }
    builder
        .body(Body::from(upstream.body))
        .unwrap_or_else(|e| {
            tracing::error!(flow_id = %flow.id, error = %e, "failed to build response");
            StatusCode::BAD_GATEWAY.into_response()
        })
}
