//! Turning an inbound HTTP request into a [`FlowRequest`].
//!
//! Browsers configured to use the proxy send absolute-form targets
//! (`GET http://host/path`), so scheme, host and port come from the URI.
//! Clients talking to the proxy directly send origin-form targets; the
//! destination is then taken from the `Host` header and the configured
//! upstream scheme.

use std::net::{IpAddr, SocketAddr};

use http::header::HOST;
use http::uri::Authority;
use http::{HeaderMap, Method, Uri};

use crate::flow::{FlowRequest, Scheme};

/// Build the flow request, or `None` if no destination host can be found.
#[must_use]
pub fn flow_request(
    method: Method,
    uri: &Uri,
    headers: HeaderMap,
    default_scheme: Scheme,
) -> Option<FlowRequest> {
    let (scheme, authority) = match uri.authority() {
        Some(authority) => {
            let scheme = uri
                .scheme_str()
                .and_then(|s| s.parse::<Scheme>().ok())
                .unwrap_or(Scheme::Http);
            (scheme, authority.clone())
        }
        None => {
            let authority = headers
                .get(HOST)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<Authority>().ok())?;
            (default_scheme, authority)
        }
    };

    let host = authority.host().to_ascii_lowercase();
    if host.is_empty() {
        return None;
    }
    let port = authority
        .port_u16()
        .unwrap_or_else(|| scheme.default_port());
    let path = uri
        .path_and_query()
        .map_or_else(|| "/".to_string(), ToString::to_string);

    Some(FlowRequest {
        method,
        scheme,
        host,
        port,
        path,
        headers,
    })
}

/// Whether forwarding `request` would connect straight back to the proxy
/// listening on `listen`.
#[must_use]
pub fn targets_listener(request: &FlowRequest, listen: SocketAddr) -> bool {
    if request.port != listen.port() {
        return false;
    }
    let listen_ip = listen.ip();
    let local_listener = listen_ip.is_loopback() || listen_ip.is_unspecified();

    let host = request.host.trim_start_matches('[').trim_end_matches(']');
    if host == "localhost" {
        return local_listener;
    }
    host.parse::<IpAddr>().is_ok_and(|ip| {
        ip == listen_ip || (local_listener && (ip.is_loopback() || ip.is_unspecified()))
    })
}
