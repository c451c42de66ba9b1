//! Axum server setup, shared application state, and graceful shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared state holding the interception
//! hooks, HTTP client, and stats), [`build_router`] for constructing the
//! Axum router with middleware layers, [`build_http_client`] for the
//! connection-pooled hyper client, and [`shutdown_signal`] for
//! SIGTERM / Ctrl+C handling.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::flow::{RoutingDecision, Scheme};
use crate::intercept::FlowHook;
use crate::proxy;

#[derive(Debug, Default)]
pub struct Stats {
    pub routed_to_local: AtomicU64,
    pub passthrough_api: AtomicU64,
    pub passthrough_other: AtomicU64,
    pub out_of_domain: AtomicU64,
    pub failed: AtomicU64,
}

impl Stats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            routed_to_local: AtomicU64::new(0),
            passthrough_api: AtomicU64::new(0),
            passthrough_other: AtomicU64::new(0),
            out_of_domain: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    pub fn record(&self, decision: Option<RoutingDecision>) {
        let counter = match decision {
            Some(RoutingDecision::RoutedToLocal) => &self.routed_to_local,
            Some(RoutingDecision::PassthroughApi) => &self.passthrough_api,
            Some(RoutingDecision::PassthroughOther) => &self.passthrough_other,
            None => &self.out_of_domain,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn log_summary(&self) {
        tracing::info!(
            routed_to_local = self.routed_to_local.load(Ordering::Relaxed),
            passthrough_api = self.passthrough_api.load(Ordering::Relaxed),
            passthrough_other = self.passthrough_other.load(Ordering::Relaxed),
            out_of_domain = self.out_of_domain.load(Ordering::Relaxed),
            failed = self.failed.load(Ordering::Relaxed),
            "flow summary"
        );
    }
}

pub type HttpsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;
pub type HttpClient = Client<HttpsConnector, http_body_util::Full<bytes::Bytes>>;

pub struct AppState {
    pub hooks: Arc<dyn FlowHook>,
    pub http_client: HttpClient,
    pub upstream_timeout: Duration,
    /// Scheme assumed for origin-form requests, which carry none.
    pub default_scheme: Scheme,
    /// Bound address of the proxy itself; flows aimed here are not forwarded.
    pub listen_addr: SocketAddr,
    pub stats: Stats,
}

#[must_use]
pub fn build_http_client() -> HttpClient {
    // When multiple rustls crypto providers are compiled in, rustls cannot
    // auto-detect which one to use. Explicitly install `ring`.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();
    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(30))
        .build(https)
}

/// `max_body` is the only request body limit; axum's own 2 MiB default
/// for the `Bytes` extractor is disabled.
pub fn build_router(state: Arc<AppState>, max_body: usize) -> Router {
    Router::new()
        .fallback(proxy::intercept_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(max_body)),
        )
        .with_state(state)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_count_by_decision() {
        let stats = Stats::new();
        stats.record(Some(RoutingDecision::RoutedToLocal));
        stats.record(Some(RoutingDecision::RoutedToLocal));
        stats.record(Some(RoutingDecision::PassthroughApi));
        stats.record(None);
        assert_eq!(stats.routed_to_local.load(Ordering::Relaxed), 2);
        assert_eq!(stats.passthrough_api.load(Ordering::Relaxed), 1);
        assert_eq!(stats.passthrough_other.load(Ordering::Relaxed), 0);
        assert_eq!(stats.out_of_domain.load(Ordering::Relaxed), 1);
    }
}
