//! End-to-end tests: a browser-like client talking through the proxy to a
//! stand-in local backend.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::http::header::HOST;
use axum::http::HeaderMap;
use axum::response::IntoResponse;

use splitproxy::config::model::{Config, DEFAULT_CSP};
use splitproxy::flow::Scheme;
use splitproxy::intercept::Interceptor;
use splitproxy::server::{self, AppState, Stats};

const DOMAIN: &str = "prod.splitproxy.test";
const MAX_BODY: usize = 10 * 1024 * 1024;

async fn echo_host(headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    (
        [
            ("x-frame-options", "SAMEORIGIN".to_string()),
            ("x-body-length", body.len().to_string()),
        ],
        format!("host={host}"),
    )
}

async fn serve_backend(app: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn start_backend() -> SocketAddr {
    serve_backend(
        axum::Router::new()
            .fallback(echo_host)
            .layer(DefaultBodyLimit::disable()),
    )
    .await
}

async fn start_slow_backend(delay: Duration) -> SocketAddr {
    serve_backend(axum::Router::new().fallback(move || async move {
        tokio::time::sleep(delay).await;
        "too late"
    }))
    .await
}

async fn start_proxy(
    backend: SocketAddr,
) -> (SocketAddr, Arc<AppState>, tokio::sync::oneshot::Sender<()>) {
    start_proxy_with_timeout(backend, Duration::from_secs(2)).await
}

async fn start_proxy_with_timeout(
    backend: SocketAddr,
    upstream_timeout: Duration,
) -> (SocketAddr, Arc<AppState>, tokio::sync::oneshot::Sender<()>) {
    let mut config = Config {
        production_domain: DOMAIN.into(),
        ..Config::default()
    };
    config.local.host = "127.0.0.1".into();
    config.local.port = backend.port();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let state = Arc::new(AppState {
        hooks: Arc::new(Interceptor::from_config(&config).unwrap()),
        http_client: server::build_http_client(),
        upstream_timeout,
        default_scheme: Scheme::Http,
        listen_addr: addr,
        stats: Stats::new(),
    });

    let router = server::build_router(Arc::clone(&state), MAX_BODY);
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    (addr, state, shutdown_tx)
}

async fn raw_request(proxy: SocketAddr, request: &[u8]) -> String {
    let mut stream = tokio::net::TcpStream::connect(proxy).await.unwrap();
    tokio::io::AsyncWriteExt::write_all(&mut stream, request)
        .await
        .unwrap();
    let mut buf = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut stream, &mut buf)
        .await
        .unwrap();
    String::from_utf8_lossy(&buf).into_owned()
}

fn counter(value: &std::sync::atomic::AtomicU64) -> u64 {
    value.load(std::sync::atomic::Ordering::Relaxed)
}

fn client_via(proxy: SocketAddr) -> reqwest::Client {
    reqwest::Client::builder()
        .proxy(reqwest::Proxy::http(format!("http://{proxy}")).unwrap())
        .build()
        .unwrap()
}

#[tokio::test]
async fn ui_route_is_served_by_local_backend_with_production_headers() {
    let backend = start_backend().await;
    let (proxy, state, shutdown) = start_proxy(backend).await;

    let resp = client_via(proxy)
        .get(format!("http://{DOMAIN}/catalogue/widgets"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-security-policy").unwrap(),
        DEFAULT_CSP
    );
    assert_eq!(resp.headers().get("x-frame-options").unwrap(), "DENY");
    assert_eq!(resp.text().await.unwrap(), format!("host={DOMAIN}"));
    assert_eq!(counter(&state.stats.routed_to_local), 1);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn api_route_is_not_sent_to_local_backend() {
    let backend = start_backend().await;
    let (proxy, state, shutdown) = start_proxy(backend).await;

    // The production domain does not resolve, so the passthrough fails
    // upstream instead of reaching the local backend.
    let resp = client_via(proxy)
        .get(format!("http://{DOMAIN}/api/v1/sessions"))
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_server_error());
    assert!(resp.headers().get("content-security-policy").is_none());
    assert_eq!(counter(&state.stats.passthrough_api), 1);
    assert_eq!(counter(&state.stats.failed), 1);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn other_domains_are_proxied_without_injection() {
    let backend = start_backend().await;
    let (proxy, state, shutdown) = start_proxy(backend).await;

    let resp = client_via(proxy)
        .get(format!("http://{backend}/catalogue/widgets"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert!(resp.headers().get("content-security-policy").is_none());
    assert_eq!(resp.headers().get("x-frame-options").unwrap(), "SAMEORIGIN");
    assert_eq!(resp.text().await.unwrap(), format!("host={backend}"));
    assert_eq!(counter(&state.stats.out_of_domain), 1);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn request_without_host_is_rejected() {
    let backend = start_backend().await;
    let (proxy, _state, shutdown) = start_proxy(backend).await;

    // HTTP/1.0 origin-form request with no Host header.
    let head = raw_request(proxy, b"GET / HTTP/1.0\r\n\r\n").await;
    assert!(head.contains(" 400 "), "unexpected response: {head}");

    let _ = shutdown.send(());
}

#[tokio::test]
async fn connect_is_not_implemented() {
    let backend = start_backend().await;
    let (proxy, state, shutdown) = start_proxy(backend).await;

    let head = raw_request(
        proxy,
        b"CONNECT example.com:443 HTTP/1.1\r\nHost: example.com:443\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(head.contains(" 501 "), "unexpected response: {head}");
    assert_eq!(counter(&state.stats.out_of_domain), 0);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn slow_local_backend_times_out() {
    let backend = start_slow_backend(Duration::from_secs(2)).await;
    let (proxy, state, shutdown) =
        start_proxy_with_timeout(backend, Duration::from_millis(200)).await;

    let resp = client_via(proxy)
        .get(format!("http://{DOMAIN}/try"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 504);
    assert_eq!(counter(&state.stats.routed_to_local), 1);
    assert_eq!(counter(&state.stats.failed), 1);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn bodies_above_two_mebibytes_reach_the_backend() {
    let backend = start_backend().await;
    let (proxy, _state, shutdown) = start_proxy(backend).await;

    let body = vec![b'x'; 3 * 1024 * 1024];
    let resp = client_via(proxy)
        .post(format!("http://{DOMAIN}/try"))
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get("x-body-length").unwrap(), "3145728");

    let _ = shutdown.send(());
}

#[tokio::test]
async fn requests_addressed_to_the_proxy_are_not_forwarded() {
    let backend = start_backend().await;
    let (proxy, state, shutdown) = start_proxy(backend).await;

    // No proxy configured: the proxy sees an origin-form request whose Host
    // is its own listen address.
    let resp = reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
        .get(format!("http://{proxy}/"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 508);
    assert_eq!(counter(&state.stats.out_of_domain), 1);
    assert_eq!(counter(&state.stats.failed), 0);

    // Absolute-form through the proxy, using a loopback alias.
    let resp = client_via(proxy)
        .get(format!("http://localhost:{}/", proxy.port()))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 508);
    assert_eq!(counter(&state.stats.out_of_domain), 2);

    let _ = shutdown.send(());
}
