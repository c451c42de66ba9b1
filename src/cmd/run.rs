//! `splitproxy run` -- start the intercepting proxy.
//!
//! Loads configuration once, applies CLI overrides, builds the
//! interceptor, and serves until Ctrl+C / SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::RunArgs;
use crate::config::model::Config;
use crate::config::{sources, validation, ConfigSource};
use crate::error::ProxyError;
use crate::intercept::Interceptor;
use crate::logging;
use crate::server::{self, AppState, Stats};

pub async fn execute(args: RunArgs) -> Result<(), ProxyError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let source = sources::resolve(args.config.as_deref()).await?;
    let (mut config, version) = source.load().await?;

    apply_overrides(&mut config, &args);
    if let Err(errors) = validation::validate(&config) {
        return Err(ProxyError::ConfigValidation { errors });
    }

    let interceptor = Interceptor::from_config(&config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let listen_addr = listener.local_addr()?;

    let state = Arc::new(AppState {
        hooks: Arc::new(interceptor),
        http_client: server::build_http_client(),
        upstream_timeout: Duration::from_millis(args.timeout),
        default_scheme: args.upstream_scheme,
        listen_addr,
        stats: Stats::new(),
    });

    let router = server::build_router(Arc::clone(&state), args.max_body);

    tracing::info!(
        addr = %listen_addr,
        config_source = source.name(),
        config_version = version.short(),
        production_domain = %config.production_domain,
        local = %format!("{}://{}", config.local.scheme, config.local.authority()),
        ui_routes = config.ui_routes.len(),
        security_headers = config.security_headers.len(),
        "splitproxy started"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    state.stats.log_summary();
    tracing::info!("splitproxy stopped");
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(ref domain) = args.domain {
        config.production_domain.clone_from(domain);
    }
    if let Some(port) = args.local_port {
        config.local.port = port;
    }
}
