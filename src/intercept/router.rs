//! Request-phase classification and destination rewriting.
//!
//! [`Router::on_request`] decides whether an in-domain request stays on
//! the production edge or is redirected to the local backend, and tags
//! the flow with the [`RoutingDecision`]. UI routes are matched by a
//! linear, first-match-wins scan of the [`RouteTable`].

use http::header::HOST;
use http::HeaderValue;

use crate::config::model::{Config, LocalBackend, API_PREFIX};
use crate::flow::{Flow, RoutingDecision};

/// Ordered UI path prefixes.
///
/// A path matches a pattern when it equals the pattern or starts with it.
/// The root pattern `/` is the exception: it only matches the root itself,
/// otherwise it would claim every path and nothing could pass through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    patterns: Vec<String>,
}

impl RouteTable {
    #[must_use]
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    /// First pattern matching `path` (query string already removed).
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&str> {
        self.patterns
            .iter()
            .map(String::as_str)
            .find(|pattern| pattern_matches(pattern, path))
    }

    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

fn pattern_matches(pattern: &str, path: &str) -> bool {
    if pattern == "/" {
        return path == "/";
    }
    path == pattern || path.starts_with(pattern)
}

#[derive(Debug, Clone)]
pub struct Router {
    production_domain: String,
    local: LocalBackend,
    routes: RouteTable,
}

impl Router {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            production_domain: config.production_domain.clone(),
            local: config.local.clone(),
            routes: RouteTable::new(config.ui_routes.clone()),
        }
    }

    #[must_use]
    pub fn production_domain(&self) -> &str {
        &self.production_domain
    }

    #[must_use]
    pub const fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Classify `flow` without touching it.
    ///
    /// Returns `None` for traffic outside the production domain.
    #[must_use]
    pub fn classify(&self, flow: &Flow) -> Option<RoutingDecision> {
        if !flow
            .request
            .host
            .eq_ignore_ascii_case(&self.production_domain)
        {
            return None;
        }

        let path = flow.request.path_only();
        if path.starts_with(API_PREFIX) {
            Some(RoutingDecision::PassthroughApi)
        } else if self.routes.find(path).is_some() {
            Some(RoutingDecision::RoutedToLocal)
        } else {
            Some(RoutingDecision::PassthroughOther)
        }
    }

    pub fn on_request(&self, flow: &mut Flow) {
        if flow.decision().is_some() {
            return;
        }

        let Some(decision) = self.classify(flow) else {
            tracing::trace!(
                flow_id = %flow.id,
                host = %flow.request.host,
                "outside production domain, ignoring"
            );
            return;
        };

        flow.decide(decision);

        match decision {
            RoutingDecision::PassthroughApi => {
                tracing::info!(
                    flow_id = %flow.id,
                    path = %flow.request.path,
                    decision = %decision,
                    "API route, passing through to production"
                );
            }
            RoutingDecision::PassthroughOther => {
                tracing::info!(
                    flow_id = %flow.id,
                    path = %flow.request.path,
                    decision = %decision,
                    "passing through to production unchanged"
                );
            }
            RoutingDecision::RoutedToLocal => self.route_to_local(flow),
        }
    }

    fn route_to_local(&self, flow: &mut Flow) {
        let original_host = flow
            .request
            .headers
            .get(HOST)
            .cloned()
            .or_else(|| HeaderValue::from_str(&self.production_domain).ok());

        flow.request.scheme = self.local.scheme;
        flow.request.host.clone_from(&self.local.host);
        flow.request.port = self.local.port;

        // The identity provider validates redirect URIs against Host, so it
        // must keep naming production even though the connection does not.
        if let Some(host) = original_host {
            flow.request.headers.insert(HOST, host);
        }

        tracing::info!(
            flow_id = %flow.id,
            path = %flow.request.path,
            local = %self.local.authority(),
            host_header = flow
                .request
                .headers
                .get(HOST)
                .and_then(|v| v.to_str().ok())
                .unwrap_or(""),
            "UI route, forwarding to local backend"
        );
    }
}
