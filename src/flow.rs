//! The per-exchange model handed to the interception hooks.
//!
//! A [`Flow`] is created by the host proxy when a request arrives and lives
//! until the response has been sent. The hooks read and mutate its routing
//! fields and headers, and record a [`RoutingDecision`] that the request
//! phase sets exactly once and the response phase only reads.

use std::fmt;
use std::str::FromStr;

use http::{HeaderMap, Method, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("http") {
            Ok(Self::Http)
        } else if s.eq_ignore_ascii_case("https") {
            Ok(Self::Https)
        } else {
            Err(format!("unsupported scheme '{s}' (expected http or https)"))
        }
    }
}

/// Outcome of request-phase classification for an in-domain flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutingDecision {
    /// `/api/` traffic left on the production backend.
    PassthroughApi,
    /// UI traffic rewritten to the local backend.
    RoutedToLocal,
    /// In-domain traffic that matched no UI route (auth callbacks and the like).
    PassthroughOther,
}

impl RoutingDecision {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PassthroughApi => "passthrough_api",
            Self::RoutedToLocal => "routed_to_local",
            Self::PassthroughOther => "passthrough_other",
        }
    }
}

impl fmt::Display for RoutingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct FlowRequest {
    pub method: Method,
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    /// Path and query, e.g. `/callback?code=abc`.
    pub path: String,
    pub headers: HeaderMap,
}

impl FlowRequest {
    /// Build a `GET` request for `scheme://host{path}` on the scheme's default port.
    #[must_use]
    pub fn get(scheme: Scheme, host: &str, path: &str) -> Self {
        Self {
            method: Method::GET,
            scheme,
            host: host.to_string(),
            port: scheme.default_port(),
            path: path.to_string(),
            headers: HeaderMap::new(),
        }
    }

    /// The path without its query string.
    #[must_use]
    pub fn path_only(&self) -> &str {
        self.path
            .split_once('?')
            .map_or(self.path.as_str(), |(path, _)| path)
    }

    /// Absolute URL of the current destination.
    ///
    /// The port is omitted when it is the scheme's default.
    #[must_use]
    pub fn url(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.as_str()
        } else {
            "/"
        };
        if self.port == self.scheme.default_port() {
            format!("{}://{}{}", self.scheme, self.host, path)
        } else {
            format!("{}://{}:{}{}", self.scheme, self.host, self.port, path)
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlowResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

#[derive(Debug, Clone)]
pub struct Flow {
    pub id: String,
    pub request: FlowRequest,
    pub response: Option<FlowResponse>,
    decision: Option<RoutingDecision>,
}

impl Flow {
    #[must_use]
    pub fn new(request: FlowRequest) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            request,
            response: None,
            decision: None,
        }
    }

    #[must_use]
    pub const fn decision(&self) -> Option<RoutingDecision> {
        self.decision
    }

    /// Record the routing decision. Returns `false` and leaves the flow
    /// untouched if a decision was already recorded.
    pub fn decide(&mut self, decision: RoutingDecision) -> bool {
        if self.decision.is_some() {
            return false;
        }
        self.decision = Some(decision);
        true
    }

    #[must_use]
    pub fn is_routed_to_local(&self) -> bool {
        self.decision == Some(RoutingDecision::RoutedToLocal)
    }
}
