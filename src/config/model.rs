//! Serde data structures for the splitproxy configuration file.
//!
//! Contains [`Config`] (the root), [`LocalBackend`], and
//! [`SecurityHeader`]. All types derive `Serialize` and `Deserialize`
//! with `deny_unknown_fields` for strict parsing. Every field has a
//! default, so an empty file yields the stock NDX setup.

use serde::{Deserialize, Serialize};

use crate::flow::Scheme;

pub const DEFAULT_PRODUCTION_DOMAIN: &str = "ndx.digital.cabinet-office.gov.uk";
pub const DEFAULT_LOCAL_HOST: &str = "localhost";
pub const DEFAULT_LOCAL_PORT: u16 = 8080;

/// Paths under this prefix always stay on the production backend.
pub const API_PREFIX: &str = "/api/";

pub const DEFAULT_CSP: &str = "upgrade-insecure-requests; \
    default-src 'none'; \
    object-src 'none'; \
    script-src 'self'; \
    style-src 'self'; \
    img-src 'self' data:; \
    font-src 'self' data:; \
    connect-src 'self'; \
    manifest-src 'self'; \
    frame-ancestors 'none'; \
    base-uri 'none';";

fn default_production_domain() -> String {
    DEFAULT_PRODUCTION_DOMAIN.to_string()
}

fn default_local_host() -> String {
    DEFAULT_LOCAL_HOST.to_string()
}

const fn default_local_port() -> u16 {
    DEFAULT_LOCAL_PORT
}

const fn default_local_scheme() -> Scheme {
    Scheme::Http
}

fn default_ui_routes() -> Vec<String> {
    ["/", "/catalogue", "/catalogue/", "/try", "/assets/"]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

// HSTS is left out: the local backend is reached over plain HTTP.
fn default_security_headers() -> Vec<SecurityHeader> {
    [
        ("content-security-policy", DEFAULT_CSP),
        ("x-frame-options", "DENY"),
        ("x-content-type-options", "nosniff"),
        ("referrer-policy", "no-referrer"),
    ]
    .iter()
    .map(|(name, value)| SecurityHeader {
        name: (*name).to_string(),
        value: (*value).to_string(),
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_production_domain")]
    pub production_domain: String,

    #[serde(default)]
    pub local: LocalBackend,

    #[serde(default = "default_ui_routes")]
    pub ui_routes: Vec<String>,

    #[serde(default = "default_security_headers")]
    pub security_headers: Vec<SecurityHeader>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            production_domain: default_production_domain(),
            local: LocalBackend::default(),
            ui_routes: default_ui_routes(),
            security_headers: default_security_headers(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LocalBackend {
    #[serde(default = "default_local_host")]
    pub host: String,

    #[serde(default = "default_local_port")]
    pub port: u16,

    #[serde(default = "default_local_scheme")]
    pub scheme: Scheme,
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self {
            host: default_local_host(),
            port: default_local_port(),
            scheme: default_local_scheme(),
        }
    }
}

impl LocalBackend {
    #[must_use]
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityHeader {
    pub name: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.local.scheme, Scheme::Http);
        assert_eq!(config.ui_routes.len(), 5);
        assert_eq!(config.security_headers.len(), 4);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<Config, _> = serde_json::from_str(r#"{"domain": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn partial_local_backend_keeps_other_defaults() {
        let config: Config = serde_json::from_str(r#"{"local": {"port": 3000}}"#).unwrap();
        assert_eq!(config.local.host, "localhost");
        assert_eq!(config.local.port, 3000);
        assert_eq!(config.local.authority(), "localhost:3000");
    }

    #[test]
    fn csp_default_is_single_line() {
        assert!(!DEFAULT_CSP.contains('\n'));
        assert!(DEFAULT_CSP.contains("default-src 'none'; object-src 'none';"));
        assert!(DEFAULT_CSP.ends_with("base-uri 'none';"));
    }
}
