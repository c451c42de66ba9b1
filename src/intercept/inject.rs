//! Response-phase replication of the production security headers.
//!
//! Responses served by the local backend lack the headers the CDN adds
//! in production. [`HeaderInjector::on_response`] overwrites them on
//! locally routed flows so CSP violations show up during development
//! rather than after deploy.

use http::{HeaderName, HeaderValue};

use crate::config::model::SecurityHeader;
use crate::error::ProxyError;
use crate::flow::Flow;

/// Pre-parsed security headers, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct SecurityHeaderSet {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl SecurityHeaderSet {
    pub fn from_config(headers: &[SecurityHeader]) -> Result<Self, ProxyError> {
        let entries = headers
            .iter()
            .map(|h| {
                let invalid = || ProxyError::InvalidHeader {
                    name: h.name.clone(),
                };
                let name = h.name.parse::<HeaderName>().map_err(|_| invalid())?;
                let value = HeaderValue::from_str(&h.value).map_err(|_| invalid())?;
                Ok((name, value))
            })
            .collect::<Result<Vec<_>, ProxyError>>()?;
        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.entries.iter().map(|(n, v)| (n, v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct HeaderInjector {
    headers: SecurityHeaderSet,
}

impl HeaderInjector {
    #[must_use]
    pub const fn new(headers: SecurityHeaderSet) -> Self {
        Self { headers }
    }

    pub fn on_response(&self, flow: &mut Flow) {
        if !flow.is_routed_to_local() {
            return;
        }
        let Some(response) = flow.response.as_mut() else {
            return;
        };

        for (name, value) in self.headers.iter() {
            response.headers.insert(name.clone(), value.clone());
        }

        tracing::debug!(
            flow_id = %flow.id,
            path = %flow.request.path,
            headers = self.headers.len(),
            "applied production security headers"
        );
    }
}
