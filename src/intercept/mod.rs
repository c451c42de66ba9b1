//! The interception core: per-flow hooks invoked by the host proxy.
//!
//! [`FlowHook`] is the seam between the core and whatever transport
//! drives it. [`Interceptor`] implements it by running the
//! [`Router`](router::Router) in the request phase and the
//! [`HeaderInjector`](inject::HeaderInjector) in the response phase.
//! The two share nothing but the decision tag stored on the [`Flow`].

pub mod inject;
pub mod router;

use crate::config::model::Config;
use crate::error::ProxyError;
use crate::flow::Flow;

use inject::{HeaderInjector, SecurityHeaderSet};
use router::Router;

/// Callbacks a host proxy invokes for every intercepted exchange.
///
/// `on_response` is only called after `on_request` has returned for the
/// same flow.
pub trait FlowHook: Send + Sync {
    fn on_request(&self, flow: &mut Flow);
    fn on_response(&self, flow: &mut Flow);
}

#[derive(Debug, Clone)]
pub struct Interceptor {
    router: Router,
    injector: HeaderInjector,
}

impl Interceptor {
    pub fn from_config(config: &Config) -> Result<Self, ProxyError> {
        let headers = SecurityHeaderSet::from_config(&config.security_headers)?;
        Ok(Self {
            router: Router::from_config(config),
            injector: HeaderInjector::new(headers),
        })
    }

    #[must_use]
    pub const fn router(&self) -> &Router {
        &self.router
    }
}

impl FlowHook for Interceptor {
    fn on_request(&self, flow: &mut Flow) {
        self.router.on_request(flow);
    }

    fn on_response(&self, flow: &mut Flow) {
        self.injector.on_response(flow);
    }
}
