//! `splitproxy check` -- classify URLs without starting the proxy.
//!
//! Runs each URL through the same router the proxy uses and prints the
//! decision, the destination the request would be sent to, and the
//! `Host` header it would carry.

use http::header::HOST;
use http::HeaderValue;
use serde::Serialize;

use crate::cli::{CheckArgs, OutputFormat};
use crate::config::{sources, validation, ConfigSource};
use crate::error::ProxyError;
use crate::flow::{Flow, FlowRequest, Scheme};
use crate::intercept::router::Router;

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub url: String,
    pub decision: Option<&'static str>,
    pub destination: String,
    pub host_header: Option<String>,
}

pub async fn execute(args: &CheckArgs) -> Result<(), ProxyError> {
    let source = sources::resolve(args.config.as_deref()).await?;
    let (config, _) = source.load().await?;
    if let Err(errors) = validation::validate(&config) {
        return Err(ProxyError::ConfigValidation { errors });
    }

    let router = Router::from_config(&config);
    let results = args
        .urls
        .iter()
        .map(|url| check_url(&router, url))
        .collect::<Result<Vec<_>, _>>()?;

    match args.format {
        OutputFormat::Text => {
            for r in &results {
                println!(
                    "{:<18} {}",
                    r.decision.unwrap_or("out_of_domain"),
                    r.url
                );
                if r.destination != r.url {
                    println!("{:<18} -> {}", "", r.destination);
                }
                if let Some(ref host) = r.host_header {
                    println!("{:<18}    Host: {host}", "");
                }
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&results)
                    .map_err(|e| ProxyError::Io(std::io::Error::other(e)))?
            );
        }
    }

    Ok(())
}

/// Classify one URL. Bare paths are resolved against the production domain.
pub fn check_url(router: &Router, raw: &str) -> Result<CheckResult, ProxyError> {
    let absolute = if raw.starts_with('/') {
        format!("https://{}{raw}", router.production_domain())
    } else {
        raw.to_string()
    };

    let invalid = |message: String| ProxyError::InvalidUrl {
        url: raw.to_string(),
        message,
    };

    let parsed = url::Url::parse(&absolute).map_err(|e| invalid(e.to_string()))?;
    let scheme: Scheme = parsed.scheme().parse().map_err(invalid)?;
    let host = parsed
        .host_str()
        .ok_or_else(|| invalid("URL has no host".into()))?;
    let port = parsed.port().unwrap_or_else(|| scheme.default_port());

    let mut path = parsed.path().to_string();
    if let Some(query) = parsed.query() {
        path.push('?');
        path.push_str(query);
    }

    let mut request = FlowRequest::get(scheme, host, &path);
    request.port = port;
    let host_header = parsed.port().map_or_else(|| host.to_string(), |p| format!("{host}:{p}"));
    if let Ok(value) = HeaderValue::from_str(&host_header) {
        request.headers.insert(HOST, value);
    }

    let url = request.url();
    let mut flow = Flow::new(request);
    router.on_request(&mut flow);

    Ok(CheckResult {
        url,
        decision: flow.decision().map(|d| d.as_str()),
        destination: flow.request.url(),
        host_header: flow
            .request
            .headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::Config;

    fn router() -> Router {
        Router::from_config(&Config {
            production_domain: "ndx.example.gov".into(),
            ..Config::default()
        })
    }

    #[test]
    fn bare_path_resolves_against_production_domain() {
        let result = check_url(&router(), "/catalogue/widgets").unwrap();
        assert_eq!(result.decision, Some("routed_to_local"));
        assert_eq!(result.url, "https://ndx.example.gov/catalogue/widgets");
        assert_eq!(result.destination, "http://localhost:8080/catalogue/widgets");
        assert_eq!(result.host_header.as_deref(), Some("ndx.example.gov"));
    }

    #[test]
    fn api_path_is_unchanged() {
        let result = check_url(&router(), "https://ndx.example.gov/api/v1/sessions").unwrap();
        assert_eq!(result.decision, Some("passthrough_api"));
        assert_eq!(result.destination, result.url);
    }

    #[test]
    fn other_domain_has_no_decision() {
        let result = check_url(&router(), "https://other.example.com/").unwrap();
        assert!(result.decision.is_none());
    }

    #[test]
    fn unsupported_scheme_is_an_error() {
        let err = check_url(&router(), "ftp://ndx.example.gov/").unwrap_err();
        assert!(matches!(err, ProxyError::InvalidUrl { .. }));
    }
}
