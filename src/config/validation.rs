//! Configuration validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`Config`] for problems
//! that would otherwise only show up as odd routing at runtime: a
//! production domain written as a URL, an unusable local backend, UI
//! routes that can never match, and security headers that cannot be
//! encoded. Returns every [`ValidationError`] found, not just the first.

use std::collections::HashSet;

use http::{HeaderName, HeaderValue};

use super::model::{Config, API_PREFIX};
use crate::error::ValidationError;

/// Validate the production domain. Returns `Ok(())` or a human-readable error.
pub fn validate_domain(domain: &str) -> Result<(), String> {
    if domain.is_empty() {
        return Err("domain cannot be empty".into());
    }
    if domain.contains("://") {
        return Err("domain must be a bare host name, not a URL".into());
    }
    if domain.contains('/') {
        return Err("domain cannot contain a path".into());
    }
    if domain.contains(':') {
        return Err("domain cannot contain a port".into());
    }
    if domain.chars().any(char::is_whitespace) {
        return Err("domain cannot contain whitespace".into());
    }
    Ok(())
}

/// Validate a single UI route prefix. Returns `Ok(())` or a human-readable error.
pub fn validate_ui_route(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("path cannot be empty".into());
    }
    if !path.starts_with('/') {
        return Err(format!(
            "path must start with '/' (did you mean '/{path}'?)"
        ));
    }
    if path.contains('?') {
        return Err("path cannot contain a query string".into());
    }
    if path.starts_with(API_PREFIX) {
        return Err(format!(
            "paths under '{API_PREFIX}' always pass through to production and can never match"
        ));
    }
    Ok(())
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(msg) = validate_domain(&config.production_domain) {
        let suggestion = url::Url::parse(&config.production_domain)
            .ok()
            .and_then(|u| u.host_str().map(|h| format!("did you mean '{h}'?")));
        errors.push(ValidationError {
            section: "(root)".into(),
            field: "production_domain".into(),
            message: msg,
            suggestion,
        });
    }

    if config.local.host.is_empty() {
        errors.push(ValidationError {
            section: "local".into(),
            field: "host".into(),
            message: "host cannot be empty".into(),
            suggestion: Some("use 'localhost' for a dev server on this machine".into()),
        });
    }

    if config.local.port == 0 {
        errors.push(ValidationError {
            section: "local".into(),
            field: "port".into(),
            message: "port cannot be 0".into(),
            suggestion: None,
        });
    }

    if config.ui_routes.is_empty() {
        errors.push(ValidationError {
            section: "(root)".into(),
            field: "ui_routes".into(),
            message: "at least one UI route must be defined".into(),
            suggestion: None,
        });
    }

    let mut seen_routes = HashSet::new();
    for (i, route) in config.ui_routes.iter().enumerate() {
        let section = format!("ui_routes[{i}]");

        if let Err(msg) = validate_ui_route(route) {
            errors.push(ValidationError {
                section: section.clone(),
                field: "path".into(),
                message: msg,
                suggestion: None,
            });
        }

        if !seen_routes.insert(route.as_str()) {
            errors.push(ValidationError {
                section,
                field: "path".into(),
                message: format!("duplicate UI route '{route}'"),
                suggestion: None,
            });
        }
    }

    let mut seen_headers = HashSet::new();
    for (i, header) in config.security_headers.iter().enumerate() {
        let section = format!("security_headers[{i}]");

        match header.name.parse::<HeaderName>() {
            Ok(name) => {
                if !seen_headers.insert(name) {
                    errors.push(ValidationError {
                        section: section.clone(),
                        field: "name".into(),
                        message: format!("duplicate header '{}'", header.name),
                        suggestion: Some("header names are case-insensitive".into()),
                    });
                }
            }
            Err(_) => errors.push(ValidationError {
                section: section.clone(),
                field: "name".into(),
                message: format!("'{}' is not a valid header name", header.name),
                suggestion: None,
            }),
        }

        if HeaderValue::from_str(&header.value).is_err() {
            errors.push(ValidationError {
                section,
                field: "value".into(),
                message: "value contains characters not allowed in a header".into(),
                suggestion: Some("keep the value on a single line".into()),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[must_use]
pub fn format_validation_report(path: &str, config: &Config) -> String {
    let mut lines = vec![
        format!("  production domain: {}", config.production_domain),
        format!(
            "  local backend:     {}://{}",
            config.local.scheme,
            config.local.authority()
        ),
        format!("  ui routes ({}):", config.ui_routes.len()),
    ];
    lines.extend(config.ui_routes.iter().map(|r| format!("    {r}")));
    lines.push(format!(
        "  security headers ({}):",
        config.security_headers.len()
    ));
    lines.extend(
        config
            .security_headers
            .iter()
            .map(|h| format!("    {}", h.name)),
    );

    format!("{path} is valid\n{}", lines.join("\n"))
}
