//! `splitproxy init` -- generate a starter configuration file.
//!
//! Creates a YAML, JSON, or TOML config file with either minimal
//! or fully documented templates.

use std::path::PathBuf;

use crate::cli::{ConfigFormat, InitArgs};
use crate::error::ProxyError;

pub fn execute(args: &InitArgs) -> Result<(), ProxyError> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("splitproxy.{}", args.format.extension())));

    if output.exists() {
        return Err(ProxyError::FileExists { path: output });
    }

    std::fs::write(&output, template(&args.format, args.full))?;
    println!("Created {}", output.display());
    Ok(())
}

#[must_use]
pub fn template(format: &ConfigFormat, full: bool) -> &'static str {
    match (format, full) {
        (ConfigFormat::Yaml, false) => YAML_MINIMAL,
        (ConfigFormat::Yaml, true) => YAML_FULL,
        (ConfigFormat::Json, false) => JSON_MINIMAL,
        (ConfigFormat::Json, true) => JSON_FULL,
        (ConfigFormat::Toml, false) => TOML_MINIMAL,
        (ConfigFormat::Toml, true) => TOML_FULL,
    }
}

const YAML_MINIMAL: &str = r#"# splitproxy config

production_domain: "ndx.digital.cabinet-office.gov.uk"

local:
  host: "localhost"
  port: 8080
"#;

const YAML_FULL: &str = r#"# splitproxy config
#
# Requests to production_domain are split three ways:
#   /api/*            -> production, untouched
#   any ui_routes     -> local backend, Host header still production_domain
#   everything else   -> production, untouched (OAuth callbacks etc.)

production_domain: "ndx.digital.cabinet-office.gov.uk"

local:
  host: "localhost"
  port: 8080
  scheme: "http"               # http | https

# Matched in order. A route matches a path equal to it or starting with it;
# "/" only matches the root page.
ui_routes:
  - "/"
  - "/catalogue"
  - "/catalogue/"
  - "/try"
  - "/assets/"

# Overwritten on every response from the local backend to mirror the CDN.
# HSTS is left out on purpose: the local backend speaks plain HTTP.
security_headers:
  - name: "content-security-policy"
    value: "upgrade-insecure-requests; default-src 'none'; object-src 'none'; script-src 'self'; style-src 'self'; img-src 'self' data:; font-src 'self' data:; connect-src 'self'; manifest-src 'self'; frame-ancestors 'none'; base-uri 'none';"
  - name: "x-frame-options"
    value: "DENY"
  - name: "x-content-type-options"
    value: "nosniff"
  - name: "referrer-policy"
    value: "no-referrer"
  # - name: "strict-transport-security"
  #   value: "max-age=46656000; includeSubDomains"
"#;

const JSON_MINIMAL: &str = r#"{
  "production_domain": "ndx.digital.cabinet-office.gov.uk",
  "local": {
    "host": "localhost",
    "port": 8080
  }
}
"#;

const JSON_FULL: &str = r#"{
  "production_domain": "ndx.digital.cabinet-office.gov.uk",
  "local": {
    "host": "localhost",
    "port": 8080,
    "scheme": "http"
  },
  "ui_routes": ["/", "/catalogue", "/catalogue/", "/try", "/assets/"],
  "security_headers": [
    {
      "name": "content-security-policy",
      "value": "upgrade-insecure-requests; default-src 'none'; object-src 'none'; script-src 'self'; style-src 'self'; img-src 'self' data:; font-src 'self' data:; connect-src 'self'; manifest-src 'self'; frame-ancestors 'none'; base-uri 'none';"
    },
    { "name": "x-frame-options", "value": "DENY" },
    { "name": "x-content-type-options", "value": "nosniff" },
    { "name": "referrer-policy", "value": "no-referrer" }
  ]
}
"#;

const TOML_MINIMAL: &str = r#"# splitproxy config

production_domain = "ndx.digital.cabinet-office.gov.uk"

[local]
host = "localhost"
port = 8080
"#;

const TOML_FULL: &str = r#"# splitproxy config
#
# Requests to production_domain are split three ways:
#   /api/*            -> production, untouched
#   any ui_routes     -> local backend, Host header still production_domain
#   everything else   -> production, untouched (OAuth callbacks etc.)

production_domain = "ndx.digital.cabinet-office.gov.uk"

# Matched in order. A route matches a path equal to it or starting with it;
# "/" only matches the root page.
ui_routes = ["/", "/catalogue", "/catalogue/", "/try", "/assets/"]

[local]
host = "localhost"
port = 8080
scheme = "http"                # http | https

# Overwritten on every response from the local backend to mirror the CDN.
# HSTS is left out on purpose: the local backend speaks plain HTTP.
[[security_headers]]
name = "content-security-policy"
value = "upgrade-insecure-requests; default-src 'none'; object-src 'none'; script-src 'self'; style-src 'self'; img-src 'self' data:; font-src 'self' data:; connect-src 'self'; manifest-src 'self'; frame-ancestors 'none'; base-uri 'none';"

[[security_headers]]
name = "x-frame-options"
value = "DENY"

[[security_headers]]
name = "x-content-type-options"
value = "nosniff"

[[security_headers]]
name = "referrer-policy"
value = "no-referrer"
"#;
