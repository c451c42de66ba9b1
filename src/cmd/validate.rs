//! `splitproxy validate` -- check a configuration file for errors.
//!
//! Loads the file through the same [`ConfigSource`] path `run` uses and
//! reports the outcome as text or JSON.

use std::path::Path;

use crate::cli::{OutputFormat, ValidateArgs};
use crate::config::{sources, validation, ConfigSource};
use crate::error::{ProxyError, ValidationError};

pub async fn execute(args: &ValidateArgs) -> Result<(), ProxyError> {
    let path = &args.config;
    let source = sources::create_file_source(path)?;

    let (config, version) = match source.load().await {
        Ok(loaded) => loaded,
        Err(ProxyError::ConfigValidation { errors }) => {
            report_errors(path, &errors, &args.format);
            return Err(ProxyError::ConfigValidation { errors });
        }
        Err(e) => return Err(e),
    };

    match args.format {
        OutputFormat::Text => {
            println!(
                "\u{2713} {}\n  version:           {}",
                validation::format_validation_report(&path.display().to_string(), &config),
                version.short()
            );
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "valid": true,
                    "format": source.name(),
                    "version": version.short(),
                    "production_domain": config.production_domain,
                    "ui_routes": config.ui_routes.len(),
                    "security_headers": config.security_headers.len(),
                })
            );
        }
    }

    Ok(())
}

fn report_errors(path: &Path, errors: &[ValidationError], format: &OutputFormat) {
    match format {
        OutputFormat::Text => {
            eprintln!("\u{2717} {} has {} errors\n", path.display(), errors.len());
            for error in errors {
                eprintln!("{error}");
            }
        }
        OutputFormat::Json => {
            let errors: Vec<_> = errors
                .iter()
                .map(|e| {
                    serde_json::json!({
                        "section": e.section,
                        "field": e.field,
                        "message": e.message,
                        "suggestion": e.suggestion,
                    })
                })
                .collect();
            println!("{}", serde_json::json!({ "valid": false, "errors": errors }));
        }
    }
}
