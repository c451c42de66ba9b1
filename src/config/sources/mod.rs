//! Concrete [`ConfigSource`](super::ConfigSource) implementations.
//!
//! Provides the file-based source (YAML, JSON, TOML, gated by feature
//! flags), the [`builtin`] source used when no file is found, [`resolve`]
//! for picking between them, and the [`parse_config_str`] helper for
//! format-specific deserialization.

pub mod builtin;
pub mod file_source;

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::config::model::Config;
use crate::config::ConfigSource;
use crate::error::ProxyError;
use file_source::{FileFormat, FileSource};

/// File names probed in the working directory when no `--config` is given.
pub const AUTO_DETECT_CANDIDATES: &[&str] = &[
    "splitproxy.yaml",
    "splitproxy.yml",
    "splitproxy.json",
    "splitproxy.toml",
];

fn format_for(ext: &str) -> Result<FileFormat, ProxyError> {
    FileFormat::from_extension(ext).ok_or_else(|| ProxyError::UnsupportedFormat(ext.to_string()))
}

/// Parse a config string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Config, ProxyError> {
    let format = format_for(ext)?;
    format
        .parse(content)
        .map_err(|source| ProxyError::ConfigParse {
            path: path_display.to_string(),
            source,
        })
}

/// Compute a lowercase hex-encoded SHA-256 digest.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Pick the config source: an explicit path, then a file auto-detected in
/// the working directory, then the built-in defaults.
pub async fn resolve(explicit: Option<&Path>) -> Result<Box<dyn ConfigSource>, ProxyError> {
    if let Some(path) = explicit {
        return create_file_source(path);
    }

    for name in AUTO_DETECT_CANDIDATES {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected config file");
            return create_file_source(&path);
        }
    }

    tracing::warn!("no config file found, using built-in defaults");
    Ok(Box::new(builtin::BuiltinSource))
}

pub fn create_file_source(path: &Path) -> Result<Box<dyn ConfigSource>, ProxyError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let format = format_for(ext)?;
    Ok(Box::new(FileSource::new(path.to_path_buf(), format)))
}
