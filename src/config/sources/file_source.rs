//! File-backed config source.
//!
//! [`FileFormat`] maps a file extension to the serde backend enabled for
//! it. [`FileSource`] reads the file with Tokio, validates the result, and
//! versions it by the SHA-256 of its contents so the startup log shows
//! exactly which file contents are in effect.

use std::path::PathBuf;

use async_trait::async_trait;

use super::sha256_hex;
use crate::config::model::Config;
use crate::config::validation::validate;
use crate::config::{ConfigSource, ConfigVersion};
use crate::error::ProxyError;

/// A config file format compiled into this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    #[cfg(feature = "yaml")]
    Yaml,
    #[cfg(feature = "json")]
    Json,
    #[cfg(feature = "toml")]
    Toml,
}

impl FileFormat {
    /// `None` when the extension is unknown or its feature is disabled.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Some(Self::Yaml),
            #[cfg(feature = "json")]
            "json" => Some(Self::Json),
            #[cfg(feature = "toml")]
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            #[cfg(feature = "yaml")]
            Self::Yaml => "yaml",
            #[cfg(feature = "json")]
            Self::Json => "json",
            #[cfg(feature = "toml")]
            Self::Toml => "toml",
        }
    }

    pub fn parse(
        self,
        content: &str,
    ) -> Result<Config, Box<dyn std::error::Error + Send + Sync>> {
        match self {
            #[cfg(feature = "yaml")]
            Self::Yaml => Ok(serde_yml::from_str(content)?),
            #[cfg(feature = "json")]
            Self::Json => Ok(serde_json::from_str(content)?),
            #[cfg(feature = "toml")]
            Self::Toml => Ok(toml::from_str(content)?),
        }
    }
}

pub struct FileSource {
    path: PathBuf,
    format: FileFormat,
}

impl FileSource {
    #[must_use]
    pub const fn new(path: PathBuf, format: FileFormat) -> Self {
        Self { path, format }
    }

    async fn read_content(&self) -> Result<String, ProxyError> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProxyError::ConfigFileNotFound {
                    path: self.path.clone(),
                }
            } else {
                ProxyError::Io(e)
            }
        })
    }
}

#[async_trait]
impl ConfigSource for FileSource {
    fn name(&self) -> &'static str {
        self.format.name()
    }

    async fn load(&self) -> Result<(Config, ConfigVersion), ProxyError> {
        let content = self.read_content().await?;

        let config = self
            .format
            .parse(&content)
            .map_err(|source| ProxyError::ConfigParse {
                path: self.path.display().to_string(),
                source,
            })?;

        validate(&config).map_err(|errors| ProxyError::ConfigValidation { errors })?;

        Ok((config, ConfigVersion::Hash(sha256_hex(content.as_bytes()))))
    }
}

#[cfg(all(test, feature = "yaml"))]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("splitproxy-{}-{name}", std::process::id()))
    }

    #[test]
    fn yml_is_an_alias_for_yaml() {
        assert_eq!(FileFormat::from_extension("yml"), Some(FileFormat::Yaml));
        assert_eq!(FileFormat::from_extension("ini"), None);
    }

    #[tokio::test]
    async fn missing_file_is_reported_by_path() {
        let path = temp_path("missing.yaml");
        let err = FileSource::new(path.clone(), FileFormat::Yaml)
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::ConfigFileNotFound { path: p } if p == path));
    }

    #[tokio::test]
    async fn loads_validates_and_hashes() {
        let path = temp_path("valid.yaml");
        let content = "production_domain: ndx.example.gov\n";
        tokio::fs::write(&path, content).await.unwrap();

        let (config, version) = FileSource::new(path.clone(), FileFormat::Yaml)
            .load()
            .await
            .unwrap();
        assert_eq!(config.production_domain, "ndx.example.gov");
        assert_eq!(version, ConfigVersion::Hash(sha256_hex(content.as_bytes())));

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let path = temp_path("invalid.yaml");
        tokio::fs::write(&path, "ui_routes: []\n").await.unwrap();

        let err = FileSource::new(path.clone(), FileFormat::Yaml)
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::ConfigValidation { .. }));

        let _ = tokio::fs::remove_file(&path).await;
    }
}
