//! Config source that serves [`Config::default`] without touching disk.

use async_trait::async_trait;

use crate::config::model::Config;
use crate::config::{ConfigSource, ConfigVersion};
use crate::error::ProxyError;

pub struct BuiltinSource;

#[async_trait]
impl ConfigSource for BuiltinSource {
    fn name(&self) -> &'static str {
        "builtin"
    }

    async fn load(&self) -> Result<(Config, ConfigVersion), ProxyError> {
        Ok((Config::default(), ConfigVersion::Builtin))
    }
}
