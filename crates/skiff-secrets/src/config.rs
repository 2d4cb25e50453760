//! Configuration for skiff-secrets.

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;

use crate::aggregator::DEFAULT_PAGE_SIZE;
use crate::error::{SecretsError, SecretsResult};

/// Environment variable consulted when no explicit region is configured.
pub const DEFAULT_REGION_VAR: &str = "AWS_DEFAULT_REGION";

/// Aggregator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorConfig {
    /// Name prefix used to filter stored secrets and strip their names.
    #[serde(default)]
    pub prefix: String,

    /// Region for the secret store client. Falls back to the ambient
    /// default region when unset.
    #[serde(default)]
    pub region: Option<String>,

    /// Page size for batch retrieval.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

const fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            region: None,
            page_size: default_page_size(),
        }
    }
}

impl AggregatorConfig {
    /// Load configuration from the default sources.
    ///
    /// Configuration is loaded in the following order (later sources
    /// override earlier):
    /// 1. Default values
    /// 2. `skiff-secrets.toml` in the current directory (if present)
    /// 3. Environment variables with `SKIFF_SECRETS_` prefix
    pub fn load() -> SecretsResult<Self> {
        Figment::new()
            .merge(Toml::file("skiff-secrets.toml"))
            .merge(Env::prefixed("SKIFF_SECRETS_").split("__"))
            .extract()
            .map_err(|e| SecretsError::configuration(e.to_string()))
    }

    /// Load configuration from a specific TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> SecretsResult<Self> {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("SKIFF_SECRETS_").split("__"))
            .extract()
            .map_err(|e| SecretsError::configuration(e.to_string()))
    }

    /// The region to use, resolving the ambient default when unset.
    #[must_use]
    pub fn region(&self) -> String {
        self.region.clone().unwrap_or_else(default_region)
    }
}

/// Ambient default region from the environment; empty when unset.
#[must_use]
pub fn default_region() -> String {
    std::env::var(DEFAULT_REGION_VAR).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AggregatorConfig::default();
        assert_eq!(config.prefix, "");
        assert!(config.region.is_none());
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn config_from_toml() {
        let toml = r#"
            prefix = "prod/shop/"
            region = "us-west-2"
            page_size = 50
        "#;

        let config: AggregatorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.prefix, "prod/shop/");
        assert_eq!(config.region(), "us-west-2");
        assert_eq!(config.page_size, 50);
    }
}
