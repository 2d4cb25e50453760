//! Configuration for skiff-deploy.

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;

use crate::error::{DeployError, DeployResult};
use crate::policy::FailurePolicy;

/// Environment variable consulted when no explicit region is configured.
pub const DEFAULT_REGION_VAR: &str = "AWS_DEFAULT_REGION";

/// Deployment configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DeployConfig {
    /// Region for control plane clients and log routing. Falls back to the
    /// ambient default region when unset.
    #[serde(default)]
    pub region: Option<String>,

    /// Failure policy for multi-service deployments.
    #[serde(default)]
    pub policy: FailurePolicy,
}

impl DeployConfig {
    /// Load configuration from the default sources.
    ///
    /// Configuration is loaded in the following order (later sources
    /// override earlier):
    /// 1. Default values
    /// 2. `skiff-deploy.toml` in the current directory (if present)
    /// 3. Environment variables with `SKIFF_DEPLOY_` prefix
    pub fn load() -> DeployResult<Self> {
        Figment::new()
            .merge(Toml::file("skiff-deploy.toml"))
            .merge(Env::prefixed("SKIFF_DEPLOY_").split("__"))
            .extract()
            .map_err(|e| DeployError::configuration(e.to_string()))
    }

    /// Load configuration from a specific TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> DeployResult<Self> {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("SKIFF_DEPLOY_").split("__"))
            .extract()
            .map_err(|e| DeployError::configuration(e.to_string()))
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
        let config = DeployConfig::default();
        assert!(config.region.is_none());
        assert_eq!(config.policy, FailurePolicy::FailFast);
    }

    #[test]
    fn config_from_toml() {
        let toml = r#"
            region = "ap-northeast-1"
            policy = "best_effort"
        "#;

        let config: DeployConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.region(), "ap-northeast-1");
        assert_eq!(config.policy, FailurePolicy::BestEffort);
    }
}
