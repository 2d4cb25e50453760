//! Failure policies for multi-service deployments.
//!
//! Deployments fan out over the services of a cluster. What happens when one
//! service fails is an explicit, configurable choice rather than an artifact
//! of the loop driving the deployment.

use serde::{Deserialize, Serialize};

/// How a cluster deployment reacts to a failing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failing service.
    ///
    /// The failure propagates immediately; services later in the cluster
    /// order are not attempted. Suited to small deployments where an
    /// operator reacts to the first failure.
    #[default]
    FailFast,

    /// Attempt every service and report the failures together.
    ///
    /// Each service still runs register-then-update sequentially; failures
    /// are collected and returned as one aggregate error once all services
    /// have been attempted.
    BestEffort,
}

impl FailurePolicy {
    /// Get the policy name as a static string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FailFast => "fail_fast",
            Self::BestEffort => "best_effort",
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_fail_fast() {
        assert_eq!(FailurePolicy::default(), FailurePolicy::FailFast);
    }

    #[test]
    fn serde_from_string() {
        let fail_fast: FailurePolicy = serde_json::from_str(r#""fail_fast""#).unwrap();
        assert_eq!(fail_fast, FailurePolicy::FailFast);

        let best_effort: FailurePolicy = serde_json::from_str(r#""best_effort""#).unwrap();
        assert_eq!(best_effort, FailurePolicy::BestEffort);
    }

    #[test]
    fn display_matches_serde_name() {
        assert_eq!(FailurePolicy::FailFast.to_string(), "fail_fast");
        assert_eq!(FailurePolicy::BestEffort.to_string(), "best_effort");
    }
}
