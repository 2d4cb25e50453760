//! Error types for skiff-deploy.

use crate::client::ClientError;

/// Result type alias using [`DeployError`].
pub type DeployResult<T> = Result<T, DeployError>;

/// Errors that can occur while rendering specs or driving a deployment.
///
/// Each network-facing operation has its own variant so callers can tell
/// "task definition ok, service update failed" apart from "task definition
/// failed". Nothing is retried at this layer.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// Malformed spec detected before any control plane call.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Family lookup or registration call failed.
    #[error("task definition registration failed for family {family}")]
    TaskDefinitionRegistration {
        /// Task definition family being registered.
        family: String,
        /// Underlying control plane error.
        #[source]
        source: ClientError,
    },

    /// Service update call failed after a successful registration.
    #[error("service update failed for {service} on cluster {cluster}")]
    ServiceUpdate {
        /// Cluster the service belongs to.
        cluster: String,
        /// Service being updated.
        service: String,
        /// Underlying control plane error.
        #[source]
        source: ClientError,
    },

    /// One-off task execution failed.
    #[error("run task failed on cluster {cluster}")]
    RunTask {
        /// Cluster the task was submitted to.
        cluster: String,
        /// Underlying control plane error.
        #[source]
        source: ClientError,
    },

    /// Best-effort deployment finished with one or more failed services.
    #[error("deployment to cluster {cluster} failed for {} service(s)", failures.len())]
    Partial {
        /// Cluster being deployed.
        cluster: String,
        /// Per-service failures, in cluster order.
        failures: Vec<DeployError>,
    },
}

impl DeployError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn registration(family: impl Into<String>, source: ClientError) -> Self {
        Self::TaskDefinitionRegistration {
            family: family.into(),
            source,
        }
    }

    pub(crate) fn service_update(
        cluster: impl Into<String>,
        service: impl Into<String>,
        source: ClientError,
    ) -> Self {
        Self::ServiceUpdate {
            cluster: cluster.into(),
            service: service.into(),
            source,
        }
    }

    pub(crate) fn run_task(cluster: impl Into<String>, source: ClientError) -> Self {
        Self::RunTask {
            cluster: cluster.into(),
            source,
        }
    }
}
