//! Deployment sequencing against the control plane.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::client::{ApiStatus, ControlPlaneClient};
use crate::config::DeployConfig;
use crate::error::{DeployError, DeployResult};
use crate::policy::FailurePolicy;
use crate::service::{ClusterSpec, ServiceSpec};
use crate::task::{ImageRef, TaskDefinitionId, TaskDefinitionSpec};

/// Drives task definition registration and service updates for a cluster.
///
/// One orchestrator is constructed per deployment run; it holds a client
/// handle and a failure policy but no state of its own. Every control plane
/// call is awaited before the next one is issued and nothing is retried
/// here; retry and backoff belong to the client implementation.
pub struct DeployOrchestrator {
    client: Arc<dyn ControlPlaneClient>,
    policy: FailurePolicy,
}

impl DeployOrchestrator {
    /// Create an orchestrator with the default fail-fast policy.
    #[must_use]
    pub fn new(client: Arc<dyn ControlPlaneClient>) -> Self {
        Self {
            client,
            policy: FailurePolicy::default(),
        }
    }

    /// Set the failure policy for cluster deployments.
    #[must_use]
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Create an orchestrator from configuration.
    #[must_use]
    pub fn from_config(client: Arc<dyn ControlPlaneClient>, config: &DeployConfig) -> Self {
        Self {
            client,
            policy: config.policy,
        }
    }

    /// Register a task definition and return the identifier assigned by the
    /// control plane.
    ///
    /// The family is looked up first so that a misspelled family name fails
    /// with a clear signal instead of the registration quietly creating a
    /// new family. Rendering happens before either call, so configuration
    /// errors surface without any network traffic.
    pub async fn register_task_definition(
        &self,
        spec: &TaskDefinitionSpec,
        image: &ImageRef,
    ) -> DeployResult<TaskDefinitionId> {
        self.register_with_command(spec, image, None).await
    }

    async fn register_with_command(
        &self,
        spec: &TaskDefinitionSpec,
        image: &ImageRef,
        command_override: Option<&[String]>,
    ) -> DeployResult<TaskDefinitionId> {
        let family = spec.family();
        let payload = spec.render_with_command(image, command_override)?;

        self.client
            .describe_task_family(family)
            .await
            .and_then(ApiStatus::ok)
            .map_err(|e| DeployError::registration(family, e))?;

        debug!(family, "task definition family exists");

        let response = self
            .client
            .register_task_definition(&payload)
            .await
            .map_err(|e| DeployError::registration(family, e))?;
        response
            .status
            .ok()
            .map_err(|e| DeployError::registration(family, e))?;

        info!(
            family,
            id = %response.task_definition_id,
            "registered task definition"
        );

        Ok(response.task_definition_id)
    }

    /// Point a service at a registered task definition.
    pub async fn update_service(
        &self,
        cluster: &str,
        service: &ServiceSpec,
        task_definition: &TaskDefinitionId,
    ) -> DeployResult<()> {
        let payload = service.render(cluster, task_definition);

        let response = self
            .client
            .update_service(&payload)
            .await
            .map_err(|e| DeployError::service_update(cluster, service.name(), e))?;
        response
            .status
            .ok()
            .map_err(|e| DeployError::service_update(cluster, service.name(), e))?;

        info!(cluster, service = service.name(), "service updated");

        Ok(())
    }

    /// Deploy every service in the cluster, in order.
    ///
    /// Each service goes through register-then-update sequentially. Under
    /// [`FailurePolicy::FailFast`] the first failure propagates immediately
    /// and later services are not attempted; under
    /// [`FailurePolicy::BestEffort`] every service is attempted and the
    /// failures are reported together.
    pub async fn deploy_cluster(&self, cluster: &ClusterSpec, image: &ImageRef) -> DeployResult<()> {
        info!(
            cluster = cluster.name(),
            services = cluster.services().len(),
            policy = %self.policy,
            image = %image,
            "starting cluster deployment"
        );

        match self.policy {
            FailurePolicy::FailFast => {
                for service in cluster.services() {
                    self.deploy_service(cluster.name(), service, image).await?;
                }
            }
            FailurePolicy::BestEffort => {
                let mut failures = Vec::new();
                for service in cluster.services() {
                    if let Err(e) = self.deploy_service(cluster.name(), service, image).await {
                        error!(
                            cluster = cluster.name(),
                            service = service.name(),
                            error = %e,
                            "service deployment failed"
                        );
                        failures.push(e);
                    }
                }
                if !failures.is_empty() {
                    return Err(DeployError::Partial {
                        cluster: cluster.name().to_owned(),
                        failures,
                    });
                }
            }
        }

        info!(cluster = cluster.name(), "cluster deployment complete");

        Ok(())
    }

    async fn deploy_service(
        &self,
        cluster: &str,
        service: &ServiceSpec,
        image: &ImageRef,
    ) -> DeployResult<()> {
        let id = self
            .register_task_definition(service.task_definition(), image)
            .await?;
        self.update_service(cluster, service, &id).await
    }

    /// Run the cluster's one-off task once.
    ///
    /// Does nothing when the cluster has no one-off task configured; a
    /// cluster legitimately may not support ad-hoc execution. A non-empty
    /// command override replaces the spec's command for this invocation
    /// only; the spec itself is left untouched.
    pub async fn run_once(
        &self,
        cluster: &ClusterSpec,
        image: &ImageRef,
        command_override: Option<&[String]>,
    ) -> DeployResult<()> {
        let Some(spec) = cluster.run_task() else {
            debug!(cluster = cluster.name(), "no one-off task configured");
            return Ok(());
        };

        let id = self
            .register_with_command(spec, image, command_override)
            .await?;

        let response = self
            .client
            .run_task(cluster.name(), &id, 1)
            .await
            .map_err(|e| DeployError::run_task(cluster.name(), e))?;
        response
            .status
            .ok()
            .map_err(|e| DeployError::run_task(cluster.name(), e))?;

        info!(cluster = cluster.name(), id = %id, "one-off task started");

        Ok(())
    }
}

impl std::fmt::Debug for DeployOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeployOrchestrator")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
