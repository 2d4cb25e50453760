//! Service and cluster specifications.

use serde::{Deserialize, Serialize};

use crate::task::{TaskDefinitionId, TaskDefinitionSpec};

/// Minimal service update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUpdatePayload {
    /// Cluster the service runs on.
    pub cluster: String,
    /// Service name.
    pub service: String,
    /// Task definition identifier the service should run.
    pub task_definition: String,
}

/// A named service paired with the task definition it runs.
#[derive(Debug, Clone)]
pub struct ServiceSpec {
    name: String,
    task_definition: TaskDefinitionSpec,
}

impl ServiceSpec {
    /// Create a service spec.
    #[must_use]
    pub fn new(name: impl Into<String>, task_definition: TaskDefinitionSpec) -> Self {
        Self {
            name: name.into(),
            task_definition,
        }
    }

    /// Service name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The task definition this service runs.
    #[must_use]
    pub fn task_definition(&self) -> &TaskDefinitionSpec {
        &self.task_definition
    }

    /// Render the service update request.
    ///
    /// Needs the cluster name and the identifier returned by a successful
    /// registration; a service update cannot be rendered standalone.
    #[must_use]
    pub fn render(&self, cluster: &str, task_definition: &TaskDefinitionId) -> ServiceUpdatePayload {
        ServiceUpdatePayload {
            cluster: cluster.to_owned(),
            service: self.name.clone(),
            task_definition: task_definition.as_str().to_owned(),
        }
    }
}

/// A cluster name, its services in deployment order, and an optional
/// task definition for one-off execution.
///
/// The services' task definitions are independent of each other; each is
/// registered on its own during a deployment.
#[derive(Debug, Clone)]
pub struct ClusterSpec {
    name: String,
    services: Vec<ServiceSpec>,
    run_task: Option<TaskDefinitionSpec>,
}

impl ClusterSpec {
    /// Create an empty cluster spec.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            services: Vec::new(),
            run_task: None,
        }
    }

    /// Append a service. Deployment follows insertion order.
    #[must_use]
    pub fn with_service(mut self, service: ServiceSpec) -> Self {
        self.services.push(service);
        self
    }

    /// Set the task definition used for one-off execution.
    #[must_use]
    pub fn with_run_task(mut self, spec: TaskDefinitionSpec) -> Self {
        self.run_task = Some(spec);
        self
    }

    /// Cluster name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Services in deployment order.
    #[must_use]
    pub fn services(&self) -> &[ServiceSpec] {
        &self.services
    }

    /// The one-off task definition, when the cluster supports ad-hoc
    /// execution.
    #[must_use]
    pub fn run_task(&self) -> Option<&TaskDefinitionSpec> {
        self.run_task.as_ref()
    }
}

impl Default for ClusterSpec {
    fn default() -> Self {
        Self::new("default")
    }
}
