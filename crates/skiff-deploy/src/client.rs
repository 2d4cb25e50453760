//! Control plane client abstraction.
//!
//! The orchestrator drives the control plane through [`ControlPlaneClient`].
//! Transport, authentication, timeouts, and retries belong to
//! implementations; this layer only sequences calls and inspects response
//! statuses.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::service::ServiceUpdatePayload;
use crate::task::{TaskDefinitionId, TaskDefinitionPayload};

/// Error reported by a control plane client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// The request never produced a usable response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The control plane answered with a non-success status.
    #[error("control plane returned status {0}")]
    Status(u16),

    /// The named task definition family is not known to the control plane.
    #[error("unknown task definition family: {0}")]
    UnknownFamily(String),
}

/// Success/failure discriminator for control plane responses.
///
/// Wraps the transport-level status code but only the success class is
/// interpreted here; exact codes are a collaborator detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiStatus(u16);

impl ApiStatus {
    /// The canonical success status.
    pub const OK: Self = Self(200);

    /// Wrap a transport status code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// The wrapped status code.
    #[must_use]
    pub const fn code(self) -> u16 {
        self.0
    }

    /// Whether the status indicates success.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Convert a non-success status into a [`ClientError`].
    pub(crate) fn ok(self) -> Result<(), ClientError> {
        if self.is_success() {
            Ok(())
        } else {
            Err(ClientError::Status(self.0))
        }
    }
}

/// Response to a task definition registration.
#[derive(Debug, Clone)]
pub struct RegisterTaskDefinitionResponse {
    /// Response status.
    pub status: ApiStatus,
    /// Identifier of the newly registered revision.
    pub task_definition_id: TaskDefinitionId,
}

/// Response to a service update.
#[derive(Debug, Clone)]
pub struct UpdateServiceResponse {
    /// Response status.
    pub status: ApiStatus,
}

/// Response to a run-task request.
#[derive(Debug, Clone)]
pub struct RunTaskResponse {
    /// Response status.
    pub status: ApiStatus,
}

/// Trait for control plane implementations.
#[async_trait]
pub trait ControlPlaneClient: Send + Sync {
    /// Existence check for a task definition family.
    ///
    /// Used to fail fast on a misspelled family before registration would
    /// silently create a new one.
    async fn describe_task_family(&self, family: &str) -> Result<ApiStatus, ClientError>;

    /// Register a new task definition revision.
    async fn register_task_definition(
        &self,
        payload: &TaskDefinitionPayload,
    ) -> Result<RegisterTaskDefinitionResponse, ClientError>;

    /// Point a service at a task definition revision.
    async fn update_service(
        &self,
        payload: &ServiceUpdatePayload,
    ) -> Result<UpdateServiceResponse, ClientError>;

    /// Start `count` one-off instances of a task definition on a cluster.
    async fn run_task(
        &self,
        cluster: &str,
        task_definition: &TaskDefinitionId,
        count: u32,
    ) -> Result<RunTaskResponse, ClientError>;
}

#[derive(Debug, Default)]
struct MockState {
    known_families: HashSet<String>,
    describes: Vec<String>,
    registered: Vec<TaskDefinitionPayload>,
    service_updates: Vec<ServiceUpdatePayload>,
    run_tasks: Vec<(String, TaskDefinitionId, u32)>,
    fail_register: HashSet<String>,
    fail_update: HashSet<String>,
    fail_run_task: bool,
    revision: u64,
}

/// Mock control plane for testing.
///
/// Records every call so tests can assert on attempt counts and payload
/// contents, and lets failures be scripted per family, per service, or for
/// run-task requests. Scripted failures come back as a non-success status
/// rather than a transport error.
#[derive(Debug, Default)]
pub struct MockControlPlane {
    inner: Mutex<MockState>,
}

impl MockControlPlane {
    /// Create an empty mock with no known families.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a family so the existence check passes.
    #[must_use]
    pub fn with_family(self, family: impl Into<String>) -> Self {
        if let Ok(mut state) = self.inner.lock() {
            state.known_families.insert(family.into());
        }
        self
    }

    /// Script the next registrations for `family` to return a failed status.
    pub fn fail_register(&self, family: impl Into<String>) {
        if let Ok(mut state) = self.inner.lock() {
            state.fail_register.insert(family.into());
        }
    }

    /// Script updates for `service` to return a failed status.
    pub fn fail_update(&self, service: impl Into<String>) {
        if let Ok(mut state) = self.inner.lock() {
            state.fail_update.insert(service.into());
        }
    }

    /// Script run-task requests to return a failed status.
    pub fn fail_run_task(&self) {
        if let Ok(mut state) = self.inner.lock() {
            state.fail_run_task = true;
        }
    }

    /// Families passed to the existence check, in call order.
    #[must_use]
    pub fn describes(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|s| s.describes.clone())
            .unwrap_or_default()
    }

    /// Registration payloads received, in call order (including attempts
    /// that were answered with a failed status).
    #[must_use]
    pub fn registered(&self) -> Vec<TaskDefinitionPayload> {
        self.inner
            .lock()
            .map(|s| s.registered.clone())
            .unwrap_or_default()
    }

    /// Service update payloads received, in call order.
    #[must_use]
    pub fn service_updates(&self) -> Vec<ServiceUpdatePayload> {
        self.inner
            .lock()
            .map(|s| s.service_updates.clone())
            .unwrap_or_default()
    }

    /// Run-task requests received, as (cluster, id, count) tuples.
    #[must_use]
    pub fn run_tasks(&self) -> Vec<(String, TaskDefinitionId, u32)> {
        self.inner
            .lock()
            .map(|s| s.run_tasks.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ControlPlaneClient for MockControlPlane {
    async fn describe_task_family(&self, family: &str) -> Result<ApiStatus, ClientError> {
        let mut state = self
            .inner
            .lock()
            .map_err(|_| ClientError::Transport("lock poisoned".to_owned()))?;

        state.describes.push(family.to_owned());

        if state.known_families.contains(family) {
            Ok(ApiStatus::OK)
        } else {
            Err(ClientError::UnknownFamily(family.to_owned()))
        }
    }

    async fn register_task_definition(
        &self,
        payload: &TaskDefinitionPayload,
    ) -> Result<RegisterTaskDefinitionResponse, ClientError> {
        let mut state = self
            .inner
            .lock()
            .map_err(|_| ClientError::Transport("lock poisoned".to_owned()))?;

        state.registered.push(payload.clone());

        if state.fail_register.contains(&payload.family) {
            return Ok(RegisterTaskDefinitionResponse {
                status: ApiStatus::new(500),
                task_definition_id: TaskDefinitionId::new(""),
            });
        }

        state.revision += 1;
        let id = TaskDefinitionId::new(format!("taskdef/{}:{}", payload.family, state.revision));

        Ok(RegisterTaskDefinitionResponse {
            status: ApiStatus::OK,
            task_definition_id: id,
        })
    }

    async fn update_service(
        &self,
        payload: &ServiceUpdatePayload,
    ) -> Result<UpdateServiceResponse, ClientError> {
        let mut state = self
            .inner
            .lock()
            .map_err(|_| ClientError::Transport("lock poisoned".to_owned()))?;

        state.service_updates.push(payload.clone());

        let status = if state.fail_update.contains(&payload.service) {
            ApiStatus::new(500)
        } else {
            ApiStatus::OK
        };

        Ok(UpdateServiceResponse { status })
    }

    async fn run_task(
        &self,
        cluster: &str,
        task_definition: &TaskDefinitionId,
        count: u32,
    ) -> Result<RunTaskResponse, ClientError> {
        let mut state = self
            .inner
            .lock()
            .map_err(|_| ClientError::Transport("lock poisoned".to_owned()))?;

        state
            .run_tasks
            .push((cluster.to_owned(), task_definition.clone(), count));

        let status = if state.fail_run_task {
            ApiStatus::new(500)
        } else {
            ApiStatus::OK
        };

        Ok(RunTaskResponse { status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{ImageRef, TaskDefinitionSpec};

    #[test]
    fn api_status_success_class() {
        assert!(ApiStatus::OK.is_success());
        assert!(ApiStatus::new(204).is_success());
        assert!(!ApiStatus::new(404).is_success());
        assert!(!ApiStatus::new(500).is_success());
    }

    #[tokio::test]
    async fn mock_assigns_incrementing_revisions() {
        let mock = MockControlPlane::new().with_family("web");
        let image = ImageRef::new("repo", "v1").unwrap();
        let payload = TaskDefinitionSpec::new("web").render(&image).unwrap();

        let first = mock.register_task_definition(&payload).await.unwrap();
        let second = mock.register_task_definition(&payload).await.unwrap();

        assert_eq!(first.task_definition_id.as_str(), "taskdef/web:1");
        assert_eq!(second.task_definition_id.as_str(), "taskdef/web:2");
        assert_eq!(mock.registered().len(), 2);
    }

    #[tokio::test]
    async fn mock_unknown_family_fails_describe() {
        let mock = MockControlPlane::new();

        let err = mock.describe_task_family("nope").await.unwrap_err();
        assert!(matches!(err, ClientError::UnknownFamily(f) if f == "nope"));
        assert_eq!(mock.describes(), ["nope"]);
    }
}
