//! Skiff deployment orchestration.
//!
//! This crate renders declarative task, service, and cluster specs into the
//! request payloads a container orchestration control plane expects, and
//! sequences the calls of a deployment: register each service's task
//! definition, then point the service at the newly registered revision.
//! One-off tasks (migrations, scripts) can be registered and executed
//! separately.
//!
//! # Architecture
//!
//! - **Specs** ([`TaskDefinitionSpec`], [`ServiceSpec`], [`ClusterSpec`]):
//!   immutable configuration values. Rendering is a pure transformation;
//!   image coordinates arrive at render time because they change on every
//!   deployment.
//! - **Client** ([`ControlPlaneClient`]): the control plane as a
//!   collaborator trait. Transport, auth, and retries live in
//!   implementations; [`MockControlPlane`] records calls for tests.
//! - **Orchestrator** ([`DeployOrchestrator`]): drives the
//!   register-then-update sequence per service, strictly one call at a
//!   time, with an explicit [`FailurePolicy`] for multi-service clusters.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use skiff_deploy::{
//!     ClusterSpec, DeployOrchestrator, ImageRef, ServiceSpec, TaskDefinitionSpec,
//! };
//!
//! let cluster = ClusterSpec::new("production")
//!     .with_service(ServiceSpec::new("web", TaskDefinitionSpec::new("web")))
//!     .with_run_task(TaskDefinitionSpec::new("migrate").with_command(["rake", "db:migrate"]));
//!
//! let image = ImageRef::new("registry.example.com/web", "v42")?;
//! let orchestrator = DeployOrchestrator::new(client);
//!
//! orchestrator.deploy_cluster(&cluster, &image).await?;
//! orchestrator.run_once(&cluster, &image, None).await?;
//! ```

#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod policy;
pub mod service;
pub mod task;

// Re-export commonly used types at the crate root
pub use client::{
    ApiStatus, ClientError, ControlPlaneClient, MockControlPlane,
    RegisterTaskDefinitionResponse, RunTaskResponse, UpdateServiceResponse,
};
pub use config::DeployConfig;
pub use error::{DeployError, DeployResult};
pub use orchestrator::DeployOrchestrator;
pub use policy::FailurePolicy;
pub use service::{ClusterSpec, ServiceSpec, ServiceUpdatePayload};
pub use task::{
    ContainerDefinition, EnvVar, ImageRef, LogConfiguration, MountPoint, PortMapping,
    SecretReference, TaskDefinitionId, TaskDefinitionPayload, TaskDefinitionSpec,
};
