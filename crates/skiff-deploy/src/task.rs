//! Task definition specs and their rendering into control plane payloads.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config;
use crate::error::{DeployError, DeployResult};

/// Image coordinates supplied at deploy time.
///
/// The repository and tag are deliberately not part of
/// [`TaskDefinitionSpec`]: they change on every deployment while the rest of
/// the spec is static configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    repository: String,
    tag: String,
}

impl ImageRef {
    /// Create an image reference, rejecting empty coordinates.
    pub fn new(repository: impl Into<String>, tag: impl Into<String>) -> DeployResult<Self> {
        let repository = repository.into();
        let tag = tag.into();

        if repository.is_empty() {
            return Err(DeployError::configuration(
                "image repository must not be empty",
            ));
        }
        if tag.is_empty() {
            return Err(DeployError::configuration("image tag must not be empty"));
        }

        Ok(Self { repository, tag })
    }

    /// Repository part of the reference.
    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Tag part of the reference.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Full image URI in `repository:tag` form.
    #[must_use]
    pub fn uri(&self) -> String {
        format!("{}:{}", self.repository, self.tag)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

/// Identifier assigned by the control plane when a task definition revision
/// is registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskDefinitionId(String);

impl TaskDefinitionId {
    /// Create an identifier from its string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskDefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TaskDefinitionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An environment variable entry in a container definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    /// Variable name.
    pub name: String,
    /// Variable value.
    pub value: String,
}

impl EnvVar {
    /// Create an environment variable entry.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A secret injected into the container as an environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretReference {
    /// Environment variable name inside the container.
    pub name: String,
    /// Identifier of the secret in the secret store.
    pub value_from: String,
}

impl SecretReference {
    /// Create a secret reference.
    #[must_use]
    pub fn new(name: impl Into<String>, value_from: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_from: value_from.into(),
        }
    }
}

/// A container port mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    /// Port exposed by the container.
    pub container_port: u16,
    /// Host port, when statically mapped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_port: Option<u16>,
    /// Protocol ("tcp" or "udp"), when not the control plane default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

impl PortMapping {
    /// Map a container port with no host binding.
    #[must_use]
    pub fn new(container_port: u16) -> Self {
        Self {
            container_port,
            host_port: None,
            protocol: None,
        }
    }
}

/// A mount point tying a container path to a declared volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MountPoint {
    /// Path inside the container.
    pub container_path: String,
    /// Name of the volume declared in the task definition.
    pub source_volume: String,
}

/// Runtime platform selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimePlatform {
    /// Operating system family.
    pub operating_system_family: String,
}

/// Log routing rendered into the container definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogConfiguration {
    /// Log driver name.
    pub log_driver: String,
    /// Driver-specific option map.
    pub options: BTreeMap<String, String>,
}

/// A single container within a rendered task definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDefinition {
    /// Container name.
    pub name: String,
    /// Full image URI.
    pub image: String,
    /// Whether the task fails when this container stops.
    pub essential: bool,
    /// CPU units reserved for the container.
    pub cpu: u32,
    /// Soft memory limit in MiB.
    pub memory_reservation: u32,
    /// Port mappings.
    pub port_mappings: Vec<PortMapping>,
    /// Command line passed to the container.
    pub command: Vec<String>,
    /// Environment variables, static entries first.
    pub environment: Vec<EnvVar>,
    /// Secret-backed environment variables.
    pub secrets: Vec<SecretReference>,
    /// Mount points referencing the task's volumes.
    pub mount_points: Vec<MountPoint>,
    /// Log routing configuration.
    pub log_configuration: LogConfiguration,
}

/// Fully rendered register-task-definition request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinitionPayload {
    /// Task definition family.
    pub family: String,
    /// Volume definitions, passed through as declared.
    pub volumes: Vec<Value>,
    /// IAM role the task assumes.
    pub task_role_arn: String,
    /// IAM role used by the agent for image pulls and log creation.
    pub execution_role_arn: String,
    /// Container networking mode.
    pub network_mode: String,
    /// Runtime platform selector.
    pub runtime_platform: RuntimePlatform,
    /// Container definitions. Always exactly one.
    pub container_definitions: Vec<ContainerDefinition>,
}

/// Immutable description of a single container task.
///
/// Built once per deploy invocation from static configuration with
/// [`TaskDefinitionSpec::new`] and the `with_*` builders, then rendered into
/// a [`TaskDefinitionPayload`] with the image coordinates for that
/// deployment. Rendering never mutates the spec; a per-invocation command
/// override goes through [`TaskDefinitionSpec::render_with_command`].
#[derive(Debug, Clone)]
pub struct TaskDefinitionSpec {
    family: String,
    container_name: String,
    cpu: u32,
    memory_reservation: u32,
    task_role_arn: String,
    execution_role_arn: String,
    network_mode: String,
    command: Vec<String>,
    port_mappings: Vec<PortMapping>,
    volumes: BTreeMap<String, Value>,
    secrets: Vec<SecretReference>,
    environment: Vec<EnvVar>,
    log_region: Option<String>,
    log_group: String,
    log_stream_prefix: Option<String>,
}

impl TaskDefinitionSpec {
    /// Create a spec for the given family with default settings.
    #[must_use]
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            container_name: "app".to_owned(),
            cpu: 256,
            memory_reservation: 512,
            task_role_arn: String::new(),
            execution_role_arn: String::new(),
            network_mode: "bridge".to_owned(),
            command: Vec::new(),
            port_mappings: Vec::new(),
            volumes: BTreeMap::new(),
            secrets: Vec::new(),
            environment: Vec::new(),
            log_region: None,
            log_group: "default".to_owned(),
            log_stream_prefix: None,
        }
    }

    /// Set the container name.
    #[must_use]
    pub fn with_container_name(mut self, name: impl Into<String>) -> Self {
        self.container_name = name.into();
        self
    }

    /// Set the CPU units reserved for the container.
    #[must_use]
    pub fn with_cpu(mut self, cpu: u32) -> Self {
        self.cpu = cpu;
        self
    }

    /// Set the soft memory limit in MiB.
    #[must_use]
    pub fn with_memory_reservation(mut self, mib: u32) -> Self {
        self.memory_reservation = mib;
        self
    }

    /// Set the IAM role the task assumes.
    #[must_use]
    pub fn with_task_role_arn(mut self, arn: impl Into<String>) -> Self {
        self.task_role_arn = arn.into();
        self
    }

    /// Set the IAM role used for image pulls and log creation.
    #[must_use]
    pub fn with_execution_role_arn(mut self, arn: impl Into<String>) -> Self {
        self.execution_role_arn = arn.into();
        self
    }

    /// Set the container networking mode.
    #[must_use]
    pub fn with_network_mode(mut self, mode: impl Into<String>) -> Self {
        self.network_mode = mode.into();
        self
    }

    /// Set the command line passed to the container.
    #[must_use]
    pub fn with_command(mut self, command: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.command = command.into_iter().map(Into::into).collect();
        self
    }

    /// Add a port mapping.
    #[must_use]
    pub fn with_port_mapping(mut self, mapping: PortMapping) -> Self {
        self.port_mappings.push(mapping);
        self
    }

    /// Declare a volume mounted at `container_path`.
    ///
    /// The definition is passed through to the control plane as-is; it must
    /// carry a string `name` key or rendering fails with a configuration
    /// error.
    #[must_use]
    pub fn with_volume(mut self, container_path: impl Into<String>, definition: Value) -> Self {
        self.volumes.insert(container_path.into(), definition);
        self
    }

    /// Add a secret-backed environment variable.
    #[must_use]
    pub fn with_secret(mut self, secret: SecretReference) -> Self {
        self.secrets.push(secret);
        self
    }

    /// Add a static environment variable.
    #[must_use]
    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.push(EnvVar::new(name, value));
        self
    }

    /// Set the log region. Falls back to the ambient default region when
    /// unset or empty.
    #[must_use]
    pub fn with_log_region(mut self, region: impl Into<String>) -> Self {
        self.log_region = Some(region.into());
        self
    }

    /// Set the log group.
    #[must_use]
    pub fn with_log_group(mut self, group: impl Into<String>) -> Self {
        self.log_group = group.into();
        self
    }

    /// Set the log stream prefix. Falls back to the family when unset or
    /// empty.
    #[must_use]
    pub fn with_log_stream_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_stream_prefix = Some(prefix.into());
        self
    }

    /// Task definition family.
    #[must_use]
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Command line configured on the spec.
    #[must_use]
    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// Render the full registration payload for the given image.
    ///
    /// Pure transformation: no I/O beyond reading the ambient default region
    /// when no log region is configured. The two dynamic environment entries
    /// (`IMAGE_REPOSITORY`, then `IMAGE_TAG`) are appended after every
    /// static entry.
    pub fn render(&self, image: &ImageRef) -> DeployResult<TaskDefinitionPayload> {
        self.render_with_command(image, None)
    }

    /// Render with an optional command override.
    ///
    /// A non-empty override replaces the spec's command list for this render
    /// only; `None` or an empty slice keeps the configured command.
    pub fn render_with_command(
        &self,
        image: &ImageRef,
        command_override: Option<&[String]>,
    ) -> DeployResult<TaskDefinitionPayload> {
        let (volumes, mount_points) = self.render_volumes()?;

        let mut environment = self.environment.clone();
        environment.push(EnvVar::new("IMAGE_REPOSITORY", image.repository()));
        environment.push(EnvVar::new("IMAGE_TAG", image.tag()));

        let command = command_override
            .filter(|c| !c.is_empty())
            .map_or_else(|| self.command.clone(), <[String]>::to_vec);

        Ok(TaskDefinitionPayload {
            family: self.family.clone(),
            volumes,
            task_role_arn: self.task_role_arn.clone(),
            execution_role_arn: self.execution_role_arn.clone(),
            network_mode: self.network_mode.clone(),
            runtime_platform: RuntimePlatform {
                operating_system_family: "LINUX".to_owned(),
            },
            container_definitions: vec![ContainerDefinition {
                name: self.container_name.clone(),
                image: image.uri(),
                essential: true,
                cpu: self.cpu,
                memory_reservation: self.memory_reservation,
                port_mappings: self.port_mappings.clone(),
                command,
                environment,
                secrets: self.secrets.clone(),
                mount_points,
                log_configuration: self.render_log_configuration(),
            }],
        })
    }

    /// Expand the path → definition map into matching volume and mount point
    /// lists. Ordering follows the sorted container paths, so output is
    /// deterministic.
    fn render_volumes(&self) -> DeployResult<(Vec<Value>, Vec<MountPoint>)> {
        let mut volumes = Vec::with_capacity(self.volumes.len());
        let mut mount_points = Vec::with_capacity(self.volumes.len());

        for (path, definition) in &self.volumes {
            let name = definition
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    DeployError::configuration(format!(
                        "volume mounted at {path} has no name in its definition"
                    ))
                })?;

            mount_points.push(MountPoint {
                container_path: path.clone(),
                source_volume: name.to_owned(),
            });
            volumes.push(definition.clone());
        }

        Ok((volumes, mount_points))
    }

    fn render_log_configuration(&self) -> LogConfiguration {
        let region = self
            .log_region
            .as_deref()
            .filter(|r| !r.is_empty())
            .map_or_else(config::default_region, ToOwned::to_owned);
        let stream_prefix = self
            .log_stream_prefix
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.family);

        let mut options = BTreeMap::new();
        options.insert("awslogs-region".to_owned(), region);
        options.insert("awslogs-group".to_owned(), self.log_group.clone());
        options.insert("awslogs-stream-prefix".to_owned(), stream_prefix.to_owned());

        LogConfiguration {
            log_driver: "awslogs".to_owned(),
            options,
        }
    }
}
