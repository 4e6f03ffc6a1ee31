use std::collections::BTreeMap;

use runwarden_model::ParallelismConfig;
use runwarden_observe::LoggerFormat;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_GC_BACKOFF_BASE_SECONDS, DEFAULT_GC_BACKOFF_MAX_SECONDS};

/// Decoded policy document.
///
/// Unknown keys are ignored and missing sections take their defaults; only a
/// type mismatch makes the document malformed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Images used by the controller (coordinator, gc, dind, toolbox).
    #[serde(default)]
    pub images: BTreeMap<String, String>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub gc: GcConfig,
    /// How many run records are kept per workflow.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Admission limits; `None` admits everything.
    #[serde(default)]
    pub parallelism: Option<ParallelismConfig>,
    /// Default resource requirements for stage containers.
    #[serde(default, rename = "default_resource_quota")]
    pub resource_requirements: ResourceRequirements,
    #[serde(default)]
    pub execution_context: ExecutionContext,
    #[serde(default, rename = "cyclone_server_addr")]
    pub server_addr: String,
    /// Where to send notifications after runs finish (and GC alerts).
    #[serde(default)]
    pub notification_url: String,
    #[serde(default, rename = "dind")]
    pub dind_settings: DindSettings,
    #[serde(default)]
    pub workers_number: WorkersNumber,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LoggerFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LoggerFormat::default(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcConfig {
    /// When `false`, terminated runs are never cleaned up by the controller.
    #[serde(default)]
    pub enabled: bool,
    /// Seconds between a run terminating and its first cleanup attempt; 0 means immediately.
    #[serde(default)]
    pub delay_seconds: u64,
    /// Retries after a failed first attempt; 0 means a single attempt.
    #[serde(default, rename = "retry")]
    pub retry_count: u32,
    /// Resource requirements for the cleanup pod.
    #[serde(default, rename = "resource_quota")]
    pub resource_requirements: ResourceRequirements,
    #[serde(default = "default_backoff_base")]
    pub backoff_base_seconds: u64,
    #[serde(default = "default_backoff_max")]
    pub backoff_max_seconds: u64,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            delay_seconds: 0,
            retry_count: 0,
            resource_requirements: ResourceRequirements::default(),
            backoff_base_seconds: default_backoff_base(),
            backoff_max_seconds: default_backoff_max(),
        }
    }
}

impl GcConfig {
    /// Attempt budget of one GC task: the first try plus `retry_count` retries.
    #[inline]
    pub fn max_attempts(&self) -> u32 {
        self.retry_count.saturating_add(1)
    }
}

fn default_backoff_base() -> u64 {
    DEFAULT_GC_BACKOFF_BASE_SECONDS
}

fn default_backoff_max() -> u64 {
    DEFAULT_GC_BACKOFF_MAX_SECONDS
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum run records kept per workflow; 0 keeps everything.
    #[serde(default, rename = "max_workflowruns")]
    pub max_workflow_runs: u64,
}

/// Opaque compute quota, passed through to pod-spec builders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirements {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub limits: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requests: BTreeMap<String, String>,
}

/// Where runs execute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    #[serde(default)]
    pub namespace: String,
    /// Shared volume used to pass artifacts and share inputs between stages.
    ///
    /// Without it, inputs are pulled again by every stage and artifacts are unsupported.
    #[serde(default)]
    pub pvc: String,
    #[serde(default)]
    pub service_account: String,
}

impl ExecutionContext {
    /// The shared-volume identifier, if one is configured.
    pub fn pvc(&self) -> Option<&str> {
        let pvc = self.pvc.trim();
        (!pvc.is_empty()).then_some(pvc)
    }
}

/// Docker-in-docker daemon settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DindSettings {
    /// Registries whose certificates are not verified.
    #[serde(default)]
    pub insecure_registries: Vec<String>,
    /// Subnet of the docker0 bridge.
    #[serde(default)]
    pub bip: String,
}

/// External reconcile domains, each with its own worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerDomain {
    ExecutionCluster,
    WorkflowTrigger,
    WorkflowRun,
    Pod,
}

impl WorkerDomain {
    pub const ALL: [WorkerDomain; 4] = [
        WorkerDomain::ExecutionCluster,
        WorkerDomain::WorkflowTrigger,
        WorkerDomain::WorkflowRun,
        WorkerDomain::Pod,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerDomain::ExecutionCluster => "execution_cluster",
            WorkerDomain::WorkflowTrigger => "workflow_trigger",
            WorkerDomain::WorkflowRun => "workflow_run",
            WorkerDomain::Pod => "pod",
        }
    }
}

/// Worker pool sizes; zero means "not configured".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkersNumber {
    #[serde(default)]
    pub execution_cluster: u32,
    #[serde(default)]
    pub workflow_trigger: u32,
    #[serde(default)]
    pub workflow_run: u32,
    #[serde(default)]
    pub pod: u32,
}

impl WorkersNumber {
    pub fn get(&self, domain: WorkerDomain) -> u32 {
        match domain {
            WorkerDomain::ExecutionCluster => self.execution_cluster,
            WorkerDomain::WorkflowTrigger => self.workflow_trigger,
            WorkerDomain::WorkflowRun => self.workflow_run,
            WorkerDomain::Pod => self.pod,
        }
    }

    pub(crate) fn get_mut(&mut self, domain: WorkerDomain) -> &mut u32 {
        match domain {
            WorkerDomain::ExecutionCluster => &mut self.execution_cluster,
            WorkerDomain::WorkflowTrigger => &mut self.workflow_trigger,
            WorkerDomain::WorkflowRun => &mut self.workflow_run,
            WorkerDomain::Pod => &mut self.pod,
        }
    }
}
