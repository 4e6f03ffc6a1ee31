use std::fmt;

use runwarden_model::ParallelismConfig;
use serde::Serialize;

use crate::schema::{
    ControllerConfig, ExecutionContext, GcConfig, LimitsConfig, WorkerDomain, WorkersNumber,
};

/// Features that depend on optional parts of the execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// Artifacts can be passed between stages.
    pub artifacts: bool,
    /// Input resources are fetched once and shared among stages.
    pub shared_resources: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            artifacts: true,
            shared_resources: true,
        }
    }
}

/// Soft validation finding: logged and recorded, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ConfigWarning {
    SharedVolumeMissing,
    InvalidLogLevel(String),
    LoggerFallback(String),
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::SharedVolumeMissing => f.write_str(
                "PVC not configured, resources won't be shared among stages and artifacts unsupported",
            ),
            ConfigWarning::InvalidLogLevel(level) => {
                write!(f, "log level '{level}' is invalid, using 'info'")
            }
            ConfigWarning::LoggerFallback(reason) => {
                write!(f, "requested log format unavailable ({reason}), using text")
            }
        }
    }
}

/// Outcome of validating and defaulting a decoded document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub warnings: Vec<ConfigWarning>,
    pub capabilities: Capabilities,
    /// Worker pools whose size was left unset and defaulted.
    pub defaulted_workers: Vec<WorkerDomain>,
}

/// Immutable, validated policy.
///
/// Shared as `Arc<ConfigSnapshot>`; there is no way to mutate one after load.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSnapshot {
    config: ControllerConfig,
    validation: Validation,
}

impl ConfigSnapshot {
    pub(crate) fn new(config: ControllerConfig, validation: Validation) -> Self {
        Self { config, validation }
    }

    /// Snapshot built from an in-memory config, bypassing the document.
    ///
    /// Runs the same validation and defaulting as [`crate::ConfigStore::load`], without logging.
    pub fn from_config(config: ControllerConfig) -> Result<Self, crate::ConfigError> {
        crate::store::finalize(config)
    }

    #[inline]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    #[inline]
    pub fn gc(&self) -> &GcConfig {
        &self.config.gc
    }

    #[inline]
    pub fn limits(&self) -> LimitsConfig {
        self.config.limits
    }

    /// Admission limits, unbounded when the document has no `parallelism` section.
    pub fn parallelism(&self) -> ParallelismConfig {
        self.config
            .parallelism
            .unwrap_or_else(ParallelismConfig::unbounded)
    }

    #[inline]
    pub fn execution_context(&self) -> &ExecutionContext {
        &self.config.execution_context
    }

    #[inline]
    pub fn workers(&self) -> WorkersNumber {
        self.config.workers_number
    }

    #[inline]
    pub fn workers_for(&self, domain: WorkerDomain) -> u32 {
        self.config.workers_number.get(domain)
    }

    pub fn image(&self, key: &str) -> Option<&str> {
        self.config.images.get(key).map(String::as_str)
    }

    pub fn notification_url(&self) -> Option<&str> {
        let url = self.config.notification_url.trim();
        (!url.is_empty()).then_some(url)
    }

    #[inline]
    pub fn validation(&self) -> &Validation {
        &self.validation
    }

    #[inline]
    pub fn capabilities(&self) -> Capabilities {
        self.validation.capabilities
    }

    #[inline]
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.validation.warnings
    }
}
