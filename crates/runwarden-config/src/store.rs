use std::sync::Arc;

use runwarden_observe::{LoggerConfig, LoggerError, LoggerFormat, logger_init, valid_level};
use tracing::{debug, info, warn};

use crate::{
    constants::{CONFIG_FILE_KEY, DEFAULT_WORKERS},
    document::ConfigDocument,
    error::ConfigError,
    schema::{ControllerConfig, WorkerDomain},
    snapshot::{Capabilities, ConfigSnapshot, ConfigWarning, Validation},
};

/// Loads the policy document into an immutable snapshot.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    init_logging: bool,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    /// Store that installs the process logger from the loaded `logging` section.
    pub fn new() -> Self {
        Self { init_logging: true }
    }

    /// Store that leaves the process logger alone.
    pub fn without_logging() -> Self {
        Self {
            init_logging: false,
        }
    }

    /// Decode, validate and default the policy found in `doc`.
    ///
    /// The caller publishes the returned snapshot to dependents.
    pub fn load(&self, doc: &ConfigDocument) -> Result<Arc<ConfigSnapshot>, ConfigError> {
        let data = doc.get(CONFIG_FILE_KEY).ok_or_else(|| ConfigError::MissingKey {
            document: doc.name.clone(),
            key: CONFIG_FILE_KEY.to_string(),
        })?;

        let config: ControllerConfig = serde_json::from_str(data).map_err(|e| {
            debug!(document = %doc.name, error = %e, "unmarshal config data error");
            ConfigError::Malformed(e)
        })?;

        let (config, mut validation) = prepare(config)?;
        if self.init_logging {
            init_logging(&config, &mut validation);
        }
        report(&validation);

        Ok(Arc::new(ConfigSnapshot::new(config, validation)))
    }
}

pub(crate) fn finalize(config: ControllerConfig) -> Result<ConfigSnapshot, ConfigError> {
    let (config, validation) = prepare(config)?;
    Ok(ConfigSnapshot::new(config, validation))
}

fn prepare(mut config: ControllerConfig) -> Result<(ControllerConfig, Validation), ConfigError> {
    let mut validation = Validation::default();
    validate(&config, &mut validation)?;
    default_values(&mut config, &mut validation);
    Ok((config, validation))
}

/// Hard errors abort the load; soft findings are pushed into `validation`.
fn validate(config: &ControllerConfig, validation: &mut Validation) -> Result<(), ConfigError> {
    if config.gc.backoff_max_seconds < config.gc.backoff_base_seconds {
        return Err(ConfigError::Invalid(format!(
            "gc.backoff_max_seconds ({}) is smaller than gc.backoff_base_seconds ({})",
            config.gc.backoff_max_seconds, config.gc.backoff_base_seconds
        )));
    }

    if config.execution_context.pvc().is_none() {
        validation.warnings.push(ConfigWarning::SharedVolumeMissing);
        validation.capabilities = Capabilities {
            artifacts: false,
            shared_resources: false,
        };
    }
    Ok(())
}

fn default_values(config: &mut ControllerConfig, validation: &mut Validation) {
    for domain in WorkerDomain::ALL {
        let size = config.workers_number.get_mut(domain);
        if *size == 0 {
            *size = DEFAULT_WORKERS;
            validation.defaulted_workers.push(domain);
        }
    }

    if !valid_level(&config.logging.level) {
        validation
            .warnings
            .push(ConfigWarning::InvalidLogLevel(config.logging.level.clone()));
        config.logging.level = "info".to_string();
    }
}

fn init_logging(config: &ControllerConfig, validation: &mut Validation) {
    let mut cfg = LoggerConfig::with_level(config.logging.level.clone());
    cfg.format = config.logging.format;

    match logger_init(&cfg) {
        Ok(()) => {}
        Err(LoggerError::AlreadyInitialized) => {
            debug!("logger already installed; keeping the existing subscriber");
        }
        Err(e) if cfg.format != LoggerFormat::Text => {
            validation
                .warnings
                .push(ConfigWarning::LoggerFallback(e.to_string()));
            cfg.format = LoggerFormat::Text;
            if let Err(e) = logger_init(&cfg) {
                debug!(error = %e, "text logger fallback not installed");
            }
        }
        Err(e) => debug!(error = %e, "logger not installed"),
    }
}

fn report(validation: &Validation) {
    for warning in &validation.warnings {
        warn!("{warning}");
    }
    for domain in &validation.defaulted_workers {
        info!(
            domain = domain.as_str(),
            "workers_number.{} not configured, will use default value '{DEFAULT_WORKERS}'",
            domain.as_str()
        );
    }
}
