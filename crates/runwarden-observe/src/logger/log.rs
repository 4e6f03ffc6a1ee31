use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, fmt, fmt::time::OffsetTime, layer::SubscriberExt, util::SubscriberInitExt};

use crate::logger::{config::LoggerConfig, error::LoggerError, format::LoggerFormat};

/// Build the subscriber described by `cfg` and set it as the global default.
pub(crate) fn install(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = level_filter(&cfg.level)?;
    let registry = tracing_subscriber::registry().with(filter);

    match cfg.format {
        LoggerFormat::Text => set_global(
            registry.with(
                fmt::layer()
                    .with_ansi(cfg.use_color)
                    .with_target(cfg.with_targets)
                    .with_timer(local_rfc3339()),
            ),
        ),
        LoggerFormat::Json => set_global(
            registry.with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_target(cfg.with_targets)
                    .with_timer(local_rfc3339()),
            ),
        ),
        LoggerFormat::Journald => journald(registry),
    }
}

/// Returns `true` if `level` is an acceptable filter directive.
pub fn valid_level(level: &str) -> bool {
    level_filter(level).is_ok()
}

fn level_filter(level: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_new(level).map_err(|_| LoggerError::InvalidLogLevel(level.to_string()))
}

/// Local offset when the platform can tell it, UTC otherwise.
fn local_rfc3339() -> OffsetTime<Rfc3339> {
    OffsetTime::new(UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC), Rfc3339)
}

fn set_global<S>(subscriber: S) -> Result<(), LoggerError>
where
    S: Subscriber + Send + Sync + 'static,
{
    if tracing::dispatcher::has_been_set() {
        return Err(LoggerError::AlreadyInitialized);
    }
    subscriber
        .try_init()
        .map_err(|e| LoggerError::InitializationFailed(e.to_string()))
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald<S>(registry: S) -> Result<(), LoggerError>
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync + 'static,
{
    let layer = tracing_journald::layer().map_err(|e| LoggerError::InitializationFailed(format!("journald: {e}")))?;
    set_global(registry.with(layer))
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald<S>(_registry: S) -> Result<(), LoggerError> {
    Err(LoggerError::JournaldNotSupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_directive_levels() {
        assert!(valid_level("info"));
        assert!(valid_level("warn,runwarden_core=debug"));
    }

    #[test]
    fn rejects_garbage_level() {
        assert!(!valid_level("runwarden=loudest"));
    }

    #[test]
    fn bad_level_fails_before_install() {
        let cfg = LoggerConfig::with_level("runwarden=loudest");
        assert!(matches!(install(&cfg), Err(LoggerError::InvalidLogLevel(_))));
    }
}
