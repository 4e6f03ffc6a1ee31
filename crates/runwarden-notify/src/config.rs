use std::sync::OnceLock;
use std::time::Duration;

use runwarden_config::ConfigSnapshot;

static SOURCE_ID: OnceLock<String> = OnceLock::new();

/// Name of this controller instance as reported in alerts.
///
/// The host name (the pod name under Kubernetes), or `runwarden` when it
/// cannot be read.
pub fn source_id() -> &'static str {
    SOURCE_ID.get_or_init(|| {
        if let Ok(hostname) = hostname::get()
            && let Some(name) = hostname.to_str()
            && !name.is_empty()
        {
            return name.to_string();
        }
        "runwarden".to_string()
    })
}

#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub endpoint: String,
    pub source: String,
    pub timeout: Duration,
}

impl NotifyConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            source: source_id().to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// `None` when the snapshot has no `notification_url`.
    pub fn from_snapshot(config: &ConfigSnapshot) -> Option<Self> {
        config.notification_url().map(Self::new)
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
