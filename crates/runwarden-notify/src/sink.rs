use async_trait::async_trait;
use runwarden_core::{Alert, AlertError, AlertSink};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::NotifyConfig;
use crate::errors::NotifyError;

/// Body posted to the notification endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPayload<'a> {
    pub source: &'a str,
    pub kind: &'static str,
    #[serde(flatten)]
    pub alert: &'a Alert,
}

impl<'a> AlertPayload<'a> {
    pub const GC_PERMANENTLY_FAILED: &'static str = "gcPermanentlyFailed";

    pub fn gc_failed(source: &'a str, alert: &'a Alert) -> Self {
        Self {
            source,
            kind: Self::GC_PERMANENTLY_FAILED,
            alert,
        }
    }
}

pub struct HttpAlertSink {
    client: reqwest::Client,
    cfg: NotifyConfig,
}

impl HttpAlertSink {
    pub fn new(cfg: NotifyConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(cfg.timeout).build()?;
        Ok(Self { client, cfg })
    }

    pub fn endpoint(&self) -> &str {
        &self.cfg.endpoint
    }

    pub async fn post(&self, alert: &Alert) -> Result<(), NotifyError> {
        let payload = AlertPayload::gc_failed(&self.cfg.source, alert);
        debug!(endpoint = %self.cfg.endpoint, run = %alert.run_id, "posting alert");

        let response = self
            .client
            .post(&self.cfg.endpoint)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AlertSink for HttpAlertSink {
    async fn alert(&self, alert: &Alert) -> Result<(), AlertError> {
        self.post(alert).await.map_err(|e| {
            warn!(endpoint = %self.cfg.endpoint, error = %e, "alert not delivered");
            AlertError(e.to_string())
        })
    }
}
