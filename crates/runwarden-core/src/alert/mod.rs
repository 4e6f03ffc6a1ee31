//! Operator-visible alerts for cleanup that needs manual intervention.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use runwarden_model::{GcTask, Namespace, RunId, WorkflowId};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
#[error("alert delivery failed: {0}")]
pub struct AlertError(pub String);

/// A GC task that exhausted its attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub run_id: RunId,
    pub workflow_id: WorkflowId,
    pub namespace: Namespace,
    pub attempts: u32,
    pub reason: String,
    /// Unix seconds.
    pub raised_at: u64,
}

impl Alert {
    pub fn gc_exhausted(task: &GcTask, now: SystemTime) -> Self {
        Self {
            run_id: task.run_id.clone(),
            workflow_id: task.workflow_id.clone(),
            namespace: task.namespace.clone(),
            attempts: task.attempts,
            reason: task
                .last_error
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            raised_at: now
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }
}

#[async_trait]
pub trait AlertSink: Send + Sync + 'static {
    async fn alert(&self, alert: &Alert) -> Result<(), AlertError>;
}

/// Sink that only writes the alert to the error log.
#[derive(Debug, Default)]
pub struct LogAlertSink;

#[async_trait]
impl AlertSink for LogAlertSink {
    async fn alert(&self, alert: &Alert) -> Result<(), AlertError> {
        error!(
            run = %alert.run_id,
            workflow = %alert.workflow_id,
            namespace = %alert.namespace,
            attempts = alert.attempts,
            reason = %alert.reason,
            "gc permanently failed; resources left unreclaimed"
        );
        Ok(())
    }
}
