//! External resource-cleanup collaborator (namespace, pod and volume teardown).

use std::time::Duration;

use async_trait::async_trait;
use runwarden_model::GcTask;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("cleanup failed: {0}")]
    Failed(String),
    #[error("cleanup timed out after {0:?}")]
    Timeout(Duration),
    #[error("cleanup could not start: {0}")]
    Spawn(String),
}

/// Tears down the external resources of one terminated run.
///
/// Implementations enforce their own timeout; every error is treated as a
/// transient failure and counted against the task's attempt budget.
#[async_trait]
pub trait ResourceCleaner: Send + Sync + 'static {
    async fn cleanup(&self, task: &GcTask) -> Result<(), CleanupError>;

    fn name(&self) -> &'static str {
        "cleaner"
    }
}
