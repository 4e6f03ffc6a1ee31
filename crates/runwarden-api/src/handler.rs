use std::sync::Arc;

use async_trait::async_trait;
use runwarden_config::ConfigSnapshot;
use runwarden_core::AdmissionStats;
use runwarden_model::{GcTask, RunId, RunPage, RunQuery, RunState, WorkflowRun};

use crate::error::ApiError;
use crate::types::{CancelRunResponse, CompleteRunResponse, SubmitRunRequest, SubmitRunResponse};

/// Controller API handler.
///
/// This trait abstracts the backend implementation, allowing users to:
/// - Use the provided `ControllerAdapter`
/// - Implement custom handlers with additional logic (auth, rate limiting, etc.)
#[async_trait]
pub trait ApiHandler: Send + Sync + 'static {
    /// Record a run and request its admission.
    async fn submit_run(&self, req: SubmitRunRequest) -> Result<SubmitRunResponse, ApiError>;

    async fn get_run(&self, id: &RunId) -> Result<Option<WorkflowRun>, ApiError>;

    async fn query_runs(&self, query: RunQuery) -> Result<RunPage<WorkflowRun>, ApiError>;

    /// Move a run to a terminal state.
    async fn complete_run(&self, id: &RunId, state: RunState) -> Result<CompleteRunResponse, ApiError>;

    /// Withdraw a queued run.
    async fn cancel_run(&self, id: &RunId) -> Result<CancelRunResponse, ApiError>;

    async fn gc_due(&self) -> Result<Vec<GcTask>, ApiError>;

    async fn gc_failed(&self) -> Result<Vec<GcTask>, ApiError>;

    /// Re-enable a permanently failed GC task.
    async fn gc_retry(&self, id: &RunId) -> Result<GcTask, ApiError>;

    async fn admission_stats(&self) -> Result<AdmissionStats, ApiError>;

    async fn config(&self) -> Result<Arc<ConfigSnapshot>, ApiError>;
}
