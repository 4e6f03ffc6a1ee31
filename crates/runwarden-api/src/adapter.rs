use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use runwarden_config::ConfigSnapshot;
use runwarden_core::{AdmissionStats, Controller};
use runwarden_model::{GcTask, RunId, RunPage, RunQuery, RunState, WorkflowRun};
use uuid::Uuid;

use crate::error::ApiError;
use crate::handler::ApiHandler;
use crate::types::{CancelRunResponse, CompleteRunResponse, SubmitRunRequest, SubmitRunResponse};

/// Adapter that bridges `Controller` to `ApiHandler`.
///
/// Every call is stamped with the wall clock.
pub struct ControllerAdapter {
    controller: Arc<Controller>,
}

impl ControllerAdapter {
    pub fn new(controller: Arc<Controller>) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &Arc<Controller> {
        &self.controller
    }
}

#[async_trait]
impl ApiHandler for ControllerAdapter {
    async fn submit_run(&self, req: SubmitRunRequest) -> Result<SubmitRunResponse, ApiError> {
        let workflow = req.workflow_id.trim();
        if workflow.is_empty() {
            return Err(ApiError::InvalidRequest("workflow_id cannot be empty".into()));
        }
        let id = match req.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };

        let now = SystemTime::now();
        let run = WorkflowRun::new(id, workflow, now);
        let submission = self.controller.submit(run, now)?;
        Ok(submission.into())
    }

    async fn get_run(&self, id: &RunId) -> Result<Option<WorkflowRun>, ApiError> {
        Ok(self.controller.get(id)?)
    }

    async fn query_runs(&self, query: RunQuery) -> Result<RunPage<WorkflowRun>, ApiError> {
        Ok(self.controller.query(&query)?)
    }

    async fn complete_run(&self, id: &RunId, state: RunState) -> Result<CompleteRunResponse, ApiError> {
        let completion = self.controller.complete(id, state, SystemTime::now())?;
        Ok(completion.into())
    }

    async fn cancel_run(&self, id: &RunId) -> Result<CancelRunResponse, ApiError> {
        let outcome = self.controller.cancel_queued(id, SystemTime::now())?;
        Ok(outcome.into())
    }

    async fn gc_due(&self) -> Result<Vec<GcTask>, ApiError> {
        Ok(self.controller.gc_due(SystemTime::now()))
    }

    async fn gc_failed(&self) -> Result<Vec<GcTask>, ApiError> {
        Ok(self.controller.gc_failed())
    }

    async fn gc_retry(&self, id: &RunId) -> Result<GcTask, ApiError> {
        Ok(self.controller.gc_retry(id, SystemTime::now())?)
    }

    async fn admission_stats(&self) -> Result<AdmissionStats, ApiError> {
        Ok(self.controller.admission_stats())
    }

    async fn config(&self) -> Result<Arc<ConfigSnapshot>, ApiError> {
        Ok(Arc::clone(self.controller.config()))
    }
}
