use runwarden_core::{AdmissionResult, CancelOutcome, Completion, Submission};
use runwarden_model::{GcTask, RunId, WorkflowRun};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRunRequest {
    /// Generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    pub workflow_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRunResponse {
    /// `admitted`, `queued` or `rejected`.
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub run: WorkflowRun,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evicted: Vec<RunId>,
}

impl From<Submission> for SubmitRunResponse {
    fn from(s: Submission) -> Self {
        let (result, reason) = match s.result {
            AdmissionResult::Admitted => ("admitted", None),
            AdmissionResult::Queued => ("queued", None),
            AdmissionResult::Rejected(reason) => ("rejected", Some(reason.as_str().to_string())),
        };
        Self {
            result: result.to_string(),
            reason,
            run: s.run,
            evicted: s.evicted,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteRunRequest {
    /// `completed`, `failed` or `cancelled`.
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteRunResponse {
    pub run: WorkflowRun,
    #[serde(default)]
    pub promoted: Vec<WorkflowRun>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gc: Option<GcTask>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evicted: Vec<RunId>,
}

impl From<Completion> for CompleteRunResponse {
    fn from(c: Completion) -> Self {
        Self {
            run: c.run,
            promoted: c.promoted,
            gc: c.gc,
            evicted: c.evicted,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRunResponse {
    /// `false` when the run was not queued (unknown or already started).
    pub cancelled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<WorkflowRun>,
}

impl From<CancelOutcome> for CancelRunResponse {
    fn from(o: CancelOutcome) -> Self {
        match o {
            CancelOutcome::Cancelled(run) => Self {
                cancelled: true,
                run: Some(run),
            },
            CancelOutcome::NotFoundOrAlreadyStarted => Self {
                cancelled: false,
                run: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRunsResponse {
    pub runs: Vec<WorkflowRun>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcTasksResponse {
    pub tasks: Vec<GcTask>,
}
