use serde::{Deserialize, Serialize};

use crate::{DelayMs, RunId, WorkflowId};

/// Kind of decision or lifecycle step reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    // admission
    RunAdmitted,
    RunQueued,
    RunRejected,
    RunPromoted,
    RunCompleted,
    QueuedRunCancelled,

    // retention
    RetentionEvicted,
    RetentionDeferred,

    // gc
    GcScheduled,
    GcAttemptFailed,
    GcRetryScheduled,
    GcDone,
    GcPermanentlyFailed,
    GcRecovered,

    // config
    ConfigWarning,
    WorkersDefaulted,
}

/// A single controller event.
///
/// Optional fields are filled when relevant to the kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<RunId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<WorkflowId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<DelayMs>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            run: None,
            workflow: None,
            reason: None,
            attempt: None,
            delay_ms: None,
        }
    }

    /// Shorthand for events about one run of one workflow.
    pub fn for_run(kind: EventKind, run: &RunId, workflow: &WorkflowId) -> Self {
        Self::new(kind).with_run(run.clone()).with_workflow(workflow.clone())
    }

    pub fn with_run(mut self, run: RunId) -> Self {
        self.run = Some(run);
        self
    }

    pub fn with_workflow(mut self, workflow: WorkflowId) -> Self {
        self.workflow = Some(workflow);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: DelayMs) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }
}
