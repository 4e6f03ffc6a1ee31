use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::{GcState, RunId, RunState, TransitionError, WorkflowId};

/// One concrete execution of a Workflow, as tracked by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRun {
    /// Unique run identifier.
    pub id: RunId,
    /// Workflow this run belongs to.
    pub workflow_id: WorkflowId,
    /// Current lifecycle state.
    pub state: RunState,
    /// When the run record was created; retention evicts by this.
    #[serde(with = "time_serde")]
    pub created_at: SystemTime,
    /// When the run last changed state.
    #[serde(with = "time_serde")]
    pub updated_at: SystemTime,
    /// When the run reached a terminal state.
    #[serde(default, with = "opt_time_serde", skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<SystemTime>,
    /// Recorded progress of resource reclamation, `None` until GC is scheduled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gc: Option<GcState>,
    /// GC delay in effect when the run terminated; recovery schedules by it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gc_delay_seconds: Option<u64>,
    /// Marked for deletion by retention; kept until its GC finishes.
    #[serde(default)]
    pub evicted: bool,
}

impl WorkflowRun {
    /// Create a `Pending` run.
    pub fn new(id: impl Into<RunId>, workflow_id: impl Into<WorkflowId>, created_at: SystemTime) -> Self {
        Self {
            id: id.into(),
            workflow_id: workflow_id.into(),
            state: RunState::Pending,
            created_at,
            updated_at: created_at,
            finished_at: None,
            gc: None,
            gc_delay_seconds: None,
            evicted: false,
        }
    }

    /// Move the run to `to`, refusing illegal steps and any exit from a terminal state.
    pub fn transition(&mut self, to: RunState, now: SystemTime) -> Result<(), TransitionError> {
        if !self.state.can_transition(to) {
            return Err(TransitionError {
                from: self.state,
                to,
            });
        }
        self.state = to;
        self.updated_at = now;
        if to.is_terminal() {
            self.finished_at = Some(now);
        }
        Ok(())
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Returns `true` if nothing is left for GC to do: reclaimed, abandoned or never collected.
    pub fn gc_settled(&self) -> bool {
        matches!(
            self.gc,
            Some(GcState::Done | GcState::PermanentlyFailed | GcState::Disabled)
        )
    }
}

mod time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let since_epoch = time
            .duration_since(UNIX_EPOCH)
            .map_err(serde::ser::Error::custom)?;
        since_epoch.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + std::time::Duration::from_secs(secs))
    }
}

mod opt_time_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::{SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &Option<SystemTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => super::time_serde::serialize(t, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<SystemTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(|s| UNIX_EPOCH + std::time::Duration::from_secs(s)))
    }
}
