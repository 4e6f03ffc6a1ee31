use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::{Namespace, RunId, WorkflowId};

/// Reclamation progress of a terminated run's external resources.
///
/// `Scheduled -> Attempting -> Done`, or back to `Scheduled` after a failed
/// attempt, or `PermanentlyFailed` once the attempt budget is spent.
/// `Disabled` records that GC was off when the run terminated; no task exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GcState {
    Scheduled,
    Attempting,
    Done,
    PermanentlyFailed,
    Disabled,
}

/// Delayed, retry-bounded cleanup of one terminated run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcTask {
    pub run_id: RunId,
    pub workflow_id: WorkflowId,
    /// Namespace holding the run's pods and volumes.
    pub namespace: Namespace,
    /// Earliest time the next attempt may start.
    #[serde(with = "system_time_ms")]
    pub scheduled_at: SystemTime,
    /// Attempts made so far, including a successful one.
    pub attempts: u32,
    /// Attempt budget: the first try plus the configured retries.
    pub max_attempts: u32,
    pub state: GcState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Retention evicted the run; delete its record once cleanup settles.
    #[serde(default)]
    pub evict_on_completion: bool,
}

impl GcTask {
    pub fn new(
        run_id: RunId,
        workflow_id: WorkflowId,
        namespace: impl Into<Namespace>,
        scheduled_at: SystemTime,
        max_attempts: u32,
    ) -> Self {
        Self {
            run_id,
            workflow_id,
            namespace: namespace.into(),
            scheduled_at,
            attempts: 0,
            max_attempts: max_attempts.max(1),
            state: GcState::Scheduled,
            last_error: None,
            evict_on_completion: false,
        }
    }

    /// Returns `true` if the task is waiting and its delay has elapsed.
    #[inline]
    pub fn is_due(&self, now: SystemTime) -> bool {
        self.state == GcState::Scheduled && self.scheduled_at <= now
    }

    #[inline]
    pub fn attempts_left(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }
}

mod system_time_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let ms = time
            .duration_since(UNIX_EPOCH)
            .map_err(serde::ser::Error::custom)?
            .as_millis() as u64;
        ms.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::from_millis(ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn task(at_secs: u64) -> GcTask {
        GcTask::new(
            RunId::from("run-1"),
            WorkflowId::from("wf"),
            "ci",
            UNIX_EPOCH + Duration::from_secs(at_secs),
            3,
        )
    }

    #[test]
    fn due_only_when_scheduled_and_elapsed() {
        let mut t = task(100);
        assert!(!t.is_due(UNIX_EPOCH + Duration::from_secs(99)));
        assert!(t.is_due(UNIX_EPOCH + Duration::from_secs(100)));

        t.state = GcState::Attempting;
        assert!(!t.is_due(UNIX_EPOCH + Duration::from_secs(200)));
    }

    #[test]
    fn max_attempts_is_at_least_one() {
        let t = GcTask::new(RunId::from("r"), WorkflowId::from("w"), "ns", UNIX_EPOCH, 0);
        assert_eq!(t.max_attempts, 1);
        assert_eq!(t.attempts_left(), 1);
    }

    #[test]
    fn serializes_schedule_in_millis() {
        let t = task(2);
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains(r#""scheduledAt":2000"#));
        assert!(!json.contains("lastError"));
    }
}
