use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of a WorkflowRun.
///
/// `Pending -> Queued -> Running -> {Completed | Failed | Cancelled}`.
/// A queued run may also go straight to `Cancelled`, and a rejected (still
/// pending) run may be failed or cancelled by its requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunState {
    /// Known to the controller, admission not decided yet.
    Pending,
    /// Waiting for a free slot.
    Queued,
    /// Holding a global and a per-workflow slot.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
    /// Stopped before finishing.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid run transition: {from:?} -> {to:?}")]
pub struct TransitionError {
    pub from: RunState,
    pub to: RunState,
}

impl RunState {
    /// Returns `true` if the run reached a final state (won't transition further).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::Failed | RunState::Cancelled
        )
    }

    /// Returns `true` if the run is still owned by admission control.
    pub fn is_active(&self) -> bool {
        matches!(self, RunState::Pending | RunState::Queued | RunState::Running)
    }

    /// Checks whether `self -> to` is a legal lifecycle step.
    pub fn can_transition(&self, to: RunState) -> bool {
        use RunState::*;
        match (self, to) {
            (from, _) if from.is_terminal() => false,
            (Pending, Queued | Running | Failed | Cancelled) => true,
            (Queued, Running | Cancelled) => true,
            (Running, Completed | Failed | Cancelled) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Pending => "pending",
            RunState::Queued => "queued",
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Failed => "failed",
            RunState::Cancelled => "cancelled",
        }
    }

    /// Parses the lowercase form produced by [`RunState::as_str`].
    pub fn parse(s: &str) -> Option<RunState> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(RunState::Pending),
            "queued" => Some(RunState::Queued),
            "running" => Some(RunState::Running),
            "completed" => Some(RunState::Completed),
            "failed" => Some(RunState::Failed),
            "cancelled" | "canceled" => Some(RunState::Cancelled),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(RunState::Completed.is_terminal());
        assert!(RunState::Failed.is_terminal());
        assert!(RunState::Cancelled.is_terminal());

        assert!(!RunState::Pending.is_terminal());
        assert!(!RunState::Queued.is_terminal());
        assert!(!RunState::Running.is_terminal());
    }

    #[test]
    fn terminal_states_are_immutable() {
        for terminal in [RunState::Completed, RunState::Failed, RunState::Cancelled] {
            assert!(!terminal.can_transition(RunState::Running));
            assert!(!terminal.can_transition(RunState::Completed));
        }
    }

    #[test]
    fn queued_run_can_be_cancelled_but_not_completed() {
        assert!(RunState::Queued.can_transition(RunState::Cancelled));
        assert!(!RunState::Queued.can_transition(RunState::Completed));
        assert!(RunState::Pending.can_transition(RunState::Running));
    }

    #[test]
    fn parse_accepts_both_spellings_of_cancelled() {
        assert_eq!(RunState::parse("Canceled"), Some(RunState::Cancelled));
        assert_eq!(RunState::parse("cancelled"), Some(RunState::Cancelled));
        assert_eq!(RunState::parse("unknown"), None);
    }

    #[test]
    fn serde_uses_camel_case() {
        let json = serde_json::to_string(&RunState::Running).unwrap();
        assert_eq!(json, r#""running""#);

        let back: RunState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RunState::Running);
    }
}
