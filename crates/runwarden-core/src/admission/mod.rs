//! Concurrency limits for workflow runs.
//!
//! A run is admitted when both the global and its workflow's running counts
//! are below their caps. Otherwise it waits in a bounded FIFO, or is rejected
//! when either queue is full. Slots freed by completions are handed to
//! waiting runs in global order, skipping workflows still at their own cap.

mod queue;

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::SystemTime;

use runwarden_config::ConfigSnapshot;
use runwarden_model::{
    Event, EventKind, ParallelismConfig, RunId, RunState, WorkflowId, WorkflowRun,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::bus::Bus;
use crate::sync::lock;
use queue::WaitQueue;

/// Why a run could not be admitted nor queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The global or the workflow queue has no room.
    QueueFull,
    /// The run is not `Pending` and is not held by the controller.
    InvalidState(RunState),
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::QueueFull => "queue full",
            RejectReason::InvalidState(_) => "run is not pending",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionResult {
    Admitted,
    Queued,
    Rejected(RejectReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Removed from both queues; the returned run is `Cancelled`.
    Cancelled(WorkflowRun),
    NotFoundOrAlreadyStarted,
}

/// Running and waiting counts of one scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdmissionStats {
    pub running: usize,
    pub queued: usize,
}

#[derive(Default)]
struct AdmissionState {
    running: HashMap<RunId, WorkflowId>,
    running_per_workflow: HashMap<WorkflowId, usize>,
    waiting: WaitQueue,
}

impl AdmissionState {
    fn running_for(&self, workflow: &WorkflowId) -> usize {
        self.running_per_workflow.get(workflow).copied().unwrap_or(0)
    }

    fn start(&mut self, run: &WorkflowRun) {
        self.running.insert(run.id.clone(), run.workflow_id.clone());
        *self
            .running_per_workflow
            .entry(run.workflow_id.clone())
            .or_default() += 1;
    }

    /// Returns the run's workflow, or `None` if the run was not running.
    fn finish(&mut self, id: &RunId) -> Option<WorkflowId> {
        let workflow = self.running.remove(id)?;
        if let Some(count) = self.running_per_workflow.get_mut(&workflow) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.running_per_workflow.remove(&workflow);
            }
        }
        Some(workflow)
    }
}

/// Decides whether a run may start now, wait, or be rejected.
///
/// Every check and counter mutation happens under one mutex, so concurrent
/// callers never observe a limit exceeded. No call blocks on capacity.
pub struct AdmissionController {
    limits: ParallelismConfig,
    state: Mutex<AdmissionState>,
    bus: Bus,
}

impl AdmissionController {
    pub fn new(config: &ConfigSnapshot, bus: Bus) -> Self {
        Self::with_limits(config.parallelism(), bus)
    }

    pub fn with_limits(limits: ParallelismConfig, bus: Bus) -> Self {
        Self {
            limits,
            state: Mutex::new(AdmissionState::default()),
            bus,
        }
    }

    pub fn limits(&self) -> ParallelismConfig {
        self.limits
    }

    /// Admit, queue or reject a `Pending` run.
    ///
    /// On `Admitted` the run is moved to `Running`, on `Queued` to `Queued`;
    /// a rejected run is left untouched. Asking again for a run already held
    /// reports its current placement.
    pub fn request_admission(&self, run: &mut WorkflowRun, now: SystemTime) -> AdmissionResult {
        let result = {
            let mut st = lock(&self.state);

            if st.running.contains_key(&run.id) {
                return AdmissionResult::Admitted;
            }
            if st.waiting.contains(&run.id) {
                return AdmissionResult::Queued;
            }
            if run.state != RunState::Pending {
                AdmissionResult::Rejected(RejectReason::InvalidState(run.state))
            } else if self.limits.overall.has_slot(st.running.len())
                && self
                    .limits
                    .single_workflow
                    .has_slot(st.running_for(&run.workflow_id))
            {
                match run.transition(RunState::Running, now) {
                    Ok(()) => {
                        st.start(run);
                        AdmissionResult::Admitted
                    }
                    Err(e) => AdmissionResult::Rejected(RejectReason::InvalidState(e.from)),
                }
            } else if self.limits.overall.has_queue_room(st.waiting.len())
                && self
                    .limits
                    .single_workflow
                    .has_queue_room(st.waiting.len_for(&run.workflow_id))
            {
                match run.transition(RunState::Queued, now) {
                    Ok(()) => {
                        st.waiting.push(run.clone());
                        AdmissionResult::Queued
                    }
                    Err(e) => AdmissionResult::Rejected(RejectReason::InvalidState(e.from)),
                }
            } else {
                AdmissionResult::Rejected(RejectReason::QueueFull)
            }
        };

        debug!(run = %run.id, workflow = %run.workflow_id, ?result, "admission decided");
        let event = match result {
            AdmissionResult::Admitted => Event::for_run(EventKind::RunAdmitted, &run.id, &run.workflow_id),
            AdmissionResult::Queued => Event::for_run(EventKind::RunQueued, &run.id, &run.workflow_id),
            AdmissionResult::Rejected(reason) => {
                Event::for_run(EventKind::RunRejected, &run.id, &run.workflow_id).with_reason(reason.as_str())
            }
        };
        self.bus.publish(event);
        result
    }

    /// Release the slot of a run that left `Running` and promote waiting runs.
    ///
    /// Returns the promoted runs, already in `Running`. A run the controller
    /// does not hold as running is ignored, so a repeated completion frees
    /// nothing.
    pub fn notify_completion(&self, run: &WorkflowRun, now: SystemTime) -> Vec<WorkflowRun> {
        self.release(&run.id, now)
    }

    /// [`notify_completion`](Self::notify_completion) by id alone, for runs
    /// whose record is gone.
    pub fn release(&self, id: &RunId, now: SystemTime) -> Vec<WorkflowRun> {
        let (workflow, promoted) = {
            let mut st = lock(&self.state);
            let Some(workflow) = st.finish(id) else {
                drop(st);
                warn!(run = %id, "completion for a run not running; ignored");
                return Vec::new();
            };
            let promoted = self.promote_locked(&mut st, now);
            (workflow, promoted)
        };

        self.bus
            .publish(Event::for_run(EventKind::RunCompleted, id, &workflow));
        self.publish_promoted(&promoted);
        promoted
    }

    /// Promote waiting runs into free slots.
    ///
    /// Completions promote on their own; this is for slots that appear
    /// otherwise, such as after recovery.
    pub fn promote(&self, now: SystemTime) -> Vec<WorkflowRun> {
        let promoted = {
            let mut st = lock(&self.state);
            self.promote_locked(&mut st, now)
        };
        self.publish_promoted(&promoted);
        promoted
    }

    /// Withdraw a waiting run. Idempotent.
    pub fn cancel_queued(&self, id: &RunId, now: SystemTime) -> CancelOutcome {
        let removed = lock(&self.state).waiting.remove(id);
        let Some(mut run) = removed else {
            return CancelOutcome::NotFoundOrAlreadyStarted;
        };
        if let Err(e) = run.transition(RunState::Cancelled, now) {
            warn!(run = %run.id, error = %e, "queued run could not be cancelled cleanly");
        }
        self.bus
            .publish(Event::for_run(EventKind::QueuedRunCancelled, &run.id, &run.workflow_id));
        CancelOutcome::Cancelled(run)
    }

    /// Take over a run that was `Running` or `Queued` before a restart.
    ///
    /// Limits are not checked: the run was already accepted. Returns `false`
    /// for runs in any other state or already held.
    /// Drop a queued run without touching its state or publishing a decision.
    ///
    /// Used when the run's record is gone (evicted by retention), so the run
    /// must never be promoted.
    pub fn withdraw(&self, id: &RunId) -> Option<WorkflowRun> {
        let removed = lock(&self.state).waiting.remove(id);
        if let Some(run) = &removed {
            debug!(run = %run.id, workflow = %run.workflow_id, "queued run withdrawn");
        }
        removed
    }

    pub fn adopt(&self, run: &WorkflowRun) -> bool {
        let mut st = lock(&self.state);
        if st.running.contains_key(&run.id) || st.waiting.contains(&run.id) {
            return false;
        }
        match run.state {
            RunState::Running => st.start(run),
            RunState::Queued => st.waiting.push(run.clone()),
            _ => return false,
        }
        true
    }

    pub fn is_running(&self, id: &RunId) -> bool {
        lock(&self.state).running.contains_key(id)
    }

    pub fn is_queued(&self, id: &RunId) -> bool {
        lock(&self.state).waiting.contains(id)
    }

    /// Waiting runs in global FIFO order.
    pub fn queued_runs(&self) -> Vec<WorkflowRun> {
        lock(&self.state).waiting.iter().cloned().collect()
    }

    pub fn stats(&self) -> AdmissionStats {
        let st = lock(&self.state);
        AdmissionStats {
            running: st.running.len(),
            queued: st.waiting.len(),
        }
    }

    pub fn workflow_stats(&self, workflow: &WorkflowId) -> AdmissionStats {
        let st = lock(&self.state);
        AdmissionStats {
            running: st.running_for(workflow),
            queued: st.waiting.len_for(workflow),
        }
    }

    /// Number of workflows with running or waiting runs.
    pub fn active_workflows(&self) -> usize {
        let st = lock(&self.state);
        let mut workflows: Vec<&WorkflowId> = st.running_per_workflow.keys().collect();
        for run in st.waiting.iter() {
            if !workflows.contains(&&run.workflow_id) {
                workflows.push(&run.workflow_id);
            }
        }
        workflows.len()
    }

    fn promote_locked(&self, st: &mut AdmissionState, now: SystemTime) -> Vec<WorkflowRun> {
        let mut promoted = Vec::new();
        while self.limits.overall.has_slot(st.running.len()) {
            let per_workflow = self.limits.single_workflow;
            let counts = &st.running_per_workflow;
            let next = st.waiting.take_first(|wf| {
                per_workflow.has_slot(counts.get(wf).copied().unwrap_or(0))
            });
            let Some(mut run) = next else {
                break;
            };
            if let Err(e) = run.transition(RunState::Running, now) {
                warn!(run = %run.id, error = %e, "queued run could not be promoted; dropped");
                continue;
            }
            st.start(&run);
            promoted.push(run);
        }
        promoted
    }

    fn publish_promoted(&self, promoted: &[WorkflowRun]) {
        for run in promoted {
            debug!(run = %run.id, workflow = %run.workflow_id, "queued run promoted");
            self.bus
                .publish(Event::for_run(EventKind::RunPromoted, &run.id, &run.workflow_id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::testing::Recorder;
    use runwarden_model::ParallelismConstraint;
    use std::sync::Arc;
    use std::time::{Duration, UNIX_EPOCH};

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn limits(overall: (u64, u64), per_workflow: (u64, u64)) -> ParallelismConfig {
        ParallelismConfig {
            overall: ParallelismConstraint::new(overall.0, overall.1),
            single_workflow: ParallelismConstraint::new(per_workflow.0, per_workflow.1),
        }
    }

    fn controller(overall: (u64, u64), per_workflow: (u64, u64)) -> AdmissionController {
        AdmissionController::with_limits(limits(overall, per_workflow), Bus::noop())
    }

    fn pending(id: &str, workflow: &str) -> WorkflowRun {
        WorkflowRun::new(id, workflow, at(1))
    }

    #[test]
    fn admits_queues_then_rejects_and_promotes_on_completion() {
        let ac = controller((2, 1), (2, 1));
        let mut r1 = pending("r1", "w");
        let mut r2 = pending("r2", "w");
        let mut r3 = pending("r3", "w");
        let mut r4 = pending("r4", "w");

        assert_eq!(ac.request_admission(&mut r1, at(2)), AdmissionResult::Admitted);
        assert_eq!(ac.request_admission(&mut r2, at(2)), AdmissionResult::Admitted);
        assert_eq!(ac.request_admission(&mut r3, at(2)), AdmissionResult::Queued);
        assert_eq!(
            ac.request_admission(&mut r4, at(2)),
            AdmissionResult::Rejected(RejectReason::QueueFull)
        );

        assert_eq!(r1.state, RunState::Running);
        assert_eq!(r3.state, RunState::Queued);
        assert_eq!(r4.state, RunState::Pending);

        let promoted = ac.notify_completion(&r1, at(3));
        assert_eq!(promoted.len(), 1);
        assert_eq!(promoted[0].id.as_str(), "r3");
        assert_eq!(promoted[0].state, RunState::Running);
        assert_eq!(promoted[0].updated_at, at(3));
        assert_eq!(ac.stats(), AdmissionStats { running: 2, queued: 0 });
    }

    #[test]
    fn workflow_cap_queues_while_other_workflows_run() {
        let ac = controller((10, 10), (1, 10));
        let mut a1 = pending("a1", "a");
        let mut a2 = pending("a2", "a");
        let mut b1 = pending("b1", "b");

        assert_eq!(ac.request_admission(&mut a1, at(1)), AdmissionResult::Admitted);
        assert_eq!(ac.request_admission(&mut a2, at(1)), AdmissionResult::Queued);
        assert_eq!(ac.request_admission(&mut b1, at(1)), AdmissionResult::Admitted);

        assert_eq!(ac.workflow_stats(&"a".into()), AdmissionStats { running: 1, queued: 1 });
        assert_eq!(ac.workflow_stats(&"b".into()), AdmissionStats { running: 1, queued: 0 });
    }

    #[test]
    fn promotion_skips_saturated_workflow() {
        // one global slot held by a1, a2 and b1 waiting; b's own cap is free
        let ac = controller((2, 10), (1, 10));
        let mut a1 = pending("a1", "a");
        let mut c1 = pending("c1", "c");
        let mut a2 = pending("a2", "a");
        let mut b1 = pending("b1", "b");

        assert_eq!(ac.request_admission(&mut a1, at(1)), AdmissionResult::Admitted);
        assert_eq!(ac.request_admission(&mut c1, at(1)), AdmissionResult::Admitted);
        assert_eq!(ac.request_admission(&mut a2, at(1)), AdmissionResult::Queued);
        assert_eq!(ac.request_admission(&mut b1, at(1)), AdmissionResult::Queued);

        // c1 frees a global slot, but a is still capped by a1
        let promoted = ac.notify_completion(&c1, at(2));
        assert_eq!(promoted.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["b1"]);
        assert!(ac.is_queued(&"a2".into()));

        let promoted = ac.notify_completion(&a1, at(3));
        assert_eq!(promoted.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["a2"]);
    }

    #[test]
    fn promotion_fills_every_free_slot() {
        let ac = controller((3, 10), (3, 10));
        let mut runs: Vec<_> = (0..5).map(|i| pending(&format!("r{i}"), "w")).collect();
        for run in runs.iter_mut() {
            ac.request_admission(run, at(1));
        }
        assert_eq!(ac.stats(), AdmissionStats { running: 3, queued: 2 });

        let promoted = ac.notify_completion(&runs[0], at(2));
        assert_eq!(promoted.len(), 1);
        assert_eq!(promoted[0].id.as_str(), "r3");
    }

    #[test]
    fn repeated_completion_is_ignored() {
        let ac = controller((1, 5), (1, 5));
        let mut r1 = pending("r1", "w");
        let mut r2 = pending("r2", "w");
        let mut r3 = pending("r3", "w");
        ac.request_admission(&mut r1, at(1));
        ac.request_admission(&mut r2, at(1));
        ac.request_admission(&mut r3, at(1));

        assert_eq!(ac.notify_completion(&r1, at(2)).len(), 1);
        assert!(ac.notify_completion(&r1, at(2)).is_empty());
        assert_eq!(ac.stats(), AdmissionStats { running: 1, queued: 1 });
    }

    #[test]
    fn cancel_frees_queue_slot_in_both_scopes() {
        let ac = controller((1, 1), (1, 1));
        let mut r1 = pending("r1", "w");
        let mut r2 = pending("r2", "w");
        let mut r3 = pending("r3", "w");

        ac.request_admission(&mut r1, at(1));
        assert_eq!(ac.request_admission(&mut r2, at(1)), AdmissionResult::Queued);
        assert_eq!(
            ac.request_admission(&mut r3.clone(), at(1)),
            AdmissionResult::Rejected(RejectReason::QueueFull)
        );

        match ac.cancel_queued(&r2.id, at(2)) {
            CancelOutcome::Cancelled(run) => {
                assert_eq!(run.state, RunState::Cancelled);
                assert_eq!(run.finished_at, Some(at(2)));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(ac.workflow_stats(&"w".into()).queued, 0);
        assert_eq!(ac.request_admission(&mut r3, at(3)), AdmissionResult::Queued);

        assert_eq!(ac.cancel_queued(&r2.id, at(4)), CancelOutcome::NotFoundOrAlreadyStarted);
    }

    #[test]
    fn withdrawn_run_is_never_promoted() {
        let ac = controller((1, 4), (1, 4));
        let mut r1 = pending("r1", "w");
        let mut r2 = pending("r2", "w");
        let mut r3 = pending("r3", "w");
        ac.request_admission(&mut r1, at(1));
        ac.request_admission(&mut r2, at(1));
        ac.request_admission(&mut r3, at(1));

        let withdrawn = ac.withdraw(&r2.id).unwrap();
        assert_eq!(withdrawn.state, RunState::Queued);
        assert!(ac.withdraw(&r2.id).is_none());
        assert!(ac.withdraw(&r1.id).is_none());

        let promoted = ac.notify_completion(&r1, at(2));
        assert_eq!(promoted.len(), 1);
        assert_eq!(promoted[0].id.as_str(), "r3");
        assert_eq!(ac.stats(), AdmissionStats { running: 1, queued: 0 });
    }

    #[test]
    fn cancel_of_running_run_is_noop() {
        let ac = controller((1, 1), (1, 1));
        let mut r1 = pending("r1", "w");
        ac.request_admission(&mut r1, at(1));

        assert_eq!(ac.cancel_queued(&r1.id, at(2)), CancelOutcome::NotFoundOrAlreadyStarted);
        assert!(ac.is_running(&r1.id));
    }

    #[test]
    fn non_pending_unknown_run_is_rejected() {
        let ac = controller((5, 5), (5, 5));
        let mut run = pending("r1", "w");
        run.transition(RunState::Running, at(1)).unwrap();
        run.transition(RunState::Completed, at(2)).unwrap();

        assert_eq!(
            ac.request_admission(&mut run, at(3)),
            AdmissionResult::Rejected(RejectReason::InvalidState(RunState::Completed))
        );
        assert_eq!(ac.stats(), AdmissionStats::default());
    }

    #[test]
    fn repeated_request_reports_current_placement() {
        let ac = controller((1, 5), (1, 5));
        let mut r1 = pending("r1", "w");
        let mut r2 = pending("r2", "w");
        ac.request_admission(&mut r1, at(1));
        ac.request_admission(&mut r2, at(1));

        assert_eq!(ac.request_admission(&mut r1, at(2)), AdmissionResult::Admitted);
        assert_eq!(ac.request_admission(&mut r2, at(2)), AdmissionResult::Queued);
        assert_eq!(ac.stats(), AdmissionStats { running: 1, queued: 1 });
    }

    #[test]
    fn unbounded_limits_admit_everything() {
        let ac = AdmissionController::with_limits(ParallelismConfig::unbounded(), Bus::noop());
        for i in 0..100 {
            let mut run = pending(&format!("r{i}"), "w");
            assert_eq!(ac.request_admission(&mut run, at(1)), AdmissionResult::Admitted);
        }
    }

    #[test]
    fn idle_workflows_are_dropped() {
        let ac = controller((5, 5), (5, 5));
        let mut r1 = pending("r1", "w");
        ac.request_admission(&mut r1, at(1));
        assert_eq!(ac.active_workflows(), 1);

        ac.notify_completion(&r1, at(2));
        assert_eq!(ac.active_workflows(), 0);
    }

    #[test]
    fn adopted_runs_count_against_limits() {
        let ac = controller((1, 5), (1, 5));
        let mut running = pending("r1", "w");
        running.transition(RunState::Running, at(1)).unwrap();
        let mut queued = pending("r2", "w");
        queued.transition(RunState::Queued, at(1)).unwrap();

        assert!(ac.adopt(&running));
        assert!(ac.adopt(&queued));
        assert!(!ac.adopt(&queued));
        assert!(ac.promote(at(2)).is_empty());

        let mut r3 = pending("r3", "w");
        assert_eq!(ac.request_admission(&mut r3, at(2)), AdmissionResult::Queued);

        let promoted = ac.notify_completion(&running, at(3));
        assert_eq!(promoted[0].id.as_str(), "r2");
    }

    #[test]
    fn limits_hold_under_concurrent_requests() {
        let ac = Arc::new(controller((4, 8), (2, 8)));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let ac = Arc::clone(&ac);
                std::thread::spawn(move || {
                    for i in 0..4 {
                        let mut run = pending(&format!("t{t}-{i}"), &format!("w{}", t % 3));
                        ac.request_admission(&mut run, at(1));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let stats = ac.stats();
        assert_eq!(stats.running, 4);
        assert_eq!(stats.queued, 8);
        for wf in ["w0", "w1", "w2"] {
            assert!(ac.workflow_stats(&wf.into()).running <= 2);
        }
    }

    #[test]
    fn limits_hold_while_completing_and_cancelling_concurrently() {
        let ac = Arc::new(controller((4, 8), (2, 8)));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let ac = Arc::clone(&ac);
                std::thread::spawn(move || {
                    let mut running = Vec::new();
                    let mut queued = Vec::new();
                    for i in 0..6 {
                        let mut run = pending(&format!("t{t}-{i}"), &format!("w{}", t % 3));
                        let result = ac.request_admission(&mut run, at(1));
                        let workflow_id = run.workflow_id.clone();
                        match result {
                            AdmissionResult::Admitted => running.push(run),
                            AdmissionResult::Queued => queued.push(run),
                            AdmissionResult::Rejected(_) => {}
                        }
                        let stats = ac.stats();
                        assert!(stats.running <= 4 && stats.queued <= 8, "{stats:?}");
                        assert!(ac.workflow_stats(&workflow_id).running <= 2);
                    }
                    // whoever completes a run owns the runs it promotes
                    while let Some(mut run) = running.pop() {
                        run.transition(RunState::Completed, at(2)).unwrap();
                        running.extend(ac.notify_completion(&run, at(2)));
                        assert!(ac.stats().running <= 4);
                    }
                    for run in queued {
                        ac.cancel_queued(&run.id, at(3));
                    }
                    // promotions racing the cancellations above
                    while let Some(mut run) = running.pop() {
                        run.transition(RunState::Completed, at(4)).unwrap();
                        running.extend(ac.notify_completion(&run, at(4)));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(ac.stats(), AdmissionStats { running: 0, queued: 0 });
        assert_eq!(ac.active_workflows(), 0);
    }

    #[tokio::test]
    async fn publishes_decisions() {
        let rec = Arc::new(Recorder::default());
        let ac = AdmissionController::with_limits(limits((1, 1), (1, 1)), Bus::new(vec![rec.clone()]));
        let mut r1 = pending("r1", "w");
        let mut r2 = pending("r2", "w");
        let mut r3 = pending("r3", "w");
        ac.request_admission(&mut r1, at(1));
        ac.request_admission(&mut r2, at(1));
        ac.request_admission(&mut r3, at(1));
        ac.notify_completion(&r1, at(2));

        for _ in 0..50 {
            if rec.kinds().len() == 5 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(
            rec.kinds(),
            vec![
                EventKind::RunAdmitted,
                EventKind::RunQueued,
                EventKind::RunRejected,
                EventKind::RunCompleted,
                EventKind::RunPromoted,
            ]
        );
    }
}
