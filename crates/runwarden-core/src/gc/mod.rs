//! Delayed, retry-bounded reclamation of terminated runs' external resources.
//!
//! Per task: `Scheduled -> Attempting -> Done`, or back to `Scheduled` after a
//! failure while attempts remain, or `PermanentlyFailed` once they are spent.
//! Tasks live in memory; [`GarbageCollector::recover`] rebuilds them from
//! terminal run records after a restart.

mod backoff;
mod sweeper;

pub use backoff::Backoff;
pub use sweeper::GcSweeper;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use runwarden_config::ConfigSnapshot;
use runwarden_model::{Event, EventKind, GcState, GcTask, Namespace, RunId, WorkflowRun};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::alert::{Alert, AlertSink};
use crate::bus::Bus;
use crate::cleaner::{CleanupError, ResourceCleaner};
use crate::error::CoreError;
use crate::store::{RunStore, StoreError};
use crate::sync::lock;

/// GC settings resolved from a config snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcPolicy {
    pub enabled: bool,
    /// Wait between a run terminating and its first attempt.
    pub delay: Duration,
    /// First attempt plus retries; at least 1.
    pub max_attempts: u32,
    pub backoff: Backoff,
    /// Namespace handed to the cleaner.
    pub namespace: Namespace,
}

impl GcPolicy {
    pub fn from_snapshot(config: &ConfigSnapshot) -> Self {
        let gc = config.gc();
        Self {
            enabled: gc.enabled,
            delay: Duration::from_secs(gc.delay_seconds),
            max_attempts: gc.max_attempts(),
            backoff: Backoff::from_config(gc),
            namespace: config.execution_context().namespace.clone(),
        }
    }
}

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub attempted: usize,
    pub done: usize,
    pub retried: usize,
    pub permanently_failed: usize,
    /// Tasks that reached `Done` or `PermanentlyFailed` in this sweep.
    pub finished: Vec<GcTask>,
}

/// What happened to a run record selected for eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eviction {
    /// The record was deleted from the run store.
    Deleted,
    /// The record was flagged `evicted`; it goes once its GC task is done.
    Deferred,
}

/// Owns every unfinished GC task.
///
/// The task table lock also covers run-record updates made on a task's
/// behalf, and is never held across a cleanup call.
pub struct GarbageCollector {
    policy: GcPolicy,
    tasks: Mutex<HashMap<RunId, GcTask>>,
    store: Arc<dyn RunStore>,
    cleaner: Arc<dyn ResourceCleaner>,
    alerts: Arc<dyn AlertSink>,
    bus: Bus,
}

impl GarbageCollector {
    pub fn new(
        policy: GcPolicy,
        store: Arc<dyn RunStore>,
        cleaner: Arc<dyn ResourceCleaner>,
        alerts: Arc<dyn AlertSink>,
        bus: Bus,
    ) -> Self {
        Self {
            policy,
            tasks: Mutex::new(HashMap::new()),
            store,
            cleaner,
            alerts,
            bus,
        }
    }

    pub fn policy(&self) -> &GcPolicy {
        &self.policy
    }

    /// Create the GC task of a run that just terminated.
    ///
    /// Returns `None` when GC is disabled; the record is marked
    /// `GcState::Disabled` so recovery leaves it alone under any later policy.
    /// Scheduling a run twice returns the existing task.
    pub fn schedule(&self, run: &WorkflowRun, now: SystemTime) -> Result<Option<GcTask>, CoreError> {
        if !run.is_terminal() {
            return Err(CoreError::NotTerminal(run.state));
        }
        if !self.policy.enabled {
            debug!(run = %run.id, "gc disabled; resources left in place");
            self.record_decision(&run.id, GcState::Disabled, None)?;
            return Ok(None);
        }

        let task = {
            let mut tasks = lock(&self.tasks);
            if let Some(existing) = tasks.get(&run.id) {
                return Ok(Some(existing.clone()));
            }
            let mut task = GcTask::new(
                run.id.clone(),
                run.workflow_id.clone(),
                self.policy.namespace.clone(),
                now + self.policy.delay,
                self.policy.max_attempts,
            );
            task.evict_on_completion = run.evicted;
            self.record_decision(&task.run_id, GcState::Scheduled, Some(self.policy.delay.as_secs()))?;
            tasks.insert(task.run_id.clone(), task.clone());
            task
        };

        self.bus.publish(
            Event::for_run(EventKind::GcScheduled, &task.run_id, &task.workflow_id)
                .with_delay_ms(self.policy.delay.as_millis() as u64),
        );
        Ok(Some(task))
    }

    /// Tasks whose next attempt may start at `now`, earliest first.
    pub fn due(&self, now: SystemTime) -> Vec<GcTask> {
        let mut due: Vec<GcTask> = lock(&self.tasks)
            .values()
            .filter(|t| t.is_due(now))
            .cloned()
            .collect();
        sort_by_schedule(&mut due);
        due
    }

    /// Tasks still waiting or in progress, earliest first.
    pub fn pending(&self) -> Vec<GcTask> {
        let mut pending: Vec<GcTask> = lock(&self.tasks)
            .values()
            .filter(|t| matches!(t.state, GcState::Scheduled | GcState::Attempting))
            .cloned()
            .collect();
        sort_by_schedule(&mut pending);
        pending
    }

    /// Tasks that exhausted their attempts and wait for an operator.
    pub fn failed(&self) -> Vec<GcTask> {
        let mut failed: Vec<GcTask> = lock(&self.tasks)
            .values()
            .filter(|t| t.state == GcState::PermanentlyFailed)
            .cloned()
            .collect();
        failed.sort_by(|a, b| a.run_id.cmp(&b.run_id));
        failed
    }

    pub fn get(&self, id: &RunId) -> Option<GcTask> {
        lock(&self.tasks).get(id).cloned()
    }

    /// Run one cleanup attempt for every due task.
    ///
    /// Each due task gets exactly one call to the cleaner. Store failures are
    /// logged and do not stop the sweep.
    pub async fn sweep(&self, now: SystemTime) -> SweepReport {
        let batch: Vec<GcTask> = {
            let mut tasks = lock(&self.tasks);
            let mut due: Vec<&mut GcTask> = tasks.values_mut().filter(|t| t.is_due(now)).collect();
            due.sort_by(|a, b| (a.scheduled_at, &a.run_id).cmp(&(b.scheduled_at, &b.run_id)));
            let batch: Vec<GcTask> = due
                .into_iter()
                .map(|t| {
                    t.state = GcState::Attempting;
                    t.attempts += 1;
                    t.clone()
                })
                .collect();
            for task in &batch {
                self.mark_record_logged(&task.run_id, GcState::Attempting);
            }
            batch
        };

        let mut report = SweepReport::default();
        for task in batch {
            report.attempted += 1;
            debug!(run = %task.run_id, attempt = task.attempts, cleaner = self.cleaner.name(), "gc attempt");
            let outcome = self.cleaner.cleanup(&task).await;
            self.settle(task, outcome, now, &mut report).await;
        }
        report
    }

    async fn settle(
        &self,
        mut task: GcTask,
        outcome: Result<(), CleanupError>,
        now: SystemTime,
        report: &mut SweepReport,
    ) {
        match outcome {
            Ok(()) => {
                task.state = GcState::Done;
                task.last_error = None;
                {
                    let mut tasks = lock(&self.tasks);
                    if let Some(entry) = tasks.remove(&task.run_id) {
                        task.evict_on_completion |= entry.evict_on_completion;
                    }
                    self.finish_record(&task);
                }
                self.bus.publish(
                    Event::for_run(EventKind::GcDone, &task.run_id, &task.workflow_id)
                        .with_attempt(task.attempts),
                );
                report.done += 1;
                report.finished.push(task);
            }
            Err(e) => {
                task.last_error = Some(e.to_string());
                self.bus.publish(
                    Event::for_run(EventKind::GcAttemptFailed, &task.run_id, &task.workflow_id)
                        .with_attempt(task.attempts)
                        .with_reason(e.to_string()),
                );

                if task.attempts < task.max_attempts {
                    let delay = self.policy.backoff.delay(task.attempts);
                    task.state = GcState::Scheduled;
                    task.scheduled_at = now + delay;
                    self.store_task(&mut task);
                    self.bus.publish(
                        Event::for_run(EventKind::GcRetryScheduled, &task.run_id, &task.workflow_id)
                            .with_attempt(task.attempts)
                            .with_delay_ms(delay.as_millis() as u64),
                    );
                    report.retried += 1;
                } else {
                    task.state = GcState::PermanentlyFailed;
                    self.store_task(&mut task);
                    self.bus.publish(
                        Event::for_run(EventKind::GcPermanentlyFailed, &task.run_id, &task.workflow_id)
                            .with_attempt(task.attempts)
                            .with_reason(e.to_string()),
                    );
                    if let Err(err) = self.alerts.alert(&Alert::gc_exhausted(&task, now)).await {
                        error!(run = %task.run_id, error = %err, "gc alert not delivered");
                    }
                    report.permanently_failed += 1;
                    report.finished.push(task);
                }
            }
        }
    }

    /// Evict a run record, deferring the deletion while its GC task exists.
    ///
    /// A permanently failed task also defers: the record stays, flagged, as
    /// the trace of unreclaimed resources.
    pub fn evict(&self, id: &RunId) -> Result<Eviction, CoreError> {
        let mut tasks = lock(&self.tasks);
        if let Some(task) = tasks.get_mut(id) {
            task.evict_on_completion = true;
            if let Some(mut run) = self.store.get(id)? {
                run.evicted = true;
                self.store.put(run)?;
            }
            return Ok(Eviction::Deferred);
        }
        self.store.delete(id)?;
        Ok(Eviction::Deleted)
    }

    /// Rebuild tasks from terminal run records whose cleanup never settled.
    ///
    /// The decision recorded when the run terminated wins over the current
    /// policy: a `Disabled` record is never collected, and a scheduled one is
    /// collected even if GC has since been turned off. Each task is due at
    /// `finished_at + recorded delay`, or `now` if that has passed, with a
    /// fresh attempt budget. Records without a decision (the process stopped
    /// between persisting the terminal state and scheduling) follow the
    /// current policy. Permanently failed records are listed again as failed
    /// without being retried. Returns the rescheduled tasks.
    pub fn recover(&self, now: SystemTime) -> Result<Vec<GcTask>, CoreError> {
        let runs = self.store.list_terminal()?;
        let mut recovered = Vec::new();
        {
            let mut tasks = lock(&self.tasks);
            for run in runs {
                if tasks.contains_key(&run.id) {
                    continue;
                }
                let delay = match run.gc {
                    Some(GcState::Done | GcState::Disabled) => continue,
                    Some(GcState::PermanentlyFailed) => {
                        let mut task = self.task_for(&run, now);
                        task.attempts = task.max_attempts;
                        task.state = GcState::PermanentlyFailed;
                        tasks.insert(task.run_id.clone(), task);
                        continue;
                    }
                    Some(GcState::Scheduled | GcState::Attempting) => run
                        .gc_delay_seconds
                        .map_or(self.policy.delay, Duration::from_secs),
                    None if self.policy.enabled => self.policy.delay,
                    None => continue,
                };
                let finished = run.finished_at.unwrap_or(run.updated_at);
                let task = self.task_for(&run, (finished + delay).max(now));
                tasks.insert(task.run_id.clone(), task.clone());
                recovered.push(task);
            }
        }

        for task in &recovered {
            self.bus
                .publish(Event::for_run(EventKind::GcRecovered, &task.run_id, &task.workflow_id));
        }
        Ok(recovered)
    }

    /// Give a permanently failed task a fresh attempt budget, due at `now`.
    pub fn retry_failed(&self, id: &RunId, now: SystemTime) -> Result<GcTask, CoreError> {
        let task = {
            let mut tasks = lock(&self.tasks);
            let Some(task) = tasks
                .get_mut(id)
                .filter(|t| t.state == GcState::PermanentlyFailed)
            else {
                return Err(CoreError::NoFailedGc(id.clone()));
            };
            task.attempts = 0;
            task.state = GcState::Scheduled;
            task.scheduled_at = now;
            task.last_error = None;
            let task = task.clone();
            self.mark_record(id, GcState::Scheduled)?;
            task
        };

        self.bus.publish(
            Event::for_run(EventKind::GcScheduled, &task.run_id, &task.workflow_id).with_reason("manual retry"),
        );
        Ok(task)
    }

    fn task_for(&self, run: &WorkflowRun, scheduled_at: SystemTime) -> GcTask {
        let mut task = GcTask::new(
            run.id.clone(),
            run.workflow_id.clone(),
            self.policy.namespace.clone(),
            scheduled_at,
            self.policy.max_attempts,
        );
        task.evict_on_completion = run.evicted;
        task
    }

    /// Write back a task after a failed attempt, keeping a concurrent eviction flag.
    fn store_task(&self, task: &mut GcTask) {
        let mut tasks = lock(&self.tasks);
        if let Some(entry) = tasks.get_mut(&task.run_id) {
            task.evict_on_completion |= entry.evict_on_completion;
            *entry = task.clone();
        }
        self.mark_record_logged(&task.run_id, task.state);
    }

    fn finish_record(&self, task: &GcTask) {
        let result = match self.store.get(&task.run_id) {
            Ok(Some(run)) if task.evict_on_completion || run.evicted => {
                self.store.delete(&task.run_id).map(|_| ())
            }
            Ok(Some(mut run)) => {
                run.gc = Some(GcState::Done);
                self.store.put(run)
            }
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(run = %task.run_id, error = %e, "run record not updated after gc");
        }
    }

    fn mark_record(&self, id: &RunId, state: GcState) -> Result<(), StoreError> {
        if let Some(mut run) = self.store.get(id)? {
            run.gc = Some(state);
            self.store.put(run)?;
        }
        Ok(())
    }

    fn record_decision(&self, id: &RunId, state: GcState, delay_seconds: Option<u64>) -> Result<(), StoreError> {
        if let Some(mut run) = self.store.get(id)? {
            run.gc = Some(state);
            run.gc_delay_seconds = delay_seconds;
            self.store.put(run)?;
        }
        Ok(())
    }

    fn mark_record_logged(&self, id: &RunId, state: GcState) {
        if let Err(e) = self.mark_record(id, state) {
            warn!(run = %id, ?state, error = %e, "gc state not recorded");
        }
    }
}

fn sort_by_schedule(tasks: &mut [GcTask]) {
    tasks.sort_by(|a, b| (a.scheduled_at, &a.run_id).cmp(&(b.scheduled_at, &b.run_id)));
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use runwarden_model::GcTask;

    use crate::alert::{Alert, AlertError, AlertSink};
    use crate::cleaner::{CleanupError, ResourceCleaner};

    /// Cleaner that fails a fixed number of times, then succeeds.
    #[derive(Default)]
    pub struct ScriptedCleaner {
        pub failures_left: AtomicU32,
        pub calls: AtomicU32,
    }

    impl ScriptedCleaner {
        pub fn failing(times: u32) -> Self {
            Self {
                failures_left: AtomicU32::new(times),
                calls: AtomicU32::new(0),
            }
        }

        pub fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ResourceCleaner for ScriptedCleaner {
        async fn cleanup(&self, _task: &GcTask) -> Result<(), CleanupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(CleanupError::Failed("namespace still terminating".into()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct RecordingAlerts {
        pub alerts: Mutex<Vec<Alert>>,
    }

    #[async_trait]
    impl AlertSink for RecordingAlerts {
        async fn alert(&self, alert: &Alert) -> Result<(), AlertError> {
            self.alerts.lock().unwrap().push(alert.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{RecordingAlerts, ScriptedCleaner};
    use super::*;
    use crate::store::MemoryRunStore;
    use runwarden_model::RunState;
    use std::time::UNIX_EPOCH;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn policy(retry: u32, delay_secs: u64) -> GcPolicy {
        GcPolicy {
            enabled: true,
            delay: Duration::from_secs(delay_secs),
            max_attempts: retry + 1,
            backoff: Backoff::new(Duration::from_secs(1), Duration::from_secs(10)),
            namespace: "cyclone".into(),
        }
    }

    struct Fixture {
        gc: GarbageCollector,
        store: Arc<MemoryRunStore>,
        cleaner: Arc<ScriptedCleaner>,
        alerts: Arc<RecordingAlerts>,
    }

    fn fixture(policy: GcPolicy, failures: u32) -> Fixture {
        let store = Arc::new(MemoryRunStore::new());
        let cleaner = Arc::new(ScriptedCleaner::failing(failures));
        let alerts = Arc::new(RecordingAlerts::default());
        let gc = GarbageCollector::new(policy, store.clone(), cleaner.clone(), alerts.clone(), Bus::noop());
        Fixture {
            gc,
            store,
            cleaner,
            alerts,
        }
    }

    fn finished(f: &Fixture, id: &str, finished_at: u64) -> WorkflowRun {
        let mut run = WorkflowRun::new(id, "wf", at(0));
        run.transition(RunState::Running, at(0)).unwrap();
        run.transition(RunState::Completed, at(finished_at)).unwrap();
        f.store.put(run.clone()).unwrap();
        run
    }

    #[tokio::test]
    async fn retries_until_success_within_budget() {
        let f = fixture(policy(2, 0), 2);
        let run = finished(&f, "r1", 10);
        f.gc.schedule(&run, at(10)).unwrap();

        let r = f.gc.sweep(at(10)).await;
        assert_eq!((r.attempted, r.retried), (1, 1));
        assert!(f.gc.due(at(10)).is_empty());

        // first retry waits base, second waits twice that
        let r = f.gc.sweep(at(11)).await;
        assert_eq!(r.retried, 1);
        assert_eq!(f.gc.get(&run.id).unwrap().scheduled_at, at(13));

        let r = f.gc.sweep(at(13)).await;
        assert_eq!(r.done, 1);
        assert_eq!(r.finished[0].state, GcState::Done);
        assert_eq!(r.finished[0].attempts, 3);
        assert_eq!(f.cleaner.calls(), 3);
        assert!(f.gc.get(&run.id).is_none());
        assert_eq!(f.store.get(&run.id).unwrap().unwrap().gc, Some(GcState::Done));
        assert!(f.alerts.alerts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_retry_fails_permanently_after_one_attempt() {
        let f = fixture(policy(0, 0), u32::MAX);
        let run = finished(&f, "r1", 10);
        f.gc.schedule(&run, at(10)).unwrap();

        let r = f.gc.sweep(at(10)).await;
        assert_eq!(r.permanently_failed, 1);
        assert_eq!(r.finished[0].attempts, 1);
        assert_eq!(f.cleaner.calls(), 1);

        let failed = f.gc.failed();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].state, GcState::PermanentlyFailed);
        assert!(failed[0].last_error.is_some());
        assert_eq!(
            f.store.get(&run.id).unwrap().unwrap().gc,
            Some(GcState::PermanentlyFailed)
        );

        let alerts = f.alerts.alerts.lock().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].attempts, 1);
        assert_eq!(alerts[0].namespace, "cyclone");
        drop(alerts);

        // not retried automatically
        let r = f.gc.sweep(at(10_000)).await;
        assert_eq!(r.attempted, 0);
    }

    #[tokio::test]
    async fn attempts_never_exceed_budget() {
        let f = fixture(policy(3, 0), u32::MAX);
        let run = finished(&f, "r1", 0);
        f.gc.schedule(&run, at(0)).unwrap();

        for t in (0..200).step_by(5) {
            f.gc.sweep(at(t)).await;
        }
        assert_eq!(f.cleaner.calls(), 4);
        assert_eq!(f.gc.failed()[0].attempts, 4);
    }

    #[test]
    fn disabled_gc_creates_no_task() {
        let mut p = policy(1, 0);
        p.enabled = false;
        let f = fixture(p, 0);
        let run = finished(&f, "r1", 10);

        assert!(f.gc.schedule(&run, at(10)).unwrap().is_none());
        assert!(f.gc.pending().is_empty());
        assert_eq!(f.store.get(&run.id).unwrap().unwrap().gc, Some(GcState::Disabled));
    }

    #[test]
    fn schedule_records_delay_on_the_run() {
        let f = fixture(policy(0, 45), 0);
        let run = finished(&f, "r1", 10);
        f.gc.schedule(&run, at(10)).unwrap();

        let stored = f.store.get(&run.id).unwrap().unwrap();
        assert_eq!(stored.gc, Some(GcState::Scheduled));
        assert_eq!(stored.gc_delay_seconds, Some(45));
    }

    fn restarted(f: &Fixture, policy: GcPolicy) -> GarbageCollector {
        GarbageCollector::new(
            policy,
            f.store.clone(),
            f.cleaner.clone(),
            f.alerts.clone(),
            Bus::noop(),
        )
    }

    #[test]
    fn recover_skips_runs_finished_while_gc_was_off() {
        let mut off = policy(0, 0);
        off.enabled = false;
        let f = fixture(off, 0);
        let run = finished(&f, "r1", 10);
        f.gc.schedule(&run, at(10)).unwrap();

        let gc = restarted(&f, policy(0, 0));
        assert!(gc.recover(at(100)).unwrap().is_empty());
        assert!(gc.pending().is_empty());
    }

    #[test]
    fn recover_keeps_recorded_schedule_after_gc_is_turned_off() {
        let f = fixture(policy(0, 30), 0);
        let run = finished(&f, "r1", 100);
        f.gc.schedule(&run, at(100)).unwrap();

        let mut off = policy(0, 5);
        off.enabled = false;
        let gc = restarted(&f, off);
        let recovered = gc.recover(at(110)).unwrap();

        assert_eq!(recovered.len(), 1);
        // recorded 30s delay, not the restarted policy's 5s
        assert_eq!(recovered[0].scheduled_at, at(130));
    }

    #[test]
    fn delay_postpones_first_attempt() {
        let f = fixture(policy(0, 30), 0);
        let run = finished(&f, "r1", 10);
        let task = f.gc.schedule(&run, at(10)).unwrap().unwrap();

        assert_eq!(task.scheduled_at, at(40));
        assert!(f.gc.due(at(39)).is_empty());
        assert_eq!(f.gc.due(at(40)).len(), 1);
    }

    #[test]
    fn zero_delay_is_due_immediately() {
        let f = fixture(policy(0, 0), 0);
        let run = finished(&f, "r1", 10);
        f.gc.schedule(&run, at(10)).unwrap();

        assert_eq!(f.gc.due(at(10)).len(), 1);
        assert_eq!(f.store.get(&run.id).unwrap().unwrap().gc, Some(GcState::Scheduled));
    }

    #[test]
    fn schedule_refuses_active_runs_and_is_idempotent() {
        let f = fixture(policy(0, 5), 0);
        let active = WorkflowRun::new("r0", "wf", at(0));
        assert!(matches!(
            f.gc.schedule(&active, at(0)),
            Err(CoreError::NotTerminal(RunState::Pending))
        ));

        let run = finished(&f, "r1", 10);
        let first = f.gc.schedule(&run, at(10)).unwrap().unwrap();
        let second = f.gc.schedule(&run, at(20)).unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(f.gc.pending().len(), 1);
    }

    #[tokio::test]
    async fn deferred_eviction_deletes_record_when_done() {
        let f = fixture(policy(0, 60), 0);
        let run = finished(&f, "r1", 0);
        f.gc.schedule(&run, at(0)).unwrap();

        assert_eq!(f.gc.evict(&run.id).unwrap(), Eviction::Deferred);
        assert!(f.store.get(&run.id).unwrap().unwrap().evicted);

        f.gc.sweep(at(60)).await;
        assert!(f.store.get(&run.id).unwrap().is_none());
    }

    #[test]
    fn eviction_without_task_deletes_at_once() {
        let f = fixture(policy(0, 0), 0);
        let run = finished(&f, "r1", 0);

        assert_eq!(f.gc.evict(&run.id).unwrap(), Eviction::Deleted);
        assert!(f.store.get(&run.id).unwrap().is_none());
    }

    #[test]
    fn recover_reschedules_unreclaimed_runs_only() {
        let f = fixture(policy(1, 30), 0);
        let fresh = finished(&f, "fresh", 100);
        let stale = finished(&f, "stale", 10);

        let mut done = finished(&f, "done", 10);
        done.gc = Some(GcState::Done);
        f.store.put(done).unwrap();

        let mut failed = finished(&f, "failed", 10);
        failed.gc = Some(GcState::PermanentlyFailed);
        f.store.put(failed).unwrap();

        let running = {
            let mut r = WorkflowRun::new("running", "wf", at(0));
            r.transition(RunState::Running, at(0)).unwrap();
            r
        };
        f.store.put(running).unwrap();

        let recovered = f.gc.recover(at(110)).unwrap();
        let mut ids: Vec<_> = recovered.iter().map(|t| t.run_id.as_str().to_string()).collect();
        ids.sort();
        assert_eq!(ids, vec!["fresh", "stale"]);

        assert_eq!(f.gc.get(&fresh.id).unwrap().scheduled_at, at(130));
        assert_eq!(f.gc.get(&stale.id).unwrap().scheduled_at, at(110));
        assert_eq!(f.gc.failed().len(), 1);

        // second pass finds nothing new
        assert!(f.gc.recover(at(120)).unwrap().is_empty());
    }

    #[tokio::test]
    async fn retry_failed_restores_budget() {
        let f = fixture(policy(0, 0), 1);
        let run = finished(&f, "r1", 0);
        f.gc.schedule(&run, at(0)).unwrap();
        f.gc.sweep(at(0)).await;
        assert_eq!(f.gc.failed().len(), 1);

        let task = f.gc.retry_failed(&run.id, at(50)).unwrap();
        assert_eq!((task.attempts, task.state), (0, GcState::Scheduled));

        let r = f.gc.sweep(at(50)).await;
        assert_eq!(r.done, 1);
        assert!(f.gc.failed().is_empty());

        assert!(matches!(
            f.gc.retry_failed(&run.id, at(60)),
            Err(CoreError::NoFailedGc(_))
        ));
    }

    #[test]
    fn policy_from_snapshot() {
        let config: runwarden_config::ControllerConfig = serde_json::from_str(
            r#"{"gc":{"enabled":true,"delay_seconds":15,"retry":2},"execution_context":{"namespace":"ns"}}"#,
        )
        .unwrap();
        let snapshot = ConfigSnapshot::from_config(config).unwrap();
        let p = GcPolicy::from_snapshot(&snapshot);

        assert!(p.enabled);
        assert_eq!(p.delay, Duration::from_secs(15));
        assert_eq!(p.max_attempts, 3);
        assert_eq!(p.namespace, "ns");
    }
}
