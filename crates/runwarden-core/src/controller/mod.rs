//! Entry points for external reconcilers.
//!
//! Every call runs the same sequence: persist, decide, persist the outcome,
//! then enforce retention for the touched workflow.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::SystemTime;

use runwarden_config::ConfigSnapshot;
use runwarden_model::{
    Event, EventKind, GcTask, RunId, RunPage, RunQuery, RunState, WorkflowRun,
};
use tracing::{debug, info, instrument, warn};

use crate::admission::{AdmissionController, AdmissionResult, AdmissionStats, CancelOutcome};
use crate::alert::AlertSink;
use crate::bus::Bus;
use crate::cleaner::ResourceCleaner;
use crate::error::CoreError;
use crate::gc::{GarbageCollector, GcPolicy};
use crate::retention::RetentionManager;
use crate::store::RunStore;
use crate::workers::WorkerPoolManager;

/// Result of [`Controller::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub result: AdmissionResult,
    /// The run as persisted after the decision.
    pub run: WorkflowRun,
    pub evicted: Vec<RunId>,
}

/// Result of [`Controller::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub run: WorkflowRun,
    /// Waiting runs that took the freed slots.
    pub promoted: Vec<WorkflowRun>,
    pub gc: Option<GcTask>,
    pub evicted: Vec<RunId>,
}

/// Result of [`Controller::recover`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    pub running: usize,
    pub queued: usize,
    pub promoted: Vec<WorkflowRun>,
    pub gc_rescheduled: usize,
}

pub struct Controller {
    config: Arc<ConfigSnapshot>,
    store: Arc<dyn RunStore>,
    admission: AdmissionController,
    retention: RetentionManager,
    gc: Arc<GarbageCollector>,
    workers: WorkerPoolManager,
    bus: Bus,
}

impl Controller {
    /// Build every component from one snapshot.
    ///
    /// Validation warnings and defaulted worker pools are published once here.
    pub fn new(
        config: Arc<ConfigSnapshot>,
        store: Arc<dyn RunStore>,
        cleaner: Arc<dyn ResourceCleaner>,
        alerts: Arc<dyn AlertSink>,
        bus: Bus,
    ) -> Self {
        let gc = Arc::new(GarbageCollector::new(
            GcPolicy::from_snapshot(&config),
            Arc::clone(&store),
            cleaner,
            alerts,
            bus.clone(),
        ));
        let retention = RetentionManager::new(&config, Arc::clone(&store), Arc::clone(&gc), bus.clone());
        let admission = AdmissionController::new(&config, bus.clone());
        let workers = WorkerPoolManager::new(&config);

        for warning in config.warnings() {
            bus.publish(Event::new(EventKind::ConfigWarning).with_reason(warning.to_string()));
        }
        for domain in &config.validation().defaulted_workers {
            bus.publish(Event::new(EventKind::WorkersDefaulted).with_reason(domain.as_str()));
        }

        info!(
            gc_enabled = gc.policy().enabled,
            retention_limit = retention.limit(),
            "controller ready"
        );
        Self {
            config,
            store,
            admission,
            retention,
            gc,
            workers,
            bus,
        }
    }

    /// Record a new run and ask for admission.
    ///
    /// A rejected run stays persisted as `Pending`; the requester decides
    /// whether to retry or fail it.
    #[instrument(level = "debug", skip(self, run), fields(run = %run.id, workflow = %run.workflow_id))]
    pub fn submit(&self, mut run: WorkflowRun, now: SystemTime) -> Result<Submission, CoreError> {
        if self.store.get(&run.id)?.is_some() {
            return Err(CoreError::DuplicateRun(run.id));
        }
        self.store.put(run.clone())?;

        let result = self.admission.request_admission(&mut run, now);
        if run.state != RunState::Pending {
            self.store.put(run.clone())?;
        }
        let evicted = self.retain(&run)?;

        Ok(Submission {
            result,
            run,
            evicted,
        })
    }

    /// Move a run to a terminal state, free its slot and schedule its GC.
    ///
    /// A queued run can only be cancelled this way. A run whose record was
    /// already evicted still frees its slot, then reports `UnknownRun`.
    #[instrument(level = "debug", skip(self), fields(run = %id))]
    pub fn complete(&self, id: &RunId, state: RunState, now: SystemTime) -> Result<Completion, CoreError> {
        if !state.is_terminal() {
            return Err(CoreError::NotTerminal(state));
        }
        let Some(mut run) = self.store.get(id)? else {
            let promoted = self.admission.release(id, now);
            self.persist_promoted(promoted, now);
            return Err(CoreError::UnknownRun(id.clone()));
        };

        if run.state == RunState::Queued && state == RunState::Cancelled {
            return match self.cancel_queued(id, now)? {
                CancelOutcome::Cancelled(run) => Ok(Completion {
                    gc: self.gc.get(&run.id),
                    run,
                    promoted: Vec::new(),
                    evicted: Vec::new(),
                }),
                CancelOutcome::NotFoundOrAlreadyStarted => Err(CoreError::UnknownRun(id.clone())),
            };
        }

        let was_running = run.state == RunState::Running;
        run.transition(state, now)?;
        self.store.put(run.clone())?;

        let promoted = if was_running {
            self.persist_promoted(self.admission.notify_completion(&run, now), now)
        } else {
            Vec::new()
        };

        let gc = self.gc.schedule(&run, now)?;
        let mut evicted = self.retain(&run)?;
        for p in &promoted {
            if p.workflow_id != run.workflow_id {
                evicted.extend(self.retain(p)?);
            }
        }

        debug!(state = state.as_str(), promoted = promoted.len(), "run completed");
        let run = self.store.get(id)?.unwrap_or(run);
        Ok(Completion {
            run,
            promoted,
            gc,
            evicted,
        })
    }

    /// Withdraw a queued run and mark it `Cancelled`.
    #[instrument(level = "debug", skip(self), fields(run = %id))]
    pub fn cancel_queued(&self, id: &RunId, now: SystemTime) -> Result<CancelOutcome, CoreError> {
        let outcome = self.admission.cancel_queued(id, now);
        if let CancelOutcome::Cancelled(run) = &outcome {
            self.store.put(run.clone())?;
            self.gc.schedule(run, now)?;
            self.retain(run)?;
        }
        Ok(outcome)
    }

    /// Rebuild in-memory state from the run store after a restart.
    ///
    /// `Running` and `Queued` records are adopted by admission in creation
    /// order, free slots are filled, and unreclaimed terminal runs get their
    /// GC tasks back.
    pub fn recover(&self, now: SystemTime) -> Result<RecoveryReport, CoreError> {
        let mut in_flight = self.store.list_in_flight()?;
        in_flight.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));

        let mut report = RecoveryReport::default();
        for run in &in_flight {
            if self.admission.adopt(run) {
                match run.state {
                    RunState::Running => report.running += 1,
                    RunState::Queued => report.queued += 1,
                    _ => {}
                }
            }
        }

        report.promoted = self.persist_promoted(self.admission.promote(now), now);
        report.gc_rescheduled = self.gc.recover(now)?.len();

        info!(
            running = report.running,
            queued = report.queued,
            promoted = report.promoted.len(),
            gc_rescheduled = report.gc_rescheduled,
            "controller state recovered"
        );
        Ok(report)
    }

    pub fn get(&self, id: &RunId) -> Result<Option<WorkflowRun>, CoreError> {
        Ok(self.store.get(id)?)
    }

    pub fn query(&self, q: &RunQuery) -> Result<RunPage<WorkflowRun>, CoreError> {
        Ok(self.store.query(q)?)
    }

    pub fn gc_due(&self, now: SystemTime) -> Vec<GcTask> {
        self.gc.due(now)
    }

    pub fn gc_failed(&self) -> Vec<GcTask> {
        self.gc.failed()
    }

    pub fn gc_retry(&self, id: &RunId, now: SystemTime) -> Result<GcTask, CoreError> {
        self.gc.retry_failed(id, now)
    }

    pub fn admission_stats(&self) -> AdmissionStats {
        self.admission.stats()
    }

    pub fn config(&self) -> &Arc<ConfigSnapshot> {
        &self.config
    }

    pub fn admission(&self) -> &AdmissionController {
        &self.admission
    }

    pub fn gc(&self) -> &Arc<GarbageCollector> {
        &self.gc
    }

    pub fn workers(&self) -> &WorkerPoolManager {
        &self.workers
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Run retention for `run`'s workflow and withdraw evicted runs still
    /// waiting for admission, so a deleted record is never promoted.
    fn retain(&self, run: &WorkflowRun) -> Result<Vec<RunId>, CoreError> {
        let evicted = self.retention.on_run_persisted(run)?;
        for id in &evicted {
            self.admission.withdraw(id);
        }
        Ok(evicted)
    }

    /// Persist promoted runs and return the ones that started.
    ///
    /// A promoted run whose record is gone gives its slot back at once; the
    /// runs promoted in its place are handled the same way.
    fn persist_promoted(&self, promoted: Vec<WorkflowRun>, now: SystemTime) -> Vec<WorkflowRun> {
        let mut pending: VecDeque<WorkflowRun> = promoted.into();
        let mut started = Vec::with_capacity(pending.len());
        while let Some(run) = pending.pop_front() {
            match self.store.get(&run.id) {
                Ok(None) => {
                    warn!(run = %run.id, "promoted run has no record; slot released");
                    pending.extend(self.admission.release(&run.id, now));
                    continue;
                }
                Ok(Some(_)) => {
                    if let Err(e) = self.store.put(run.clone()) {
                        warn!(run = %run.id, error = %e, "promoted run not persisted");
                    }
                }
                Err(e) => warn!(run = %run.id, error = %e, "promoted run not persisted"),
            }
            started.push(run);
        }
        started
    }
}
