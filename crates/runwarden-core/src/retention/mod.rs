//! Bounds the number of run records kept per workflow.

use std::sync::{Arc, Mutex};

use runwarden_config::ConfigSnapshot;
use runwarden_model::{Event, EventKind, RunId, WorkflowRun};
use tracing::debug;

use crate::bus::Bus;
use crate::error::CoreError;
use crate::gc::{Eviction, GarbageCollector};
use crate::store::RunStore;
use crate::sync::lock;

/// Evicts the oldest records of a workflow once it holds more than the limit.
///
/// Records already flagged `evicted` are waiting for their GC task and no
/// longer count. Passes are serialized so two concurrent persists of the
/// same workflow cannot both pick the same victims.
pub struct RetentionManager {
    limit: u64,
    store: Arc<dyn RunStore>,
    gc: Arc<GarbageCollector>,
    bus: Bus,
    pass: Mutex<()>,
}

impl RetentionManager {
    pub fn new(config: &ConfigSnapshot, store: Arc<dyn RunStore>, gc: Arc<GarbageCollector>, bus: Bus) -> Self {
        Self::with_limit(config.limits().max_workflow_runs, store, gc, bus)
    }

    /// A `limit` of zero keeps every record.
    pub fn with_limit(limit: u64, store: Arc<dyn RunStore>, gc: Arc<GarbageCollector>, bus: Bus) -> Self {
        Self {
            limit,
            store,
            gc,
            bus,
            pass: Mutex::new(()),
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Enforce the limit for the workflow of a run that was just written.
    ///
    /// Victims are the oldest by creation time, ties broken by lowest id.
    /// Returns the evicted ids, oldest first.
    pub fn on_run_persisted(&self, run: &WorkflowRun) -> Result<Vec<RunId>, CoreError> {
        if self.limit == 0 {
            return Ok(Vec::new());
        }
        let _pass = lock(&self.pass);

        let mut retained: Vec<WorkflowRun> = self
            .store
            .list_by_workflow(&run.workflow_id)?
            .into_iter()
            .filter(|r| !r.evicted)
            .collect();
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        if retained.len() <= limit {
            return Ok(Vec::new());
        }

        retained.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        let excess = retained.len() - limit;

        let mut evicted = Vec::with_capacity(excess);
        for victim in retained.into_iter().take(excess) {
            let kind = match self.gc.evict(&victim.id)? {
                Eviction::Deleted => EventKind::RetentionEvicted,
                Eviction::Deferred => EventKind::RetentionDeferred,
            };
            debug!(run = %victim.id, workflow = %victim.workflow_id, ?kind, "run record evicted");
            self.bus
                .publish(Event::for_run(kind, &victim.id, &victim.workflow_id));
            evicted.push(victim.id);
        }
        Ok(evicted)
    }
}
