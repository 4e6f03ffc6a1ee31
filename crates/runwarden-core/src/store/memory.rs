use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use runwarden_model::{RunId, RunPage, RunQuery, RunState, WorkflowId, WorkflowRun};

use super::{RunStore, StoreError};

/// In-memory run store.
#[derive(Clone, Default)]
pub struct MemoryRunStore {
    inner: Arc<RwLock<MemoryRunStoreInner>>,
}

#[derive(Default)]
struct MemoryRunStoreInner {
    /// Runs indexed by RunId.
    runs: HashMap<RunId, WorkflowRun>,
    /// Index: workflow -> run ids in insertion order.
    by_workflow: HashMap<WorkflowId, Vec<RunId>>,
}

impl MemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, MemoryRunStoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, MemoryRunStoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RunStore for MemoryRunStore {
    fn put(&self, run: WorkflowRun) -> Result<(), StoreError> {
        let mut inner = self.write();

        if let Some(prev) = inner.runs.get(&run.id)
            && prev.workflow_id != run.workflow_id
        {
            return Err(StoreError::Rejected(format!(
                "run {} cannot move from workflow {} to {}",
                run.id, prev.workflow_id, run.workflow_id
            )));
        }

        let id = run.id.clone();
        let workflow = run.workflow_id.clone();
        if inner.runs.insert(id.clone(), run).is_none() {
            inner.by_workflow.entry(workflow).or_default().push(id);
        }
        Ok(())
    }

    fn get(&self, id: &RunId) -> Result<Option<WorkflowRun>, StoreError> {
        Ok(self.read().runs.get(id).cloned())
    }

    fn delete(&self, id: &RunId) -> Result<bool, StoreError> {
        let mut inner = self.write();

        let Some(run) = inner.runs.remove(id) else {
            return Ok(false);
        };
        if let Some(ids) = inner.by_workflow.get_mut(&run.workflow_id) {
            ids.retain(|run_id| run_id != id);
            if ids.is_empty() {
                inner.by_workflow.remove(&run.workflow_id);
            }
        }
        Ok(true)
    }

    fn list_by_workflow(&self, workflow: &WorkflowId) -> Result<Vec<WorkflowRun>, StoreError> {
        let inner = self.read();

        Ok(inner
            .by_workflow
            .get(workflow)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.runs.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_terminal(&self) -> Result<Vec<WorkflowRun>, StoreError> {
        let inner = self.read();
        Ok(inner
            .runs
            .values()
            .filter(|run| run.is_terminal())
            .cloned()
            .collect())
    }

    fn list_in_flight(&self) -> Result<Vec<WorkflowRun>, StoreError> {
        let inner = self.read();
        Ok(inner
            .runs
            .values()
            .filter(|run| matches!(run.state, RunState::Queued | RunState::Running))
            .cloned()
            .collect())
    }

    /// Filters are applied inside a single read lock.
    /// When `workflow` is specified, uses the `by_workflow` index to narrow the scan.
    /// `total` reflects the count *after* filtering, *before* pagination.
    fn query(&self, q: &RunQuery) -> Result<RunPage<WorkflowRun>, StoreError> {
        let inner = self.read();

        let iter: Box<dyn Iterator<Item = &WorkflowRun>> = match &q.workflow {
            Some(workflow) => match inner.by_workflow.get(workflow) {
                Some(ids) => Box::new(ids.iter().filter_map(|id| inner.runs.get(id))),
                None => {
                    return Ok(RunPage {
                        items: vec![],
                        total: 0,
                    });
                }
            },
            None => Box::new(inner.runs.values()),
        };

        let iter: Box<dyn Iterator<Item = &WorkflowRun>> = match q.state {
            Some(state) => Box::new(iter.filter(move |run| run.state == state)),
            None => iter,
        };

        // Oldest first, so pages are stable across calls.
        let mut filtered: Vec<&WorkflowRun> = iter.collect();
        filtered.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        let total = filtered.len();

        let items = filtered
            .into_iter()
            .skip(q.offset)
            .take(q.limit)
            .cloned()
            .collect();

        Ok(RunPage { items, total })
    }
}
