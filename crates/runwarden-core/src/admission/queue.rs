use std::collections::{HashMap, VecDeque};

use runwarden_model::{RunId, WorkflowId, WorkflowRun};

type Seq = u64;

/// Waiting runs, stored once and indexed twice.
///
/// The arena owns each queued run; the global queue and the per-workflow
/// queues hold only its sequence number. Both views are updated together on
/// every push and removal, so they cannot disagree.
#[derive(Default)]
pub(super) struct WaitQueue {
    next_seq: Seq,
    arena: HashMap<Seq, WorkflowRun>,
    by_run: HashMap<RunId, Seq>,
    global: VecDeque<Seq>,
    per_workflow: HashMap<WorkflowId, VecDeque<Seq>>,
}

impl WaitQueue {
    pub(super) fn push(&mut self, run: WorkflowRun) {
        let seq = self.next_seq;
        self.next_seq += 1;

        self.by_run.insert(run.id.clone(), seq);
        self.global.push_back(seq);
        self.per_workflow
            .entry(run.workflow_id.clone())
            .or_default()
            .push_back(seq);
        self.arena.insert(seq, run);
    }

    pub(super) fn contains(&self, id: &RunId) -> bool {
        self.by_run.contains_key(id)
    }

    pub(super) fn len(&self) -> usize {
        self.global.len()
    }

    pub(super) fn len_for(&self, workflow: &WorkflowId) -> usize {
        self.per_workflow.get(workflow).map_or(0, VecDeque::len)
    }

    /// Removes a run from the arena and from both queues.
    pub(super) fn remove(&mut self, id: &RunId) -> Option<WorkflowRun> {
        let seq = self.by_run.remove(id)?;
        self.unlink(seq)
    }

    /// First run in global order accepted by `admissible`.
    ///
    /// Only per-workflow heads are offered: once a workflow is refused, its
    /// later entries are skipped so workflow FIFO order holds.
    pub(super) fn take_first<F>(&mut self, mut admissible: F) -> Option<WorkflowRun>
    where
        F: FnMut(&WorkflowId) -> bool,
    {
        let mut refused: Vec<&WorkflowId> = Vec::new();
        let mut picked = None;
        for seq in &self.global {
            let Some(run) = self.arena.get(seq) else {
                continue;
            };
            if refused.contains(&&run.workflow_id) {
                continue;
            }
            if admissible(&run.workflow_id) {
                picked = Some(*seq);
                break;
            }
            refused.push(&run.workflow_id);
        }

        let seq = picked?;
        let run = self.unlink(seq)?;
        self.by_run.remove(&run.id);
        Some(run)
    }

    pub(super) fn iter(&self) -> impl Iterator<Item = &WorkflowRun> {
        self.global.iter().filter_map(|seq| self.arena.get(seq))
    }

    fn unlink(&mut self, seq: Seq) -> Option<WorkflowRun> {
        let run = self.arena.remove(&seq)?;
        self.global.retain(|s| *s != seq);
        if let Some(queue) = self.per_workflow.get_mut(&run.workflow_id) {
            queue.retain(|s| *s != seq);
            if queue.is_empty() {
                self.per_workflow.remove(&run.workflow_id);
            }
        }
        Some(run)
    }
}
