use serde::{Deserialize, Serialize};

/// A (max-concurrent, max-queued) pair bounding either global or per-workflow concurrency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParallelismConstraint {
    /// Maximum number of runs in `Running` within the scope.
    #[serde(default)]
    pub max_parallel: u64,
    /// Maximum number of runs waiting in the scope's queue.
    #[serde(default)]
    pub max_queue_size: u64,
}

impl ParallelismConstraint {
    pub const fn new(max_parallel: u64, max_queue_size: u64) -> Self {
        Self {
            max_parallel,
            max_queue_size,
        }
    }

    /// A constraint that never blocks nor queues.
    pub const fn unbounded() -> Self {
        Self::new(u64::MAX, u64::MAX)
    }

    #[inline]
    pub fn has_slot(&self, running: usize) -> bool {
        (running as u64) < self.max_parallel
    }

    #[inline]
    pub fn has_queue_room(&self, queued: usize) -> bool {
        (queued as u64) < self.max_queue_size
    }
}

/// Global and per-workflow limits.
///
/// When the maximum parallelism is reached, new runs wait in a queue.
/// When the queue is full as well, new runs are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParallelismConfig {
    /// Limits applied across all workflows.
    #[serde(default)]
    pub overall: ParallelismConstraint,
    /// Limits applied independently to each workflow.
    #[serde(default)]
    pub single_workflow: ParallelismConstraint,
}

impl ParallelismConfig {
    pub const fn unbounded() -> Self {
        Self {
            overall: ParallelismConstraint::unbounded(),
            single_workflow: ParallelismConstraint::unbounded(),
        }
    }
}
