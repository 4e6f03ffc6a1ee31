//! Durable run-record store collaborator.

mod memory;
pub use memory::MemoryRunStore;

use runwarden_model::{RunId, RunPage, RunQuery, WorkflowId, WorkflowRun};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("run store unavailable: {0}")]
    Unavailable(String),
    #[error("run store rejected write: {0}")]
    Rejected(String),
}

/// Create/read/delete access to run records.
///
/// `put` inserts or replaces the record with the same id.
pub trait RunStore: Send + Sync + 'static {
    fn put(&self, run: WorkflowRun) -> Result<(), StoreError>;

    fn get(&self, id: &RunId) -> Result<Option<WorkflowRun>, StoreError>;

    /// Returns `true` if a record was removed.
    fn delete(&self, id: &RunId) -> Result<bool, StoreError>;

    fn list_by_workflow(&self, workflow: &WorkflowId) -> Result<Vec<WorkflowRun>, StoreError>;

    /// Records in a terminal state, any workflow.
    fn list_terminal(&self) -> Result<Vec<WorkflowRun>, StoreError>;

    /// Records in `Queued` or `Running`, any workflow.
    fn list_in_flight(&self) -> Result<Vec<WorkflowRun>, StoreError>;

    fn query(&self, q: &RunQuery) -> Result<RunPage<WorkflowRun>, StoreError>;
}
