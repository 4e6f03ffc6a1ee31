mod ids;
pub use ids::{RunId, WorkflowId};

mod run_state;
pub use run_state::{RunState, TransitionError};

mod workflow_run;
pub use workflow_run::WorkflowRun;

mod run_query;
pub use run_query::{RunPage, RunQuery};

mod parallelism;
pub use parallelism::{ParallelismConfig, ParallelismConstraint};

mod gc_task;
pub use gc_task::{GcState, GcTask};

mod event;
pub use event::{Event, EventKind};

/// Namespace in the execution cluster where a run's resources live.
pub type Namespace = String;

/// Delay value in milliseconds.
///
/// Used in events that announce a future action (GC retry, scheduled cleanup).
pub type DelayMs = u64;
