//! Admission control and retention for workflow runs.
//!
//! - [`AdmissionController`]: global and per-workflow concurrency limits with bounded FIFO queues.
//! - [`RetentionManager`]: keeps at most `max_workflowruns` records per workflow.
//! - [`GarbageCollector`]: delayed, retry-bounded cleanup of terminated runs' resources.
//! - [`WorkerPoolManager`]: sizes the worker pools of the external reconcile domains.
//! - [`Controller`]: wires the above together for external reconcilers.

mod sync;

pub mod error;
pub use error::CoreError;

pub mod bus;
pub use bus::Bus;

pub mod store;
pub use store::{MemoryRunStore, RunStore, StoreError};

pub mod cleaner;
pub use cleaner::{CleanupError, ResourceCleaner};

pub mod alert;
pub use alert::{Alert, AlertError, AlertSink, LogAlertSink};

pub mod admission;
pub use admission::{AdmissionController, AdmissionResult, AdmissionStats, CancelOutcome, RejectReason};

pub mod retention;
pub use retention::RetentionManager;

pub mod gc;
pub use gc::{Backoff, Eviction, GarbageCollector, GcPolicy, GcSweeper, SweepReport};

pub mod workers;
pub use workers::{EventHandler, WorkerPool, WorkerPoolManager};

pub mod controller;
pub use controller::{Completion, Controller, RecoveryReport, Submission};

pub use runwarden_config::WorkerDomain;
