use runwarden_model::{RunId, RunState, TransitionError};
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("run store error: {0}")]
    Store(#[from] StoreError),

    #[error("run not found: {0}")]
    UnknownRun(RunId),

    #[error("run already exists: {0}")]
    DuplicateRun(RunId),

    #[error("state '{}' is not terminal", .0.as_str())]
    NotTerminal(RunState),

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    #[error("no permanently failed gc task for run: {0}")]
    NoFailedGc(RunId),

    #[error("worker pool '{0}' is closed")]
    PoolClosed(&'static str),

    #[error("worker pool '{0}' is full")]
    PoolFull(&'static str),
}
