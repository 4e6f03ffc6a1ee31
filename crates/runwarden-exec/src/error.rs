use std::time::Duration;

use runwarden_core::CleanupError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("missing program")]
    MissingProgram,
    #[error("spawn failed: {0}")]
    Spawn(String),
    #[error("non-zero exit code: {code}{}", .stderr.as_deref().map(|s| format!(" ({s})")).unwrap_or_default())]
    NonZeroExit { code: i32, stderr: Option<String> },
    #[error("killed by signal")]
    KilledBySignal,
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("io error: {0}")]
    Io(String),
}

pub type ExecResult<T> = Result<T, ExecError>;

impl From<std::io::Error> for ExecError {
    fn from(e: std::io::Error) -> Self {
        ExecError::Io(e.to_string())
    }
}

impl From<ExecError> for CleanupError {
    fn from(e: ExecError) -> Self {
        match e {
            ExecError::MissingProgram | ExecError::Spawn(_) => CleanupError::Spawn(e.to_string()),
            ExecError::Timeout(after) => CleanupError::Timeout(after),
            other => CleanupError::Failed(other.to_string()),
        }
    }
}
