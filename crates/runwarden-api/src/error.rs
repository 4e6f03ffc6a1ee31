use runwarden_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("run not found: {0}")]
    RunNotFound(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) => 400,
            ApiError::RunNotFound(_) => 404,
            ApiError::Internal(_) => 500,
            ApiError::Core(e) => match e {
                CoreError::UnknownRun(_) | CoreError::NoFailedGc(_) => 404,
                CoreError::DuplicateRun(_) | CoreError::InvalidTransition(_) => 409,
                CoreError::NotTerminal(_) => 400,
                CoreError::Store(_) | CoreError::PoolClosed(_) | CoreError::PoolFull(_) => 503,
            },
        }
    }
}

#[cfg(feature = "http")]
impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = axum::http::StatusCode::from_u16(self.status_code())
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runwarden_model::{RunId, RunState, TransitionError};

    #[test]
    fn core_errors_map_to_statuses() {
        let cases = [
            (ApiError::Core(CoreError::UnknownRun(RunId::from("r"))), 404),
            (ApiError::Core(CoreError::DuplicateRun(RunId::from("r"))), 409),
            (
                ApiError::Core(CoreError::InvalidTransition(TransitionError {
                    from: RunState::Completed,
                    to: RunState::Failed,
                })),
                409,
            ),
            (ApiError::Core(CoreError::NotTerminal(RunState::Running)), 400),
            (ApiError::Core(CoreError::PoolFull("pod")), 503),
            (ApiError::InvalidRequest("x".into()), 400),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{err}");
        }
    }
}
