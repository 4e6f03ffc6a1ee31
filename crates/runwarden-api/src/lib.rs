mod error;
pub use error::ApiError;

mod types;
pub use types::{
    CancelRunResponse, CompleteRunRequest, CompleteRunResponse, GcTasksResponse, ListRunsResponse,
    SubmitRunRequest, SubmitRunResponse,
};

mod handler;
pub use handler::ApiHandler;

mod adapter;
pub use adapter::ControllerAdapter;

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpApi;

#[cfg(feature = "http")]
pub use axum;
