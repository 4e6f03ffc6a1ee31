use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("http request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("notification endpoint rejected alert: {status}: {body}")]
    Rejected { status: u16, body: String },
}
