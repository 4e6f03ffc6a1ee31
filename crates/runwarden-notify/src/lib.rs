//! Operator alerts over HTTP.
//!
//! [`HttpAlertSink`] posts every GC alert as JSON to the configured
//! `notification_url`.

mod config;
pub use config::{NotifyConfig, source_id};

mod errors;
pub use errors::NotifyError;

mod sink;
pub use sink::{AlertPayload, HttpAlertSink};
