//! Prometheus metrics for the workflow controller.
//!
//! [`PrometheusMetrics`] is a [`runwarden_observe::Subscribe`] implementation:
//! attach it to the controller's event bus and it counts admission, retention
//! and GC decisions.
//!
//! ## Metrics
//! - `runwarden_admission_total{outcome}` - Counter (`admitted`, `queued`, `rejected`, `promoted`, `cancelled`)
//! - `runwarden_runs_completed_total` - Counter
//! - `runwarden_runs_running` / `runwarden_runs_queued` - Gauge, set through [`PrometheusMetrics::observe_admission`]
//! - `runwarden_retention_evictions_total{mode}` - Counter (`deleted`, `deferred`)
//! - `runwarden_gc_attempts_total{outcome}` - Counter (`done`, `failed`)
//! - `runwarden_gc_tasks_total{event}` - Counter (`scheduled`, `retried`, `permanently_failed`, `recovered`)
//! - `runwarden_config_warnings_total` - Counter
//!
//! ## HTTP Server
//! This crate does NOT serve `/metrics`; call [`PrometheusMetrics::encode_text`]
//! from the application's HTTP framework:
//!
//! ```rust,ignore
//! async fn metrics_handler(State(metrics): State<Arc<PrometheusMetrics>>) -> Response {
//!     match metrics.encode_text() {
//!         Ok(body) => ([(CONTENT_TYPE, TEXT_FORMAT)], body).into_response(),
//!         Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
//!     }
//! }
//! ```

mod backend;
pub use backend::{MetricsError, PrometheusMetrics, TEXT_FORMAT};

pub use prometheus::{Encoder, Registry, TextEncoder};
