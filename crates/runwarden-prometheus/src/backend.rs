use async_trait::async_trait;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use runwarden_model::{Event, EventKind};
use runwarden_observe::Subscribe;
use thiserror::Error;

/// Content type of [`PrometheusMetrics::encode_text`] output.
pub const TEXT_FORMAT: &str = prometheus::TEXT_FORMAT;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to register metric: {0}")]
    Registration(#[from] prometheus::Error),
    #[error("failed to encode metrics: {0}")]
    Encoding(String),
}

#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    admission_total: IntCounterVec,
    runs_completed_total: IntCounter,
    runs_running: IntGauge,
    runs_queued: IntGauge,
    retention_evictions_total: IntCounterVec,
    gc_attempts_total: IntCounterVec,
    gc_tasks_total: IntCounterVec,
    config_warnings_total: IntCounter,
}

impl PrometheusMetrics {
    /// Metrics registered in a fresh registry.
    pub fn new() -> Result<Self, MetricsError> {
        Self::with_registry(Registry::new())
    }

    pub fn with_registry(registry: Registry) -> Result<Self, MetricsError> {
        let admission_total = IntCounterVec::new(
            Opts::new("runwarden_admission_total", "Admission decisions by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(admission_total.clone()))?;

        let runs_completed_total = IntCounter::new(
            "runwarden_runs_completed_total",
            "Runs that released their running slot",
        )?;
        registry.register(Box::new(runs_completed_total.clone()))?;

        let runs_running = IntGauge::new("runwarden_runs_running", "Runs currently running")?;
        registry.register(Box::new(runs_running.clone()))?;

        let runs_queued = IntGauge::new("runwarden_runs_queued", "Runs waiting for admission")?;
        registry.register(Box::new(runs_queued.clone()))?;

        let retention_evictions_total = IntCounterVec::new(
            Opts::new("runwarden_retention_evictions_total", "Run records evicted by retention"),
            &["mode"],
        )?;
        registry.register(Box::new(retention_evictions_total.clone()))?;

        let gc_attempts_total = IntCounterVec::new(
            Opts::new("runwarden_gc_attempts_total", "GC cleanup attempts by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(gc_attempts_total.clone()))?;

        let gc_tasks_total = IntCounterVec::new(
            Opts::new("runwarden_gc_tasks_total", "GC task lifecycle events"),
            &["event"],
        )?;
        registry.register(Box::new(gc_tasks_total.clone()))?;

        let config_warnings_total = IntCounter::new(
            "runwarden_config_warnings_total",
            "Soft validation findings of the loaded policy",
        )?;
        registry.register(Box::new(config_warnings_total.clone()))?;

        Ok(Self {
            registry,
            admission_total,
            runs_completed_total,
            runs_running,
            runs_queued,
            retention_evictions_total,
            gc_attempts_total,
            gc_tasks_total,
            config_warnings_total,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Set the running/queued gauges from an admission snapshot.
    pub fn observe_admission(&self, running: usize, queued: usize) {
        self.runs_running.set(running as i64);
        self.runs_queued.set(queued as i64);
    }

    pub fn record(&self, event: &Event) {
        match event.kind {
            EventKind::RunAdmitted => self.admission("admitted"),
            EventKind::RunQueued => self.admission("queued"),
            EventKind::RunRejected => self.admission("rejected"),
            EventKind::RunPromoted => self.admission("promoted"),
            EventKind::QueuedRunCancelled => self.admission("cancelled"),
            EventKind::RunCompleted => self.runs_completed_total.inc(),

            EventKind::RetentionEvicted => self.retention_evictions_total.with_label_values(&["deleted"]).inc(),
            EventKind::RetentionDeferred => self.retention_evictions_total.with_label_values(&["deferred"]).inc(),

            EventKind::GcDone => self.gc_attempts_total.with_label_values(&["done"]).inc(),
            EventKind::GcAttemptFailed => self.gc_attempts_total.with_label_values(&["failed"]).inc(),
            EventKind::GcScheduled => self.gc_task("scheduled"),
            EventKind::GcRetryScheduled => self.gc_task("retried"),
            EventKind::GcPermanentlyFailed => self.gc_task("permanently_failed"),
            EventKind::GcRecovered => self.gc_task("recovered"),

            EventKind::ConfigWarning => self.config_warnings_total.inc(),
            EventKind::WorkersDefaulted => {}
        }
    }

    pub fn gather(&self) -> Vec<prometheus::proto::MetricFamily> {
        self.registry.gather()
    }

    /// Text exposition of every registered metric.
    pub fn encode_text(&self) -> Result<String, MetricsError> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&self.gather(), &mut buf)
            .map_err(|e| MetricsError::Encoding(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| MetricsError::Encoding(e.to_string()))
    }

    fn admission(&self, outcome: &str) {
        self.admission_total.with_label_values(&[outcome]).inc();
    }

    fn gc_task(&self, event: &str) {
        self.gc_tasks_total.with_label_values(&[event]).inc();
    }
}

#[async_trait]
impl Subscribe for PrometheusMetrics {
    async fn on_event(&self, event: &Event) {
        self.record(event);
    }

    fn name(&self) -> &'static str {
        "prometheus"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_admission_outcomes() {
        let m = PrometheusMetrics::new().unwrap();
        m.record(&Event::new(EventKind::RunAdmitted));
        m.record(&Event::new(EventKind::RunAdmitted));
        m.record(&Event::new(EventKind::RunRejected));

        assert_eq!(m.admission_total.with_label_values(&["admitted"]).get(), 2);
        assert_eq!(m.admission_total.with_label_values(&["rejected"]).get(), 1);
        assert_eq!(m.admission_total.with_label_values(&["queued"]).get(), 0);
    }

    #[tokio::test]
    async fn subscriber_counts_gc_outcomes() {
        let m = PrometheusMetrics::new().unwrap();
        m.on_event(&Event::new(EventKind::GcAttemptFailed)).await;
        m.on_event(&Event::new(EventKind::GcRetryScheduled)).await;
        m.on_event(&Event::new(EventKind::GcDone)).await;

        assert_eq!(m.gc_attempts_total.with_label_values(&["failed"]).get(), 1);
        assert_eq!(m.gc_attempts_total.with_label_values(&["done"]).get(), 1);
        assert_eq!(m.gc_tasks_total.with_label_values(&["retried"]).get(), 1);
    }

    #[test]
    fn text_exposition_contains_gauges() {
        let m = PrometheusMetrics::new().unwrap();
        m.observe_admission(3, 7);
        m.record(&Event::new(EventKind::RetentionDeferred));

        let text = m.encode_text().unwrap();
        assert!(text.contains("runwarden_runs_running 3"));
        assert!(text.contains("runwarden_runs_queued 7"));
        assert!(text.contains("runwarden_retention_evictions_total{mode=\"deferred\"} 1"));
    }

    #[test]
    fn duplicate_registration_fails() {
        let registry = Registry::new();
        PrometheusMetrics::with_registry(registry.clone()).unwrap();
        assert!(matches!(
            PrometheusMetrics::with_registry(registry),
            Err(MetricsError::Registration(_))
        ));
    }
}
