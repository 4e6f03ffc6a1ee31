use std::{env, sync::Arc, time::SystemTime};

use anyhow::Context;
use async_trait::async_trait;
use axum::{Router, http::StatusCode, response::IntoResponse, routing::get};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use runwarden_api::{ControllerAdapter, HttpApi};
use runwarden_config::{ConfigDocument, ConfigHandle, ConfigStore};
use runwarden_core::{
    AlertSink, Bus, CleanupError, Controller, GcSweeper, LogAlertSink, MemoryRunStore, ResourceCleaner,
};
use runwarden_exec::{CommandCleaner, CommandConfig};
use runwarden_model::GcTask;
use runwarden_notify::{HttpAlertSink, NotifyConfig};
use runwarden_observe::{Journal, Subscribe};
use runwarden_prometheus::PrometheusMetrics;

const CONFIG_ENV: &str = "RUNWARDEN_CONFIG";
const LISTEN_ENV: &str = "RUNWARDEN_LISTEN";
const GC_COMMAND_ENV: &str = "RUNWARDEN_GC_COMMAND";

/// Cleaner used when no GC command is configured: logs and succeeds.
struct DryRunCleaner;

#[async_trait]
impl ResourceCleaner for DryRunCleaner {
    async fn cleanup(&self, task: &GcTask) -> Result<(), CleanupError> {
        info!(run = %task.run_id, namespace = %task.namespace, "dry-run cleanup");
        Ok(())
    }
}

fn cleaner() -> anyhow::Result<Arc<dyn ResourceCleaner>> {
    let Ok(command) = env::var(GC_COMMAND_ENV) else {
        warn!("{GC_COMMAND_ENV} not set; GC runs in dry-run mode");
        return Ok(Arc::new(DryRunCleaner));
    };
    let mut parts = command.split_whitespace();
    let program = parts.next().context("empty GC command")?;
    let cfg = CommandConfig::new(program).with_args(parts);
    Ok(Arc::new(CommandCleaner::new(cfg)?))
}

fn alert_sink(notify: Option<NotifyConfig>) -> anyhow::Result<Arc<dyn AlertSink>> {
    match notify {
        Some(cfg) => {
            let sink = HttpAlertSink::new(cfg)?;
            info!(endpoint = sink.endpoint(), "gc alerts go to notification endpoint");
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(LogAlertSink)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1) Config (installs the logger from its `logging` section)
    let path = env::args()
        .nth(1)
        .or_else(|| env::var(CONFIG_ENV).ok())
        .unwrap_or_else(|| "config.json".to_string());
    let doc = ConfigDocument::from_json_file(&path).with_context(|| format!("read {path}"))?;
    let snapshot = ConfigStore::new().load(&doc)?;
    let handle = ConfigHandle::new(Arc::clone(&snapshot));
    info!(%path, "config loaded");

    // 2) Event bus
    let metrics = PrometheusMetrics::new()?;
    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Journal::new()), Arc::new(metrics.clone())];
    let bus = Bus::new(subscribers);

    // 3) Controller + recovery
    let controller = Arc::new(Controller::new(
        Arc::clone(&snapshot),
        Arc::new(MemoryRunStore::new()),
        cleaner()?,
        alert_sink(NotifyConfig::from_snapshot(&snapshot))?,
        bus,
    ));
    let report = controller.recover(SystemTime::now())?;
    info!(
        running = report.running,
        queued = report.queued,
        promoted = report.promoted.len(),
        gc_rescheduled = report.gc_rescheduled,
        "state recovered"
    );
    for domain in runwarden_core::WorkerDomain::ALL {
        info!(domain = domain.as_str(), workers = controller.workers().size(domain), "worker pool sized");
    }

    // 4) GC sweeper
    let token = CancellationToken::new();
    let sweeper = GcSweeper::new(Arc::clone(controller.gc())).spawn(token.clone());

    // 5) HTTP
    let api = HttpApi::new(Arc::new(ControllerAdapter::new(Arc::clone(&controller)))).router();
    let metrics_route = {
        let controller = Arc::clone(&controller);
        get(move || async move {
            let stats = controller.admission_stats();
            metrics.observe_admission(stats.running, stats.queued);
            match metrics.encode_text() {
                Ok(body) => (StatusCode::OK, body).into_response(),
                Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
            }
        })
    };
    let app = Router::new().merge(api).route("/metrics", metrics_route);

    let addr = env::var(LISTEN_ENV).unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "http server listening");

    let server = {
        let token = token.clone();
        tokio::spawn(async move {
            let shutdown = async move { token.cancelled().await };
            if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
                error!(error = %e, "http server failed");
            }
        })
    };

    // 6) Reload on SIGHUP, stop on Ctrl+C
    wait_for_shutdown(&path, &handle).await?;
    info!("shutting down...");
    token.cancel();
    let _ = sweeper.await;
    let _ = server.await;

    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown(path: &str, handle: &ConfigHandle) -> anyhow::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = signal(SignalKind::hangup())?;
    loop {
        tokio::select! {
            res = tokio::signal::ctrl_c() => return Ok(res?),
            _ = hangup.recv() => reload(path, handle),
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown(_path: &str, _handle: &ConfigHandle) -> anyhow::Result<()> {
    Ok(tokio::signal::ctrl_c().await?)
}

/// New limits are picked up on the next restart; the reload only validates and publishes.
#[cfg_attr(not(unix), allow(dead_code))]
fn reload(path: &str, handle: &ConfigHandle) {
    let loaded = ConfigDocument::from_json_file(path).and_then(|doc| ConfigStore::without_logging().load(&doc));
    match loaded {
        Ok(next) => {
            let warnings = next.warnings().len();
            handle.swap(next);
            info!(%path, warnings, "config reloaded; restart to apply new limits");
        }
        Err(e) => warn!(%path, error = %e, "config reload failed; keeping current snapshot"),
    }
}
