use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use runwarden_model::{RunId, RunQuery, RunState};
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::ApiError,
    handler::ApiHandler,
    types::{CompleteRunRequest, GcTasksResponse, ListRunsResponse, SubmitRunRequest},
};

/// HTTP API service builder.
pub struct HttpApi<H> {
    handler: Arc<H>,
}

impl<H> HttpApi<H>
where
    H: ApiHandler,
{
    /// Create new HTTP API with the given handler.
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    /// Build axum router with mounted endpoints.
    ///
    /// Routes:
    /// - POST /api/v1/runs - Submit run
    /// - GET /api/v1/runs - List runs (filter by query params)
    /// - GET /api/v1/runs/{id} - Get run record
    /// - POST /api/v1/runs/{id}/complete - Move run to a terminal state
    /// - POST /api/v1/runs/{id}/cancel - Withdraw a queued run
    /// - GET /api/v1/gc/due - GC tasks whose time has come
    /// - GET /api/v1/gc/failed - Permanently failed GC tasks
    /// - POST /api/v1/gc/{id}/retry - Re-enable a failed GC task
    /// - GET /api/v1/admission - Running and queued counters
    /// - GET /api/v1/config - Active configuration snapshot
    pub fn router(self) -> Router {
        Router::new()
            .route("/api/v1/runs", post(submit_run::<H>).get(list_runs::<H>))
            .route("/api/v1/runs/{id}", get(get_run::<H>))
            .route("/api/v1/runs/{id}/complete", post(complete_run::<H>))
            .route("/api/v1/runs/{id}/cancel", post(cancel_run::<H>))
            .route("/api/v1/gc/due", get(gc_due::<H>))
            .route("/api/v1/gc/failed", get(gc_failed::<H>))
            .route("/api/v1/gc/{id}/retry", post(gc_retry::<H>))
            .route("/api/v1/admission", get(admission_stats::<H>))
            .route("/api/v1/config", get(config::<H>))
            .with_state(self.handler)
    }
}

#[derive(Debug, Deserialize)]
struct ListRunsParams {
    /// Filter by workflow
    workflow: Option<String>,
    /// Filter by run state
    state: Option<String>,
    /// Max items per page (default 100, max 1000)
    limit: Option<usize>,
    /// Offset for pagination (default 0)
    offset: Option<usize>,
}

/// POST /api/v1/runs
///
/// `201` when admitted, `202` when queued, `429` when rejected.
async fn submit_run<H>(
    State(handler): State<Arc<H>>,
    Json(req): Json<SubmitRunRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    debug!(workflow = %req.workflow_id, "submitting run");
    let response = handler.submit_run(req).await?;

    let status = match response.result.as_str() {
        "admitted" => StatusCode::CREATED,
        "queued" => StatusCode::ACCEPTED,
        _ => StatusCode::TOO_MANY_REQUESTS,
    };
    Ok((status, Json(response)))
}

/// GET /api/v1/runs/{id}
async fn get_run<H>(State(handler): State<Arc<H>>, Path(id): Path<String>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let run_id = parse_id(id)?;
    debug!(%run_id, "getting run");
    match handler.get_run(&run_id).await? {
        Some(run) => Ok(Json(run)),
        None => Err(ApiError::RunNotFound(run_id.to_string())),
    }
}

/// GET /api/v1/runs
///
/// Query params (all optional, combinable):
/// - ?workflow=name  - filter by workflow
/// - ?state=running  - filter by state
/// - ?limit=50       - max items per page (default 100, max 1000)
/// - ?offset=0       - pagination offset (default 0)
async fn list_runs<H>(
    State(handler): State<Arc<H>>,
    Query(params): Query<ListRunsParams>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let mut query = RunQuery::new();

    if let Some(workflow) = params.workflow {
        if workflow.trim().is_empty() {
            return Err(ApiError::InvalidRequest("workflow cannot be empty".into()));
        }
        query = query.with_workflow(workflow);
    }
    if let Some(state) = params.state {
        query = query.with_state(parse_state(&state)?);
    }
    if let Some(limit) = params.limit {
        query = query.with_limit(limit);
    }
    if let Some(offset) = params.offset {
        query = query.with_offset(offset);
    }

    let page = handler.query_runs(query).await?;
    debug!(count = page.items.len(), total = page.total, "runs listed");

    Ok(Json(ListRunsResponse {
        runs: page.items,
        total: page.total,
    }))
}

/// POST /api/v1/runs/{id}/complete
async fn complete_run<H>(
    State(handler): State<Arc<H>>,
    Path(id): Path<String>,
    Json(req): Json<CompleteRunRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let run_id = parse_id(id)?;
    let state = parse_state(&req.state)?;
    if !state.is_terminal() {
        return Err(ApiError::InvalidRequest(format!(
            "state '{}' is not terminal (valid: completed, failed, cancelled)",
            state.as_str()
        )));
    }

    let response = handler.complete_run(&run_id, state).await?;
    debug!(%run_id, state = state.as_str(), promoted = response.promoted.len(), "run completed");
    Ok(Json(response))
}

/// POST /api/v1/runs/{id}/cancel
async fn cancel_run<H>(State(handler): State<Arc<H>>, Path(id): Path<String>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let run_id = parse_id(id)?;
    let response = handler.cancel_run(&run_id).await?;
    debug!(%run_id, cancelled = response.cancelled, "cancel requested");
    Ok(Json(response))
}

/// GET /api/v1/gc/due
async fn gc_due<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let tasks = handler.gc_due().await?;
    Ok(Json(GcTasksResponse { tasks }))
}

/// GET /api/v1/gc/failed
async fn gc_failed<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let tasks = handler.gc_failed().await?;
    Ok(Json(GcTasksResponse { tasks }))
}

/// POST /api/v1/gc/{id}/retry
async fn gc_retry<H>(State(handler): State<Arc<H>>, Path(id): Path<String>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let run_id = parse_id(id)?;
    let task = handler.gc_retry(&run_id).await?;
    debug!(%run_id, "gc task re-enabled");
    Ok(Json(task))
}

/// GET /api/v1/admission
async fn admission_stats<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    Ok(Json(handler.admission_stats().await?))
}

/// GET /api/v1/config
async fn config<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let snapshot = handler.config().await?;
    Ok(Json(snapshot.as_ref().clone()))
}

fn parse_id(id: String) -> Result<RunId, ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::InvalidRequest("run id cannot be empty".into()));
    }
    Ok(RunId::from(id))
}

fn parse_state(s: &str) -> Result<RunState, ApiError> {
    RunState::parse(&s.to_lowercase()).ok_or_else(|| {
        ApiError::InvalidRequest(format!(
            "invalid state: '{s}' (valid: pending, queued, running, completed, failed, cancelled)"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::ControllerAdapter;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use runwarden_config::{ConfigSnapshot, ControllerConfig};
    use runwarden_core::{Bus, CleanupError, Controller, LogAlertSink, MemoryRunStore, ResourceCleaner};
    use runwarden_model::GcTask;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    struct NoopCleaner;

    #[async_trait]
    impl ResourceCleaner for NoopCleaner {
        async fn cleanup(&self, _task: &GcTask) -> Result<(), CleanupError> {
            Ok(())
        }
    }

    fn router() -> Router {
        let config: ControllerConfig = serde_json::from_value(json!({
            "gc": {"enabled": true, "delay_seconds": 0, "retry": 0},
            "parallelism": {
                "overall": {"max_parallel": 1, "max_queue_size": 1},
                "single_workflow": {"max_parallel": 1, "max_queue_size": 1}
            }
        }))
        .unwrap();
        let snapshot = Arc::new(ConfigSnapshot::from_config(config).unwrap());
        let controller = Controller::new(
            snapshot,
            Arc::new(MemoryRunStore::new()),
            Arc::new(NoopCleaner),
            Arc::new(LogAlertSink),
            Bus::noop(),
        );
        HttpApi::new(Arc::new(ControllerAdapter::new(Arc::new(controller)))).router()
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn submit_reports_admission_outcome_as_status() {
        let app = router();

        let (status, body) = call(&app, "POST", "/api/v1/runs", Some(json!({"id": "a1", "workflow_id": "a"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["result"], "admitted");
        assert_eq!(body["run"]["state"], "running");

        let (status, body) = call(&app, "POST", "/api/v1/runs", Some(json!({"id": "a2", "workflow_id": "a"}))).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["result"], "queued");

        let (status, body) = call(&app, "POST", "/api/v1/runs", Some(json!({"id": "a3", "workflow_id": "a"}))).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["result"], "rejected");
        assert_eq!(body["reason"], "queue full");

        let (status, body) = call(&app, "GET", "/api/v1/admission", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["running"], 1);
        assert_eq!(body["queued"], 1);
    }

    #[tokio::test]
    async fn submit_generates_missing_id() {
        let app = router();
        let (status, body) = call(&app, "POST", "/api/v1/runs", Some(json!({"workflow_id": "a"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(!body["run"]["id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_submit_conflicts() {
        let app = router();
        call(&app, "POST", "/api/v1/runs", Some(json!({"id": "a1", "workflow_id": "a"}))).await;
        let (status, body) = call(&app, "POST", "/api/v1/runs", Some(json!({"id": "a1", "workflow_id": "a"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn complete_promotes_and_schedules_gc() {
        let app = router();
        call(&app, "POST", "/api/v1/runs", Some(json!({"id": "a1", "workflow_id": "a"}))).await;
        call(&app, "POST", "/api/v1/runs", Some(json!({"id": "a2", "workflow_id": "a"}))).await;

        let (status, body) = call(
            &app,
            "POST",
            "/api/v1/runs/a1/complete",
            Some(json!({"state": "Completed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["run"]["state"], "completed");
        assert_eq!(body["promoted"][0]["id"], "a2");
        assert_eq!(body["gc"]["runId"], "a1");

        let (_, body) = call(&app, "GET", "/api/v1/gc/due", None).await;
        assert_eq!(body["tasks"].as_array().unwrap().len(), 1);

        let (status, body) = call(&app, "GET", "/api/v1/runs/a2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["state"], "running");
    }

    #[tokio::test]
    async fn complete_rejects_non_terminal_state() {
        let app = router();
        call(&app, "POST", "/api/v1/runs", Some(json!({"id": "a1", "workflow_id": "a"}))).await;
        let (status, _) = call(&app, "POST", "/api/v1/runs/a1/complete", Some(json!({"state": "running"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&app, "POST", "/api/v1/runs/a1/complete", Some(json!({"state": "bogus"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cancel_only_affects_queued_runs() {
        let app = router();
        call(&app, "POST", "/api/v1/runs", Some(json!({"id": "a1", "workflow_id": "a"}))).await;
        call(&app, "POST", "/api/v1/runs", Some(json!({"id": "a2", "workflow_id": "a"}))).await;

        let (_, body) = call(&app, "POST", "/api/v1/runs/a1/cancel", None).await;
        assert_eq!(body["cancelled"], false);

        let (status, body) = call(&app, "POST", "/api/v1/runs/a2/cancel", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cancelled"], true);
        assert_eq!(body["run"]["state"], "cancelled");
    }

    #[tokio::test]
    async fn list_filters_by_state() {
        let app = router();
        call(&app, "POST", "/api/v1/runs", Some(json!({"id": "a1", "workflow_id": "a"}))).await;
        call(&app, "POST", "/api/v1/runs", Some(json!({"id": "a2", "workflow_id": "a"}))).await;

        let (status, body) = call(&app, "GET", "/api/v1/runs?state=queued", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["runs"][0]["id"], "a2");

        let (status, _) = call(&app, "GET", "/api/v1/runs?state=nope", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_run_is_not_found() {
        let app = router();
        let (status, _) = call(&app, "GET", "/api/v1/runs/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, "POST", "/api/v1/gc/missing/retry", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn config_is_exposed() {
        let app = router();
        let (status, body) = call(&app, "GET", "/api/v1/config", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_object());
    }
}
