//! HTTP surface for the submission checking pipeline.
//!
//! One handler serves `POST /validate` for both JSON and HTML-form
//! callers: the body format is negotiated from the content type, the
//! pipeline runs exactly once, and only the rendering differs. Fetch and
//! environment failures map to 500; a failing submission is a 200 whose
//! payload carries the verdict.

mod templates;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header::CONTENT_TYPE, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::{EnvironmentError, PipelineError};
use crate::pipeline::{CheckReport, CheckRequest, Gateway};
use crate::runner::CheckerConfig;

const MISSING_FIELDS: &str = "Task name and repo URL are required";

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    gateway: Arc<Gateway>,
}

impl AppState {
    /// Builds handler state from checker configuration.
    pub fn new(config: CheckerConfig) -> Self {
        Self {
            gateway: Arc::new(Gateway::new(config)),
        }
    }
}

/// Builds the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/validate", post(validate))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `addr` and serves the checker API until the process exits.
pub async fn serve(config: CheckerConfig, addr: &str) -> anyhow::Result<()> {
    let state = AppState::new(config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Checker HTTP surface listening on {}", addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(templates::INDEX_HTML)
}

/// Liveness probe; no dependency on the pipeline or the filesystem.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Checker is running",
    }))
}

/// Fields accepted by `/validate`, from JSON or form bodies alike.
#[derive(Debug, Deserialize)]
struct ValidateBody {
    #[serde(default)]
    task_name: Option<String>,
    #[serde(default)]
    repo_url: Option<String>,
}

/// JSON rendering of a completed check.
#[derive(Debug, Serialize)]
struct ValidateResponse {
    task_name: String,
    repo_url: String,
    exit_code: i32,
    stdout: String,
    stderr: String,
}

impl From<&CheckReport> for ValidateResponse {
    fn from(report: &CheckReport) -> Self {
        Self {
            task_name: report.task_name.clone(),
            repo_url: report.repo_url.clone(),
            exit_code: report.normalized_exit_code(),
            stdout: report.result.stdout.clone(),
            stderr: report.result.stderr.clone(),
        }
    }
}

async fn validate(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false);

    let parsed: Option<ValidateBody> = if is_json {
        serde_json::from_slice(&body).ok()
    } else {
        serde_urlencoded::from_bytes(&body).ok()
    };

    let (task_name, repo_url) = match parsed {
        Some(ValidateBody {
            task_name: Some(task),
            repo_url: Some(url),
        }) if !task.trim().is_empty() && !url.trim().is_empty() => (task, url),
        _ => return (StatusCode::BAD_REQUEST, MISSING_FIELDS).into_response(),
    };

    // Fields were checked above, so construction cannot fail.
    let request = match CheckRequest::new(task_name, repo_url) {
        Ok(request) => request,
        Err(_) => return (StatusCode::BAD_REQUEST, MISSING_FIELDS).into_response(),
    };

    match state.gateway.handle(request).await {
        Ok(report) => {
            if is_json {
                Json(ValidateResponse::from(&report)).into_response()
            } else {
                render_report_page(&report)
            }
        }
        Err(err) => operational_failure(err),
    }
}

/// Renders the HTML result page for form submissions.
fn render_report_page(report: &CheckReport) -> Response {
    let mut context = tera::Context::new();
    context.insert("task_name", &report.task_name);
    context.insert("repo_url", &report.repo_url);
    context.insert("exit_code", &report.result.exit_code);
    context.insert("stdout", &report.result.stdout);
    context.insert("stderr", &report.result.stderr);

    match tera::Tera::one_off(templates::RESPONSE_HTML, &context, true) {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            error!("Failed to render result page: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to render result page",
            )
                .into_response()
        }
    }
}

/// Maps operational pipeline failures to 500 responses.
///
/// These are "the grading system broke" signals; a wrong submission never
/// reaches this path.
fn operational_failure(err: PipelineError) -> Response {
    error!("Pipeline failure: {}", err);
    let message = match err {
        PipelineError::Environment(EnvironmentError::ExecutableNotFound(_)) => {
            "Checker executable not found".to_string()
        }
        PipelineError::Environment(e) => format!("Checker could not be run: {e}"),
        PipelineError::Fetch(e) => format!("Failed to fetch repository: {e}"),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
}
