use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::render::{html::render_html, TemplateCache};
use crate::report::{IssueSource, ReportBuilder, ReportService};
use crate::tracker::TrackerError;

/// Everything the handlers share
pub struct DashboardState {
    pub service: ReportService,
    /// Window used when a request does not pass `?days=`
    pub lookback_days: u32,
    pub templates: Mutex<TemplateCache>,
}

pub type SharedState = Arc<DashboardState>;

impl DashboardState {
    pub fn new(service: ReportService, lookback_days: u32, templates: TemplateCache) -> SharedState {
        Arc::new(Self {
            service,
            lookback_days,
            templates: Mutex::new(templates),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub days: Option<u32>,
}

pub enum ApiError {
    BadRequest(String),
    BadGateway(String),
    Internal(String),
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::InvalidProject(_) => ApiError::BadRequest(err.to_string()),
            other => ApiError::BadGateway(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        if status.is_server_error() {
            error!(status = status.as_u16(), "Dashboard request failed: {}", message);
        }
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

/// Build the dashboard router.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/report/{project}", get(api_report))
        .route("/report/{project}", get(html_report))
        .route("/api/boards", get(api_boards))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}))
}

async fn api_report(
    State(state): State<SharedState>,
    Path(project): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let days = query.days.unwrap_or(state.lookback_days);
    let source = IssueSource::project(&project, days)?;
    let issues = state.service.fetch_issues(&source).await?;
    let report = ReportBuilder::new(&project).lookback_days(days).build(&issues);
    let value = serde_json::to_value(&report).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(value))
}

async fn html_report(
    State(state): State<SharedState>,
    Path(project): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Html<String>, ApiError> {
    let days = query.days.unwrap_or(state.lookback_days);
    let source = IssueSource::project(&project, days)?;
    let issues = state.service.fetch_issues(&source).await?;
    let report = ReportBuilder::new(&project).lookback_days(days).build(&issues);

    let mut templates = state.templates.lock().await;
    let page = render_html(&report, &mut templates).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Html(page))
}

async fn api_boards(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let boards = state.service.list_boards().await?;
    Ok(Json(boards))
}

/// Start the dashboard and serve until Ctrl+C.
pub async fn start_server(state: SharedState, host: &str, port: u16) -> Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    info!("Dashboard listening on http://{}", local_addr);
    println!("📊 Tracker Pulse dashboard running at http://{}", local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    println!("Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    println!("\nShutting down...");
}
