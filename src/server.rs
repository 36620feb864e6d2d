// 🌐 HTTP API over the revenue report
//
// The report is built once at startup and rebuilt wholesale on reload.
// Request handlers only read it; filtering happens per request.

use crate::aggregate::{build_report_from_feeds, AggregatedReport};
use crate::config::Config;
use crate::feed::load_feeds;
use crate::format::ReportSummary;
use crate::search::filter_report;
use crate::load_report;
use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    report: Arc<RwLock<AggregatedReport>>,
}

impl AppState {
    pub fn new(config: Config, report: AggregatedReport) -> Self {
        Self {
            config: Arc::new(config),
            report: Arc::new(RwLock::new(report)),
        }
    }

    /// Load the configured feeds and build the initial report
    pub fn load(config: Config) -> anyhow::Result<Self> {
        let report = load_report(&config).context("Failed to build revenue report")?;
        Ok(Self::new(config, report))
    }

    fn snapshot(&self) -> AggregatedReport {
        match self.report.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace(&self, report: AggregatedReport) {
        match self.report.write() {
            Ok(mut guard) => *guard = report,
            Err(poisoned) => *poisoned.into_inner() = report,
        }
    }
}

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    q: Option<String>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/report?q=... - Report, optionally filtered, with its total
async fn get_report(State(state): State<AppState>, Query(params): Query<ReportQuery>) -> impl IntoResponse {
    let report = state.snapshot();
    let query = params.q.unwrap_or_default();
    let displayed = filter_report(&report, &query);

    info!(query = %query, shown = displayed.len(), of = report.len(), "served report");
    Json(ApiResponse::ok(ReportSummary::new(&displayed, Some(query.as_str()))))
}

/// POST /api/reload - Re-read the feeds and rebuild the report
async fn reload_report(State(state): State<AppState>) -> impl IntoResponse {
    let feeds = match load_feeds(&state.config.feeds, state.config.missing_feed) {
        Ok(feeds) => feeds,
        Err(e) => {
            error!("Error loading feeds: {:#}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<ReportSummary>::fail(format!("{:#}", e))),
            );
        }
    };

    match build_report_from_feeds(&feeds) {
        Ok(report) => {
            let summary = ReportSummary::new(&report, None);
            info!("report rebuilt: {}", summary.summary());
            state.replace(report);
            (StatusCode::OK, Json(ApiResponse::ok(summary)))
        }
        Err(e) => {
            warn!("Rejected reload, keeping previous report: {}", e);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::fail(e.to_string())),
            )
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/report", get(get_report))
        .route("/reload", post(reload_report))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.bind.clone();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Server running on http://{}", addr);
    info!("API: http://{}/api/report?q=", addr);

    axum::serve(listener, router(state))
        .await
        .context("Server stopped unexpectedly")
}

// ============================================================================
// TESTS
// ============================================================================
