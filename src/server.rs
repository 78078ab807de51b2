//! HTTP server and API handlers for the KPI dashboard.
//!
//! GET /            - API information.
//! GET /health      - health check.
//! GET /kpi         - full KPI dataset.
//! GET /kpi/:metric - a single metric series.
//! GET /insights    - trend insights for every metric.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::analytics::{Insight, InsightRules};
use crate::error::QueryError;
use crate::query::QueryService;
use crate::store::{CompanyInfo, MetricSeries, MetricsStore};

/// Application state shared across handlers.
pub struct AppState {
    pub query: QueryService,
}

/// Server configuration.
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8000 }
    }
}

/// Build the API router.
pub fn build_router(store: Arc<MetricsStore>, rules: Arc<InsightRules>) -> Router {
    let state = Arc::new(AppState {
        query: QueryService::new(store, rules),
    });

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/kpi", get(all_kpis_handler))
        .route("/kpi/:metric", get(metric_handler))
        .route("/insights", get(insights_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn run_server(
    store: Arc<MetricsStore>,
    rules: Arc<InsightRules>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let app = build_router(store, rules);

    // Bind to 0.0.0.0 so the MCP server can reach us from another process.
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(port = config.port, "KPI dashboard API listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Error mapping ---

/// An unknown metric is a caller error, surfaced as 404 with the
/// offending identifier in the body.
impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        match self {
            QueryError::MetricNotFound { .. } => {
                let body = ErrorBody {
                    detail: self.to_string(),
                };
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

// --- Handlers ---

/// GET / - API information.
async fn root_handler() -> Json<ApiInfoResponse> {
    let mut endpoints = BTreeMap::new();
    endpoints.insert("/kpi", "Get all KPI metrics");
    endpoints.insert("/kpi/{metric_name}", "Get specific metric data");
    endpoints.insert("/insights", "Get trend insights");
    endpoints.insert("/health", "Health check");

    Json(ApiInfoResponse {
        message: "Startup KPI Dashboard API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints,
    })
}

#[derive(Serialize)]
struct ApiInfoResponse {
    message: &'static str,
    version: &'static str,
    endpoints: BTreeMap<&'static str, &'static str>,
}

/// GET /health - health check endpoint.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

/// GET /kpi - the full dataset: metrics in store order, last-updated
/// timestamp, and company metadata.
async fn all_kpis_handler(State(state): State<Arc<AppState>>) -> Json<AllKpisResponse> {
    let store = state.query.store();
    Json(AllKpisResponse {
        metrics: store.metrics.clone(),
        last_updated: store.last_updated.clone(),
        company_info: store.company_info.clone(),
    })
}

#[derive(Serialize)]
struct AllKpisResponse {
    metrics: Vec<MetricSeries>,
    last_updated: String,
    company_info: CompanyInfo,
}

/// GET /kpi/:metric - a single metric series.
async fn metric_handler(
    State(state): State<Arc<AppState>>,
    Path(metric): Path<String>,
) -> Result<Json<MetricResponse>, QueryError> {
    let series = state.query.get(&metric)?;
    Ok(Json(MetricResponse {
        metric: series.identifier.clone(),
        data: series.clone(),
        last_updated: state.query.store().last_updated.clone(),
    }))
}

#[derive(Serialize)]
struct MetricResponse {
    metric: String,
    data: MetricSeries,
    last_updated: String,
}

/// GET /insights - trend insights for every stored metric.
async fn insights_handler(State(state): State<Arc<AppState>>) -> Json<InsightsResponse> {
    Json(InsightsResponse {
        insights: state.query.list_insights(),
        generated_at: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Serialize)]
struct InsightsResponse {
    insights: Vec<Insight>,
    generated_at: String,
}
