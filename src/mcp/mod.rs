//! MCP (Model Context Protocol) server for the KPI dashboard.
//!
//! Exposes the dashboard's metrics and insights as callable tools for an
//! LLM agent. The tools query the HTTP API and fall back to the builtin
//! dataset when the API is unreachable, so no upstream failure is fatal.

pub mod client;

use std::sync::Arc;

use client::{ApiClientError, KpiApiClient};
use rmcp::{
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analytics::{growth_rate, round2, Insight, InsightRules};
use crate::query::{Comparison, QueryService};
use crate::store::{MetricsStore, Sample};

/// MCP server for startup KPI access.
#[derive(Clone)]
pub struct KpiMcpServer {
    client: KpiApiClient,
    /// Local default dataset used when the API is unreachable.
    fallback: Arc<MetricsStore>,
    rules: Arc<InsightRules>,
    tool_router: ToolRouter<Self>,
}

impl KpiMcpServer {
    /// Create a new MCP server backed by the given API client.
    pub fn new(client: KpiApiClient) -> Self {
        Self {
            client,
            fallback: Arc::new(MetricsStore::builtin()),
            rules: Arc::new(InsightRules::with_defaults()),
            tool_router: Self::tool_router(),
        }
    }
}

// --- Tool Parameter Types ---

/// Parameters for get_metric_analysis tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MetricAnalysisParams {
    /// Metric identifier, e.g. 'monthly_recurring_revenue' or 'churn_rate'.
    pub metric_name: String,
}

/// Parameters for compare_metrics tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CompareMetricsParams {
    /// First metric identifier.
    pub metric1: String,
    /// Second metric identifier.
    pub metric2: String,
}

// --- Tool Response Types ---

/// Outcome discriminator carried by every tool response.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
enum ToolStatus {
    Success,
    Error,
    /// The API was unreachable and the builtin dataset was used instead.
    SuccessFallback,
}

#[derive(Debug, Serialize)]
struct FetchKpisResponse {
    status: ToolStatus,
    data: MetricsStore,
    fetched_at: String,
}

#[derive(Debug, Serialize)]
struct FetchKpisErrorResponse {
    status: ToolStatus,
    error: String,
    fallback_data: MetricsStore,
}

#[derive(Debug, Serialize)]
struct MetricAnalysisResponse {
    status: ToolStatus,
    metric: String,
    current_value: f64,
    growth_rate: f64,
    trend_direction: &'static str,
    data_points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    description: String,
    raw_data: Vec<Sample>,
}

#[derive(Debug, Serialize)]
struct InsightsResponse {
    status: ToolStatus,
    insights: Vec<Insight>,
    generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

#[derive(Debug, Serialize)]
struct CompareResponse {
    status: ToolStatus,
    #[serde(flatten)]
    comparison: Comparison,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

#[derive(Debug, Serialize)]
struct ToolErrorResponse {
    status: ToolStatus,
    error: String,
}

// --- Helpers ---

fn to_tool_result<T: Serialize>(response: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| McpError::internal_error(format!("JSON error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn tool_error(message: String) -> Result<CallToolResult, McpError> {
    to_tool_result(&ToolErrorResponse {
        status: ToolStatus::Error,
        error: message,
    })
}

fn trend_direction(growth: f64) -> &'static str {
    if growth > 0.0 {
        "up"
    } else if growth < 0.0 {
        "down"
    } else {
        "stable"
    }
}

// --- Tool Implementations ---

#[tool_router]
impl KpiMcpServer {
    #[tool(
        name = "fetch_startup_kpis",
        description = "Fetch all startup KPI data including MRR, active users, churn rate, CAC, and LTV. Returns the complete dataset with metrics, samples, and company information."
    )]
    async fn fetch_startup_kpis(&self) -> Result<CallToolResult, McpError> {
        info!("Fetching startup KPI data via MCP tool");

        match self.client.fetch_all().await {
            Ok(data) => to_tool_result(&FetchKpisResponse {
                status: ToolStatus::Success,
                data,
                fetched_at: chrono::Utc::now().to_rfc3339(),
            }),
            Err(e) => {
                warn!(error = %e, "KPI API fetch failed, returning fallback dataset");
                to_tool_result(&FetchKpisErrorResponse {
                    status: ToolStatus::Error,
                    error: format!("Failed to fetch KPI data from API: {}", e),
                    fallback_data: (*self.fallback).clone(),
                })
            }
        }
    }

    #[tool(
        name = "get_metric_analysis",
        description = "Get detailed analysis for a specific metric: current value, growth rate, trend direction, and the raw samples."
    )]
    async fn get_metric_analysis(
        &self,
        Parameters(params): Parameters<MetricAnalysisParams>,
    ) -> Result<CallToolResult, McpError> {
        info!(metric = %params.metric_name, "Analyzing metric");

        let payload = match self.client.fetch_metric(&params.metric_name).await {
            Ok(p) => p,
            Err(e @ ApiClientError::MetricNotFound(_)) => {
                return tool_error(e.to_string());
            }
            Err(e) => {
                return tool_error(format!("Failed to analyze metric: {}", e));
            }
        };

        let growth = growth_rate(&payload.data.samples);

        to_tool_result(&MetricAnalysisResponse {
            status: ToolStatus::Success,
            metric: payload.metric,
            current_value: payload.data.current_value(),
            growth_rate: round2(growth),
            trend_direction: trend_direction(growth),
            data_points: payload.data.samples.len(),
            unit: payload.data.unit.clone(),
            description: payload.data.description.clone(),
            raw_data: payload.data.samples,
        })
    }

    #[tool(
        name = "generate_business_insights",
        description = "Generate business insights based on current KPI trends. Falls back to the cached dataset when the API is unavailable."
    )]
    async fn generate_business_insights(&self) -> Result<CallToolResult, McpError> {
        info!("Generating business insights");

        match self.client.fetch_insights().await {
            Ok(payload) => to_tool_result(&InsightsResponse {
                status: ToolStatus::Success,
                insights: payload.insights,
                generated_at: payload.generated_at,
                summary: Some("Business insights generated successfully".to_string()),
                note: None,
            }),
            Err(e) => {
                warn!(error = %e, "Insights fetch failed, computing locally");
                let query = QueryService::new(self.fallback.clone(), self.rules.clone());
                to_tool_result(&InsightsResponse {
                    status: ToolStatus::SuccessFallback,
                    insights: query.list_insights(),
                    generated_at: chrono::Utc::now().to_rfc3339(),
                    summary: None,
                    note: Some(
                        "Generated from cached data due to API unavailability".to_string(),
                    ),
                })
            }
        }
    }

    #[tool(
        name = "compare_metrics",
        description = "Compare two metrics by growth rate and current value, with a sign-based correlation classification."
    )]
    async fn compare_metrics(
        &self,
        Parameters(params): Parameters<CompareMetricsParams>,
    ) -> Result<CallToolResult, McpError> {
        info!(
            metric1 = %params.metric1,
            metric2 = %params.metric2,
            "Comparing metrics"
        );

        let (store, note) = match self.client.fetch_all().await {
            Ok(data) => (Arc::new(data), None),
            Err(e) => {
                warn!(error = %e, "KPI API fetch failed, comparing against fallback dataset");
                (
                    self.fallback.clone(),
                    Some("Compared against cached data due to API unavailability".to_string()),
                )
            }
        };

        let query = QueryService::new(store, self.rules.clone());
        match query.compare(&params.metric1, &params.metric2) {
            Ok(comparison) => to_tool_result(&CompareResponse {
                status: if note.is_some() {
                    ToolStatus::SuccessFallback
                } else {
                    ToolStatus::Success
                },
                comparison,
                note,
            }),
            Err(e) => tool_error(e.to_string()),
        }
    }
}

#[tool_handler]
impl ServerHandler for KpiMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "startup-kpi-server".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: Some("Startup KPI Server".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "MCP server for startup business metrics. Use fetch_startup_kpis for the \
                 full dataset, get_metric_analysis for one metric, \
                 generate_business_insights for trend insights, and compare_metrics to \
                 compare two metrics."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_direction_follows_growth_sign() {
        assert_eq!(trend_direction(4.2), "up");
        assert_eq!(trend_direction(-0.1), "down");
        assert_eq!(trend_direction(0.0), "stable");
    }

    #[test]
    fn tool_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ToolStatus::SuccessFallback).unwrap(),
            "\"success_fallback\""
        );
        assert_eq!(serde_json::to_string(&ToolStatus::Success).unwrap(), "\"success\"");
        assert_eq!(serde_json::to_string(&ToolStatus::Error).unwrap(), "\"error\"");
    }
}
