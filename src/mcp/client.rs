//! HTTP client wrapper for the KPI dashboard API.
//!
//! Used by the MCP tools to query the primary data source. Failures are
//! typed so callers can distinguish a missing metric (caller error) from
//! an unreachable API (recoverable via the fallback dataset).

use std::time::Duration;

use serde::Deserialize;

use crate::analytics::Insight;
use crate::store::{MetricSeries, MetricsStore};

/// Error types for API client operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("metric '{0}' not found")]
    MetricNotFound(String),

    #[error("KPI API unreachable: {0}")]
    Unreachable(String),

    #[error("unexpected response from KPI API: {0}")]
    Malformed(String),
}

/// Response from GET /kpi/:metric.
#[derive(Debug, Deserialize)]
pub struct MetricPayload {
    pub metric: String,
    pub data: MetricSeries,
    pub last_updated: String,
}

/// Response from GET /insights.
#[derive(Debug, Deserialize)]
pub struct InsightsPayload {
    pub insights: Vec<Insight>,
    pub generated_at: String,
}

/// HTTP client for the KPI dashboard API.
#[derive(Clone)]
pub struct KpiApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl KpiApiClient {
    /// Create a new client with the given base URL.
    pub fn new(base_url: &str) -> Result<Self, ApiClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ApiClientError::Unreachable(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Fetch the full KPI dataset. The /kpi payload has the same shape as
    /// the store itself.
    pub async fn fetch_all(&self) -> Result<MetricsStore, ApiClientError> {
        let url = format!("{}/kpi", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiClientError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiClientError::Unreachable(format!(
                "GET /kpi returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ApiClientError::Malformed(e.to_string()))
    }

    /// Fetch a single metric.
    pub async fn fetch_metric(&self, name: &str) -> Result<MetricPayload, ApiClientError> {
        let url = format!("{}/kpi/{}", self.base_url, name);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiClientError::Unreachable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiClientError::MetricNotFound(name.to_string()));
        }
        if !response.status().is_success() {
            return Err(ApiClientError::Unreachable(format!(
                "GET /kpi/{} returned {}",
                name,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ApiClientError::Malformed(e.to_string()))
    }

    /// Fetch generated insights.
    pub async fn fetch_insights(&self) -> Result<InsightsPayload, ApiClientError> {
        let url = format!("{}/insights", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiClientError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiClientError::Unreachable(format!(
                "GET /insights returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ApiClientError::Malformed(e.to_string()))
    }
}
