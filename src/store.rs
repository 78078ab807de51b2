//! Immutable in-memory store of startup business metrics.
//!
//! The store is built once at process start and passed by reference into
//! the query service and transport adapters. There is no mutation API.

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// A single observation in a metric's time series.
///
/// `period` is a `YYYY-MM` month string. Samples are ordered
/// chronologically ascending; the last sample is the current value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub period: String,
    pub value: f64,
}

impl Sample {
    pub fn new(period: &str, value: f64) -> Self {
        Self {
            period: period.to_string(),
            value,
        }
    }
}

/// One metric with its metadata and ordered samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSeries {
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub description: String,
    pub samples: Vec<Sample>,
}

impl MetricSeries {
    /// Value of the most recent sample, or 0 for an empty series.
    pub fn current_value(&self) -> f64 {
        self.samples.last().map(|s| s.value).unwrap_or(0.0)
    }
}

/// Static company metadata served alongside the metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    pub founded: String,
    pub industry: String,
    pub stage: String,
}

/// The full metrics table.
///
/// Metrics are held in an ordered `Vec` rather than a map so that store
/// iteration order (and therefore JSON output order) is definition order.
/// Lookup is a linear scan over a handful of entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsStore {
    pub metrics: Vec<MetricSeries>,
    pub last_updated: String,
    pub company_info: CompanyInfo,
}

impl MetricsStore {
    /// Build the builtin sample dataset.
    ///
    /// In production this table would come from a database; here it is a
    /// literal definition. `last_updated` captures the construction time.
    pub fn builtin() -> Self {
        let metrics = vec![
            MetricSeries {
                identifier: "monthly_recurring_revenue".to_string(),
                unit: Some("USD".to_string()),
                description:
                    "Monthly Recurring Revenue - predictable revenue from subscriptions"
                        .to_string(),
                samples: vec![
                    Sample::new("2025-03", 8800.0),
                    Sample::new("2025-04", 9700.0),
                    Sample::new("2025-05", 10500.0),
                    Sample::new("2025-06", 11400.0),
                    Sample::new("2025-07", 12250.0),
                    Sample::new("2025-08", 12500.0),
                ],
            },
            MetricSeries {
                identifier: "active_users".to_string(),
                unit: Some("users".to_string()),
                description:
                    "Monthly Active Users - unique users who engaged with the product"
                        .to_string(),
                samples: vec![
                    Sample::new("2025-03", 2100.0),
                    Sample::new("2025-04", 2350.0),
                    Sample::new("2025-05", 2675.0),
                    Sample::new("2025-06", 2920.0),
                    Sample::new("2025-07", 3050.0),
                    Sample::new("2025-08", 3100.0),
                ],
            },
            MetricSeries {
                identifier: "churn_rate".to_string(),
                unit: Some("%".to_string()),
                description:
                    "Customer Churn Rate - percentage of customers who stopped using the service"
                        .to_string(),
                samples: vec![
                    Sample::new("2025-03", 4.2),
                    Sample::new("2025-04", 3.8),
                    Sample::new("2025-05", 3.3),
                    Sample::new("2025-06", 2.7),
                    Sample::new("2025-07", 2.3),
                    Sample::new("2025-08", 2.1),
                ],
            },
            MetricSeries {
                identifier: "customer_acquisition_cost".to_string(),
                unit: Some("USD".to_string()),
                description:
                    "Customer Acquisition Cost - average cost to acquire a new customer"
                        .to_string(),
                samples: vec![
                    Sample::new("2025-03", 85.0),
                    Sample::new("2025-04", 78.0),
                    Sample::new("2025-05", 72.0),
                    Sample::new("2025-06", 68.0),
                    Sample::new("2025-07", 65.0),
                    Sample::new("2025-08", 62.0),
                ],
            },
            MetricSeries {
                identifier: "lifetime_value".to_string(),
                unit: Some("USD".to_string()),
                description:
                    "Customer Lifetime Value - predicted revenue from a customer relationship"
                        .to_string(),
                samples: vec![
                    Sample::new("2025-03", 580.0),
                    Sample::new("2025-04", 620.0),
                    Sample::new("2025-05", 650.0),
                    Sample::new("2025-06", 680.0),
                    Sample::new("2025-07", 720.0),
                    Sample::new("2025-08", 750.0),
                ],
            },
        ];

        Self {
            metrics,
            last_updated: chrono::Utc::now().to_rfc3339(),
            company_info: CompanyInfo {
                name: "Your Startup".to_string(),
                founded: "2024-01-01".to_string(),
                industry: "SaaS".to_string(),
                stage: "Early Growth".to_string(),
            },
        }
    }

    /// Look up a metric by identifier.
    pub fn get(&self, identifier: &str) -> Result<&MetricSeries, QueryError> {
        self.metrics
            .iter()
            .find(|m| m.identifier == identifier)
            .ok_or_else(|| QueryError::MetricNotFound {
                metric: identifier.to_string(),
            })
    }

    /// Iterate metrics in store order.
    pub fn iter(&self) -> impl Iterator<Item = &MetricSeries> {
        self.metrics.iter()
    }
}
