//! Read-only query service over the metrics store.
//!
//! Every operation is a single-step pure computation: the store is
//! immutable, so any number of concurrent invocations is safe without
//! coordination.

use std::sync::Arc;

use serde::Serialize;

use crate::analytics::{growth_rate, round2, Insight, InsightRules};
use crate::error::QueryError;
use crate::store::{MetricSeries, MetricsStore};

/// Side-by-side comparison of two metrics.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub first: MetricComparison,
    pub second: MetricComparison,
    pub analysis: String,
    /// Same-sign heuristic: "positive" when both growth rates are strictly
    /// positive or both strictly negative, "negative" otherwise. Not a
    /// statistical correlation.
    pub correlation: String,
}

/// One side of a comparison.
#[derive(Debug, Clone, Serialize)]
pub struct MetricComparison {
    pub metric: String,
    pub growth_rate: f64,
    pub current_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Query service: read-only accessors plus insight generation.
#[derive(Clone)]
pub struct QueryService {
    store: Arc<MetricsStore>,
    rules: Arc<InsightRules>,
}

impl QueryService {
    pub fn new(store: Arc<MetricsStore>, rules: Arc<InsightRules>) -> Self {
        Self { store, rules }
    }

    /// The whole store snapshot.
    pub fn store(&self) -> &MetricsStore {
        &self.store
    }

    /// Fetch one metric by identifier.
    pub fn get(&self, identifier: &str) -> Result<&MetricSeries, QueryError> {
        self.store.get(identifier)
    }

    /// One insight per stored metric, in store order. Empty only if the
    /// store itself is empty.
    pub fn list_insights(&self) -> Vec<Insight> {
        self.store
            .iter()
            .map(|series| self.rules.insight_for(series))
            .collect()
    }

    /// Compare two metrics by growth rate and current value.
    pub fn compare(&self, first: &str, second: &str) -> Result<Comparison, QueryError> {
        let a = self.store.get(first)?;
        let b = self.store.get(second)?;

        let growth_a = growth_rate(&a.samples);
        let growth_b = growth_rate(&b.samples);

        let correlation = if (growth_a > 0.0 && growth_b > 0.0) || (growth_a < 0.0 && growth_b < 0.0)
        {
            "positive"
        } else {
            "negative"
        };

        Ok(Comparison {
            first: MetricComparison {
                metric: a.identifier.clone(),
                growth_rate: round2(growth_a),
                current_value: a.current_value(),
                unit: a.unit.clone(),
            },
            second: MetricComparison {
                metric: b.identifier.clone(),
                growth_rate: round2(growth_b),
                current_value: b.current_value(),
                unit: b.unit.clone(),
            },
            analysis: format!(
                "{} is growing at {:.1}% while {} is at {:.1}%",
                a.identifier, growth_a, b.identifier, growth_b
            ),
            correlation: correlation.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Sample;

    fn service() -> QueryService {
        QueryService::new(
            Arc::new(MetricsStore::builtin()),
            Arc::new(InsightRules::with_defaults()),
        )
    }

    fn service_with(metrics: Vec<MetricSeries>) -> QueryService {
        let mut store = MetricsStore::builtin();
        store.metrics = metrics;
        QueryService::new(Arc::new(store), Arc::new(InsightRules::with_defaults()))
    }

    fn series(identifier: &str, values: &[f64]) -> MetricSeries {
        MetricSeries {
            identifier: identifier.to_string(),
            unit: None,
            description: String::new(),
            samples: values
                .iter()
                .enumerate()
                .map(|(i, v)| Sample::new(&format!("2025-{:02}", i + 1), *v))
                .collect(),
        }
    }

    #[test]
    fn list_insights_covers_every_metric_in_store_order() {
        let svc = service();
        let insights = svc.list_insights();
        let expected: Vec<&str> = svc.store().iter().map(|m| m.identifier.as_str()).collect();
        let got: Vec<&str> = insights.iter().map(|i| i.metric.as_str()).collect();
        assert_eq!(got, expected);

        // Reported growth is rounded to 2 decimal places.
        for insight in &insights {
            assert_eq!(insight.growth_rate, round2(insight.growth_rate));
        }
    }

    #[test]
    fn get_unknown_metric_is_not_found() {
        let svc = service();
        let err = svc.get("runway_months").unwrap_err();
        assert_eq!(err.to_string(), "Metric 'runway_months' not found");
    }

    #[test]
    fn compare_requires_both_metrics() {
        let svc = service();
        assert!(svc.compare("churn_rate", "runway_months").is_err());
        assert!(svc.compare("runway_months", "churn_rate").is_err());
    }

    #[test]
    fn compare_same_sign_growth_is_positive_correlation() {
        let svc = service_with(vec![
            series("a", &[100.0, 110.0]), // +10%
            series("b", &[100.0, 105.0]), // +5%
        ]);
        let cmp = svc.compare("a", "b").unwrap();
        assert_eq!(cmp.correlation, "positive");
        assert_eq!(cmp.first.growth_rate, 10.0);
        assert_eq!(cmp.second.growth_rate, 5.0);
        assert_eq!(cmp.analysis, "a is growing at 10.0% while b is at 5.0%");
    }

    #[test]
    fn compare_opposite_sign_growth_is_negative_correlation() {
        let svc = service_with(vec![
            series("a", &[100.0, 110.0]), // +10%
            series("b", &[100.0, 95.0]),  // -5%
        ]);
        assert_eq!(svc.compare("a", "b").unwrap().correlation, "negative");
    }

    #[test]
    fn compare_both_declining_is_positive_correlation() {
        let svc = service_with(vec![
            series("a", &[100.0, 90.0]),
            series("b", &[100.0, 80.0]),
        ]);
        assert_eq!(svc.compare("a", "b").unwrap().correlation, "positive");
    }

    #[test]
    fn compare_zero_growth_is_negative_correlation() {
        // Zero is not strictly positive, so the heuristic lands on
        // "negative" even when the other metric grows.
        let svc = service_with(vec![
            series("a", &[100.0, 100.0]),
            series("b", &[100.0, 110.0]),
        ]);
        assert_eq!(svc.compare("a", "b").unwrap().correlation, "negative");
    }
}
