//! Pure analytics over metric time series.
//!
//! Provides growth-rate computation and trend-insight generation. Insight
//! wording is driven by a per-metric registry of threshold rules rather
//! than branching on identifier literals, so new metrics can register
//! their own rule set without touching shared code.

use serde::{Deserialize, Serialize};

use crate::store::{MetricSeries, Sample};

/// Percentage change between the first and last sample of a series.
///
/// Intermediate samples are ignored. Defined edge cases, not errors:
/// fewer than two samples yields 0.0, and a first value of zero yields
/// 0.0 to guard the division. The result is unclamped and may be
/// negative.
pub fn growth_rate(samples: &[Sample]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }

    let first = samples[0].value;
    let last = samples[samples.len() - 1].value;

    if first == 0.0 {
        return 0.0;
    }

    ((last - first) / first) * 100.0
}

/// A derived trend insight for one metric. Computed on demand, never
/// stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub metric: String,
    pub current_value: f64,
    /// Growth rate rounded to 2 decimal places. Threshold rules evaluate
    /// the unrounded value.
    pub growth_rate: f64,
    pub insight: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Which series-derived value a rule's condition reads.
#[derive(Debug, Clone, Copy)]
pub enum Signal {
    /// The unrounded growth rate.
    Growth,
    /// The latest sample value.
    Current,
}

/// Threshold condition, evaluated with strict comparison.
#[derive(Debug, Clone, Copy)]
pub enum Condition {
    Above(f64),
    Below(f64),
    /// Catch-all; every rule set ends with one.
    Always,
}

impl Condition {
    fn matches(&self, value: f64) -> bool {
        match self {
            Condition::Above(threshold) => value > *threshold,
            Condition::Below(threshold) => value < *threshold,
            Condition::Always => true,
        }
    }
}

/// Renders the insight text. Receives the metric identifier, the
/// unrounded growth rate, and the current value.
type MessageFn = fn(metric: &str, growth: f64, current: f64) -> String;

/// One threshold rule: which signal to read, the condition on it, and the
/// message produced when it matches.
pub struct ThresholdRule {
    pub signal: Signal,
    pub condition: Condition,
    pub message: MessageFn,
}

impl ThresholdRule {
    pub fn new(signal: Signal, condition: Condition, message: MessageFn) -> Self {
        Self {
            signal,
            condition,
            message,
        }
    }
}

/// Registry mapping metric identifiers to ordered rule sets.
///
/// Rules are evaluated in order; the first match wins. Metrics without a
/// registered rule set fall back to a generic trending-up/down template.
pub struct InsightRules {
    by_metric: Vec<(String, Vec<ThresholdRule>)>,
    fallback: Vec<ThresholdRule>,
}

impl InsightRules {
    /// Registry with rule sets for the builtin metrics.
    pub fn with_defaults() -> Self {
        let mut rules = Self {
            by_metric: Vec::new(),
            fallback: vec![
                ThresholdRule::new(Signal::Growth, Condition::Above(0.0), generic_up),
                ThresholdRule::new(Signal::Growth, Condition::Always, generic_down),
            ],
        };

        rules.register(
            "monthly_recurring_revenue",
            vec![
                ThresholdRule::new(Signal::Growth, Condition::Above(15.0), mrr_excellent),
                ThresholdRule::new(Signal::Growth, Condition::Above(5.0), mrr_solid),
                ThresholdRule::new(Signal::Growth, Condition::Always, mrr_flat),
            ],
        );

        // Churn is judged on its latest value, not its growth rate.
        rules.register(
            "churn_rate",
            vec![
                ThresholdRule::new(Signal::Current, Condition::Below(3.0), churn_excellent),
                ThresholdRule::new(Signal::Current, Condition::Below(5.0), churn_good),
                ThresholdRule::new(Signal::Current, Condition::Always, churn_high),
            ],
        );

        rules.register(
            "active_users",
            vec![
                ThresholdRule::new(Signal::Growth, Condition::Above(20.0), users_outstanding),
                ThresholdRule::new(Signal::Growth, Condition::Above(10.0), users_good),
                ThresholdRule::new(Signal::Growth, Condition::Always, users_flat),
            ],
        );

        rules
    }

    /// Register (or replace) the rule set for a metric.
    pub fn register(&mut self, metric: &str, rules: Vec<ThresholdRule>) {
        if let Some(entry) = self.by_metric.iter_mut().find(|(id, _)| id == metric) {
            entry.1 = rules;
        } else {
            self.by_metric.push((metric.to_string(), rules));
        }
    }

    /// Generate the trend insight for a series.
    ///
    /// Total for any well-formed series: an empty series yields a current
    /// value of 0 and a growth rate of 0.0.
    pub fn insight_for(&self, series: &MetricSeries) -> Insight {
        let growth = growth_rate(&series.samples);
        let current = series.current_value();

        let rule_set = self
            .by_metric
            .iter()
            .find(|(id, _)| *id == series.identifier)
            .map(|(_, rules)| rules)
            .unwrap_or(&self.fallback);

        let text = rule_set
            .iter()
            .find(|rule| {
                let value = match rule.signal {
                    Signal::Growth => growth,
                    Signal::Current => current,
                };
                rule.condition.matches(value)
            })
            .map(|rule| (rule.message)(&series.identifier, growth, current))
            // Unreachable with well-formed rule sets (each ends in Always),
            // but an empty rule set should still produce something.
            .unwrap_or_else(|| generic_up(&series.identifier, growth, current));

        Insight {
            metric: series.identifier.clone(),
            current_value: current,
            growth_rate: round2(growth),
            insight: text,
            unit: series.unit.clone(),
        }
    }
}

impl Default for InsightRules {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Round to 2 decimal places for reporting.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// --- Message templates ---

fn mrr_excellent(_metric: &str, growth: f64, _current: f64) -> String {
    format!("Excellent MRR growth of {growth:.1}%! Your revenue is scaling well.")
}

fn mrr_solid(_metric: &str, growth: f64, _current: f64) -> String {
    format!("Solid MRR growth of {growth:.1}%. Consider strategies to accelerate growth.")
}

fn mrr_flat(_metric: &str, growth: f64, _current: f64) -> String {
    format!("MRR growth is {growth:.1}%. Focus on customer acquisition and retention.")
}

fn churn_excellent(_metric: &str, _growth: f64, current: f64) -> String {
    format!("Excellent churn rate of {current}%! Your customer retention is strong.")
}

fn churn_good(_metric: &str, _growth: f64, current: f64) -> String {
    format!("Good churn rate of {current}%. Room for improvement in retention.")
}

fn churn_high(_metric: &str, _growth: f64, current: f64) -> String {
    format!("High churn rate of {current}%. Urgent attention needed for retention.")
}

fn users_outstanding(_metric: &str, growth: f64, _current: f64) -> String {
    format!("Outstanding user growth of {growth:.1}%! Your product is gaining traction.")
}

fn users_good(_metric: &str, growth: f64, _current: f64) -> String {
    format!("Good user growth of {growth:.1}%. Keep up the momentum.")
}

fn users_flat(_metric: &str, growth: f64, _current: f64) -> String {
    format!("User growth is {growth:.1}%. Consider user acquisition strategies.")
}

fn generic_up(metric: &str, growth: f64, _current: f64) -> String {
    format!("{} is trending up by {growth:.1}%.", title_case(metric))
}

fn generic_down(metric: &str, growth: f64, _current: f64) -> String {
    format!(
        "{} is trending down by {:.1}%.",
        title_case(metric),
        growth.abs()
    )
}

/// "customer_acquisition_cost" -> "Customer Acquisition Cost".
fn title_case(identifier: &str) -> String {
    identifier
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MetricsStore;
    use proptest::prelude::*;

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
    fn growth_rate_of_empty_series_is_zero() {
        assert_eq!(growth_rate(&[]), 0.0);
    }

    #[test]
    fn growth_rate_of_single_sample_is_zero() {
        assert_eq!(growth_rate(&[Sample::new("2025-01", 5.0)]), 0.0);
    }

    #[test]
    fn growth_rate_guards_division_by_zero() {
        let samples = [Sample::new("2025-01", 0.0), Sample::new("2025-02", 10.0)];
        assert_eq!(growth_rate(&samples), 0.0);
    }

    #[test]
    fn growth_rate_is_percentage_change() {
        let samples = [Sample::new("2025-01", 100.0), Sample::new("2025-02", 150.0)];
        assert_eq!(growth_rate(&samples), 50.0);
    }

    #[test]
    fn growth_rate_can_be_negative() {
        let samples = [Sample::new("2025-01", 100.0), Sample::new("2025-02", 80.0)];
        assert_eq!(growth_rate(&samples), -20.0);
    }

    proptest! {
        // Only the first and last samples matter: inserting middle samples
        // must not change the result.
        #[test]
        fn growth_rate_ignores_middle_samples(
            first in 1.0f64..10_000.0,
            last in 0.0f64..10_000.0,
            middle in proptest::collection::vec(0.0f64..10_000.0, 0..8),
        ) {
            let base = [Sample::new("2025-01", first), Sample::new("2025-12", last)];
            let mut padded = vec![Sample::new("2025-01", first)];
            for (i, v) in middle.iter().enumerate() {
                padded.push(Sample::new(&format!("2025-{:02}", i + 2), *v));
            }
            padded.push(Sample::new("2025-12", last));
            prop_assert_eq!(growth_rate(&base), growth_rate(&padded));
        }
    }

    #[test]
    fn mrr_builtin_series_selects_excellent_branch() {
        let store = MetricsStore::builtin();
        let rules = InsightRules::with_defaults();
        let mrr = store.get("monthly_recurring_revenue").unwrap();

        let insight = rules.insight_for(mrr);
        // 8800 -> 12500 is ~42.05% growth, well above the 15% threshold.
        assert_eq!(insight.growth_rate, 42.05);
        assert!(insight.insight.starts_with("Excellent MRR growth"));
        assert_eq!(insight.current_value, 12500.0);
    }

    #[test]
    fn churn_is_judged_on_current_value_not_growth() {
        let rules = InsightRules::with_defaults();
        // Growth is -50% (declining churn is good); latest value 2.1 < 3.
        let declining = series("churn_rate", &[4.2, 2.1]);
        let insight = rules.insight_for(&declining);
        assert!(insight.insight.starts_with("Excellent churn rate of 2.1%"));

        // Same latest value with rising growth still lands in the same branch.
        let rising = series("churn_rate", &[1.0, 2.1]);
        assert!(rules
            .insight_for(&rising)
            .insight
            .starts_with("Excellent churn rate"));
    }

    #[test]
    fn churn_branches_on_thresholds() {
        let rules = InsightRules::with_defaults();
        let good = series("churn_rate", &[5.0, 4.0]);
        assert!(rules.insight_for(&good).insight.starts_with("Good churn rate"));

        let high = series("churn_rate", &[5.0, 6.5]);
        assert!(rules.insight_for(&high).insight.starts_with("High churn rate"));
    }

    #[test]
    fn active_users_branches_on_growth() {
        let rules = InsightRules::with_defaults();
        let outstanding = series("active_users", &[100.0, 130.0]);
        assert!(rules
            .insight_for(&outstanding)
            .insight
            .starts_with("Outstanding user growth"));

        let good = series("active_users", &[100.0, 115.0]);
        assert!(rules.insight_for(&good).insight.starts_with("Good user growth"));

        let flat = series("active_users", &[100.0, 105.0]);
        assert!(rules.insight_for(&flat).insight.starts_with("User growth is"));
    }

    #[test]
    fn unknown_metric_uses_generic_template() {
        let rules = InsightRules::with_defaults();
        let up = series("net_promoter_score", &[40.0, 50.0]);
        assert_eq!(
            rules.insight_for(&up).insight,
            "Net Promoter Score is trending up by 25.0%."
        );

        let down = series("net_promoter_score", &[50.0, 40.0]);
        assert_eq!(
            rules.insight_for(&down).insight,
            "Net Promoter Score is trending down by 20.0%."
        );
    }

    #[test]
    fn empty_series_yields_zeroed_insight() {
        let rules = InsightRules::with_defaults();
        let empty = series("monthly_recurring_revenue", &[]);
        let insight = rules.insight_for(&empty);
        assert_eq!(insight.current_value, 0.0);
        assert_eq!(insight.growth_rate, 0.0);
        // 0.0 growth falls through to the flat branch.
        assert!(insight.insight.starts_with("MRR growth is 0.0%"));
    }

    #[test]
    fn thresholds_evaluate_unrounded_growth() {
        let rules = InsightRules::with_defaults();
        // Growth of 15.004% rounds to 15.0 but must still clear the >15
        // threshold on the unrounded value.
        let mrr = series("monthly_recurring_revenue", &[10000.0, 11500.4]);
        let insight = rules.insight_for(&mrr);
        assert_eq!(insight.growth_rate, 15.0);
        assert!(insight.insight.starts_with("Excellent MRR growth"));
    }

    #[test]
    fn registered_rule_set_overrides_generic_template() {
        let mut rules = InsightRules::with_defaults();
        rules.register(
            "net_promoter_score",
            vec![ThresholdRule::new(
                Signal::Current,
                Condition::Always,
                |_m, _g, current| format!("NPS sits at {current}."),
            )],
        );
        let nps = series("net_promoter_score", &[40.0, 50.0]);
        assert_eq!(rules.insight_for(&nps).insight, "NPS sits at 50.");
    }
}
