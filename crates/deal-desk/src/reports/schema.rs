//! Strict payload validation.
//!
//! Every payload is serialized, parsed back through its `deny_unknown_fields`
//! definition, and then checked against structural rules. Non-finite numbers
//! serialize as `null` and fail the parse step.

use super::views::{
    AnalysisView, CustomerView, DocumentsView, InquiryView, Metric, RiskView, SummaryView,
};
use crate::synthesis::{
    TieOutStatus, Trend, DIMENSION_SCORE_RANGE, MONTHS, RISK_DIMENSIONS, RISK_SCORE_RANGE,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{payload} payload failed validation: {}", .rules.join("; "))]
pub struct SchemaViolation {
    pub payload: &'static str,
    pub rules: Vec<String>,
}

/// Accumulates violated rules for one payload.
#[derive(Debug, Default)]
pub struct RuleSet {
    violations: Vec<String>,
}

impl RuleSet {
    pub fn require(&mut self, holds: bool, rule: impl FnOnce() -> String) {
        if !holds {
            self.violations.push(rule());
        }
    }

    pub fn exact_len(&mut self, field: &str, actual: usize, expected: usize) {
        self.require(actual == expected, || {
            format!("{field} must have {expected} entries, found {actual}")
        });
    }

    pub fn within(&mut self, field: &str, value: f64, (min, max): (f64, f64)) {
        self.require((min..=max).contains(&value), || {
            format!("{field} must lie in [{min}, {max}], found {value}")
        });
    }

    pub fn non_empty(&mut self, field: &str, value: &str) {
        self.require(!value.trim().is_empty(), || format!("{field} must not be empty"));
    }

    pub fn unique<'a>(&mut self, field: &str, ids: impl IntoIterator<Item = &'a str>) {
        let mut seen = HashSet::new();
        for id in ids {
            self.require(seen.insert(id), || format!("{field} contains duplicate id {id}"));
        }
    }

    fn finish(self, payload: &'static str) -> Result<(), SchemaViolation> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaViolation {
                payload,
                rules: self.violations,
            })
        }
    }
}

/// A payload that can be checked before it leaves the engine.
pub trait Schema: Serialize + DeserializeOwned {
    const NAME: &'static str;

    fn check(&self, rules: &mut RuleSet);
}

/// Returns the payload untouched when it satisfies its schema.
pub fn validate<T: Schema>(payload: T) -> Result<T, SchemaViolation> {
    let parse_error = |err: serde_json::Error| SchemaViolation {
        payload: T::NAME,
        rules: vec![err.to_string()],
    };

    let value = serde_json::to_value(&payload).map_err(parse_error)?;
    let parsed: T = serde_json::from_value(value).map_err(parse_error)?;

    let mut rules = RuleSet::default();
    parsed.check(&mut rules);
    rules.finish(T::NAME)?;
    Ok(payload)
}

fn check_metrics(rules: &mut RuleSet, field: &str, metrics: &[Metric], expected: usize) {
    rules.exact_len(field, metrics.len(), expected);
    rules.unique(field, metrics.iter().map(|metric| metric.id.as_str()));
    for metric in metrics {
        rules.non_empty(&format!("{field}.{}.value", metric.id), &metric.value);
        rules.exact_len(&format!("{field}.{}.lineage", metric.id), metric.lineage.len(), 4);
        rules.exact_len(
            &format!("{field}.{}.cellTrace", metric.id),
            metric.cell_trace.len(),
            3,
        );
    }
}

fn check_trend(rules: &mut RuleSet, trend: &Trend) {
    rules.exact_len("trend", trend.len(), MONTHS.len());
    for (point, month) in trend.iter().zip(MONTHS) {
        rules.require(point.month == month, || {
            format!("trend months out of order: expected {month}, found {}", point.month)
        });
        rules.require(point.revenue >= 0.0, || format!("trend.{month}.revenue is negative"));
    }
}

impl Schema for SummaryView {
    const NAME: &'static str = "summary";

    fn check(&self, rules: &mut RuleSet) {
        rules.non_empty("lastUpdated", &self.last_updated);
        check_metrics(rules, "metrics", &self.metrics, 8);
        check_trend(rules, &self.trend);
        rules.exact_len("insights", self.insights.len(), 3);
        rules.exact_len("deltaFeed", self.delta_feed.len(), 4);
        rules.require(self.risk_breakdown.amber >= 2, || {
            "riskBreakdown.amber must be at least 2".to_string()
        });
    }
}

impl Schema for AnalysisView {
    const NAME: &'static str = "analysis";

    fn check(&self, rules: &mut RuleSet) {
        rules.non_empty("lastUpdated", &self.last_updated);
        check_metrics(rules, "qoeMetrics", &self.qoe_metrics, 7);
        check_metrics(rules, "revenueMetrics", &self.revenue_metrics, 6);
        check_metrics(rules, "marginMetrics", &self.margin_metrics, 7);
        check_metrics(rules, "wcMetrics", &self.wc_metrics, 5);
        check_metrics(rules, "cashMetrics", &self.cash_metrics, 7);
        check_trend(rules, &self.trend);
        rules.exact_len("adjustments", self.adjustments.len(), 4);
        rules.unique("adjustments", self.adjustments.iter().map(|row| row.id.as_str()));
        rules.exact_len("concentration", self.concentration.len(), 4);
        rules.exact_len("aging", self.aging.len(), 4);
        rules.exact_len("opexMix", self.opex_mix.len(), 5);
        for point in &self.concentration {
            rules.within(&format!("concentration.{}", point.label), point.value, (0.0, 100.0));
        }
    }
}

impl Schema for RiskView {
    const NAME: &'static str = "risk";

    fn check(&self, rules: &mut RuleSet) {
        rules.non_empty("lastUpdated", &self.last_updated);
        rules.within("riskScore", self.risk_score, RISK_SCORE_RANGE);
        rules.exact_len("dimensions", self.dimensions.len(), RISK_DIMENSIONS.len());
        for dimension in &self.dimensions {
            rules.within(
                &format!("dimensions.{}", dimension.subject),
                dimension.score,
                DIMENSION_SCORE_RANGE,
            );
        }
        rules.exact_len("tieOuts", self.tie_outs.len(), 6);
        for row in &self.tie_outs {
            let expected = TieOutStatus::classify(row.variance_pct, row.tolerance_pct);
            rules.require(row.status == expected, || {
                format!(
                    "tieOuts.{} is {} but {}% against {}% classifies as {}",
                    row.name,
                    row.status.label(),
                    row.variance_pct,
                    row.tolerance_pct,
                    expected.label()
                )
            });
            rules.require(row.tolerance_pct > 0.0, || {
                format!("tieOuts.{} tolerance must be positive", row.name)
            });
        }
        rules.exact_len("register", self.register.len(), 4);
        rules.unique("register", self.register.iter().map(|row| row.id.as_str()));
    }
}

impl Schema for DocumentsView {
    const NAME: &'static str = "documents";

    fn check(&self, rules: &mut RuleSet) {
        rules.non_empty("lastUpdated", &self.last_updated);
        rules.exact_len("coverage", self.coverage.len(), 9);
        for row in &self.coverage {
            rules.exact_len(
                &format!("coverage.{}", row.schedule),
                row.months.len(),
                MONTHS.len(),
            );
        }
        rules.exact_len("inventory", self.inventory.len(), 4);
        for row in &self.inventory {
            rules.within(&format!("inventory.{}.confidence", row.id), row.confidence, (0.7, 0.99));
        }
        rules.exact_len("pbc", self.pbc.len(), 3);
    }
}

impl Schema for CustomerView {
    const NAME: &'static str = "customer";

    fn check(&self, rules: &mut RuleSet) {
        rules.non_empty("lastUpdated", &self.last_updated);
        check_metrics(rules, "metrics", &self.metrics, 4);
        rules.exact_len("topTrend", self.top_trend.len(), MONTHS.len());
        for point in &self.top_trend {
            rules.require(point.top1 <= point.top10, || {
                format!("topTrend.{}: top1 exceeds top10", point.month)
            });
        }
        rules.exact_len("discountAnomalies", self.discount_anomalies.len(), MONTHS.len());
        for row in &self.discount_anomalies {
            rules.require(row.flagged == (row.rate > row.prior_rate * 1.5), || {
                format!("discountAnomalies.{}: flag disagrees with rates", row.month)
            });
        }
    }
}

impl Schema for InquiryView {
    const NAME: &'static str = "inquiry";

    fn check(&self, rules: &mut RuleSet) {
        rules.non_empty("lastUpdated", &self.last_updated);
        rules.require(!self.inquiries.is_empty(), || "inquiries must not be empty".to_string());
        rules.unique("inquiries", self.inquiries.iter().map(|row| row.id.as_str()));
        for row in &self.inquiries {
            rules.non_empty(&format!("inquiries.{}.request", row.id), &row.request);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::views::{Inquiry, InquiryStatus};

    fn inquiry(id: &str) -> Inquiry {
        Inquiry {
            id: id.to_string(),
            request: "Reconcile AP aging".to_string(),
            owner: "Controller".to_string(),
            due_date: "2026-02-15".to_string(),
            status: InquiryStatus::Open,
            blocking: true,
        }
    }

    #[test]
    fn accepts_well_formed_payload() {
        let view = InquiryView {
            last_updated: "2026-02-11T16:20:00.000Z".to_string(),
            inquiries: vec![inquiry("INQ-1001"), inquiry("INQ-1002")],
        };
        assert_eq!(validate(view.clone()), Ok(view));
    }

    #[test]
    fn reports_every_violated_rule() {
        let view = InquiryView {
            last_updated: String::new(),
            inquiries: vec![inquiry("INQ-1001"), inquiry("INQ-1001")],
        };
        let violation = validate(view).expect_err("duplicate ids are rejected");
        assert_eq!(violation.payload, "inquiry");
        assert_eq!(violation.rules.len(), 2);
        assert!(violation.to_string().contains("duplicate id INQ-1001"));
    }

    #[test]
    fn non_finite_numbers_fail_the_parse_step() {
        let mut row = crate::reports::views::DiscountAnomaly {
            month: "Feb-26".to_string(),
            rate: 0.03,
            prior_rate: 0.02,
            flagged: true,
        };
        row.rate = f64::NAN;
        let view = CustomerView {
            last_updated: "now".to_string(),
            metrics: Vec::new(),
            top_trend: Vec::new(),
            discount_anomalies: vec![row],
        };
        let violation = validate(view).expect_err("NaN is rejected");
        assert_eq!(violation.rules.len(), 1);
        assert!(violation.rules[0].contains("null"), "{:?}", violation.rules);
    }
}
