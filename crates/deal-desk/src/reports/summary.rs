use super::metric::{formula, money_m, pct, whole_pct, MetricBuilder};
use super::schema::validate;
use super::views::{DeltaFeedItem, Insight, Metric, RiskBreakdown, SummaryView};
use super::ReportError;
use crate::synthesis::{DealContext, DealSnapshot, Severity};

/// Cash conversion below this is called out as drag in the narrative.
const HEALTHY_CONVERSION_PCT: f64 = 55.0;
const TARGET_CONVERSION_PCT: f64 = 60.0;

fn adjustment_severity(adjustment_pct: f64) -> Severity {
    if adjustment_pct > 10.0 {
        Severity::Red
    } else if adjustment_pct > 7.0 {
        Severity::Amber
    } else {
        Severity::Green
    }
}

fn conversion_severity(conversion_pct: f64) -> Severity {
    if conversion_pct < 30.0 {
        Severity::Red
    } else if conversion_pct < TARGET_CONVERSION_PCT {
        Severity::Amber
    } else {
        Severity::Green
    }
}

/// Red concentration count shown on the overview, driven by the composite score.
pub fn risk_breakdown(risk_score: f64) -> RiskBreakdown {
    let red: u32 = if risk_score >= 7.0 {
        3
    } else if risk_score >= 5.0 {
        2
    } else {
        1
    };
    RiskBreakdown {
        red,
        amber: (7 - red).max(2),
    }
}

fn metrics(snapshot: &DealSnapshot) -> Vec<Metric> {
    let ltm = &snapshot.ltm;
    let risk_score = snapshot.displayed_risk_score();
    vec![
        MetricBuilder::new("revenue-ltm", "Revenue (LTM)", formula::REVENUE)
            .value(money_m(ltm.revenue_ltm))
            .delta(pct(snapshot.trend.last_quarter_change_pct()))
            .build(),
        MetricBuilder::new("reported-ebitda", "Reported EBITDA (LTM)", formula::EBITDA)
            .value(money_m(ltm.reported_ebitda_ltm))
            .build(),
        MetricBuilder::new(
            "adjusted-ebitda",
            "Adjusted EBITDA (LTM)",
            formula::ADJUSTED_EBITDA,
        )
        .value(money_m(ltm.adjusted_ebitda_ltm))
        .build(),
        MetricBuilder::new("adj-pct", "Adjustments as % of EBITDA", formula::ADJUSTMENT_PCT)
            .value(pct(ltm.adjustment_pct))
            .severity(adjustment_severity(ltm.adjustment_pct))
            .build(),
        MetricBuilder::new("avg-nwc", "Avg NWC (LTM)", formula::NWC)
            .value(money_m(ltm.avg_nwc))
            .build(),
        MetricBuilder::new("nwc-peg", "Proposed NWC Peg", formula::PEG)
            .value(money_m(ltm.nwc_peg()))
            .build(),
        MetricBuilder::new(
            "cash-conv",
            "EBITDA -> Operating Cash Flow conversion %",
            formula::CASH_CONVERSION,
        )
        .value(whole_pct(ltm.avg_cash_conversion))
        .severity(conversion_severity(ltm.avg_cash_conversion))
        .build(),
        MetricBuilder::new("overall-risk", "Overall Deal Risk", formula::TIE_OUT)
            .value(format!("{risk_score:.1} / 10"))
            .severity(Severity::from_risk_score(risk_score))
            .build(),
    ]
}

fn insights(snapshot: &DealSnapshot) -> Vec<Insight> {
    let ltm = &snapshot.ltm;
    let realization = if ltm.avg_cash_conversion < HEALTHY_CONVERSION_PCT {
        "moderate drag"
    } else {
        "healthy realization"
    };

    vec![
        Insight {
            id: "insight-1".to_string(),
            title: "Normalization lift remains concentrated".to_string(),
            body: format!(
                "Adjusted EBITDA is {} with {} adjustment intensity for {}.",
                money_m(ltm.adjusted_ebitda_ltm),
                pct(ltm.adjustment_pct),
                snapshot.profile.display_name
            ),
        },
        Insight {
            id: "insight-2".to_string(),
            title: "Working capital drag easing".to_string(),
            body: format!(
                "Average NWC is {} and cash conversion is {}, indicating {realization}.",
                money_m(ltm.avg_nwc),
                whole_pct(ltm.avg_cash_conversion)
            ),
        },
        Insight {
            id: "insight-3".to_string(),
            title: "Revenue quality watchpoint".to_string(),
            body: format!(
                "Revenue run-rate is {}. Last-quarter movement is {}.",
                money_m(ltm.revenue_ltm),
                pct(snapshot.trend.last_quarter_change_pct())
            ),
        },
    ]
}

fn delta_feed(
    ctx: &DealContext,
    snapshot: &DealSnapshot,
    breakdown: RiskBreakdown,
) -> Vec<DeltaFeedItem> {
    let ltm = &snapshot.ltm;
    let conversion = if ltm.avg_cash_conversion < TARGET_CONVERSION_PCT {
        "below target"
    } else {
        "within target"
    };
    let name = &snapshot.profile.display_name;

    [
        (
            "New File",
            format!(
                "{name} source package refreshed ({}, {}).",
                ctx.period, ctx.basis
            ),
            14,
        ),
        (
            "Adjustment",
            format!("Adjustment intensity recalculated at {}.", pct(ltm.adjustment_pct)),
            28,
        ),
        (
            "Tie-out",
            format!(
                "Risk score now {:.1}/10 with {} red concentrations.",
                snapshot.displayed_risk_score(), breakdown.red
            ),
            46,
        ),
        (
            "Anomaly",
            format!("Cash conversion trend is {conversion} for {name}."),
            61,
        ),
    ]
    .into_iter()
    .enumerate()
    .map(|(idx, (kind, message, minutes))| DeltaFeedItem {
        id: format!("d{}", idx + 1),
        kind: kind.to_string(),
        message,
        timestamp: ctx.minutes_before(minutes),
    })
    .collect()
}

/// Executive overview: headline metrics, trend, narrative, and recent changes.
pub fn build_summary(ctx: &DealContext) -> SummaryView {
    let snapshot = DealSnapshot::compute(ctx);
    let breakdown = risk_breakdown(snapshot.displayed_risk_score());

    SummaryView {
        last_updated: ctx.timestamp(),
        metrics: metrics(&snapshot),
        insights: insights(&snapshot),
        delta_feed: delta_feed(ctx, &snapshot, breakdown),
        risk_breakdown: breakdown,
        trend: snapshot.trend,
    }
}

pub fn summary_report(ctx: &DealContext) -> Result<SummaryView, ReportError> {
    Ok(validate(build_summary(ctx))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::{Basis, Period};
    use chrono::{TimeZone, Utc};

    fn ctx(deal: &str) -> DealContext {
        let as_of = Utc
            .with_ymd_and_hms(2026, 2, 11, 16, 20, 0)
            .single()
            .expect("valid timestamp");
        DealContext::new(deal, Period::Monthly, Basis::Reported, as_of)
    }

    #[test]
    fn breakdown_follows_score_bands() {
        assert_eq!(risk_breakdown(7.2), RiskBreakdown { red: 3, amber: 4 });
        assert_eq!(risk_breakdown(5.0), RiskBreakdown { red: 2, amber: 5 });
        assert_eq!(risk_breakdown(3.1), RiskBreakdown { red: 1, amber: 6 });
    }

    #[test]
    fn summary_validates_and_shares_the_context_timestamp() {
        let view = summary_report(&ctx("Apple")).expect("valid summary");
        assert_eq!(view.last_updated, "2026-02-11T16:20:00.000Z");
        assert_eq!(view.delta_feed[0].timestamp, "2026-02-11T16:06:00.000Z");
        assert_eq!(view.delta_feed[3].timestamp, "2026-02-11T15:19:00.000Z");
        assert!(view.delta_feed[0].message.contains("(Monthly, Reported)"));
    }

    #[test]
    fn overall_risk_metric_matches_snapshot() {
        let context = ctx("Tesla");
        let snapshot = DealSnapshot::compute(&context);
        let view = build_summary(&context);
        let risk = view
            .metrics
            .iter()
            .find(|metric| metric.id == "overall-risk")
            .expect("risk metric present");
        let displayed = snapshot.displayed_risk_score();
        assert_eq!(risk.value, format!("{displayed:.1} / 10"));
        assert_eq!(risk.severity, Some(Severity::from_risk_score(displayed)));
    }

    #[test]
    fn adjustment_bands_are_strict() {
        assert_eq!(adjustment_severity(10.0), Severity::Amber);
        assert_eq!(adjustment_severity(10.01), Severity::Red);
        assert_eq!(adjustment_severity(7.0), Severity::Green);
        assert_eq!(conversion_severity(30.0), Severity::Amber);
        assert_eq!(conversion_severity(60.0), Severity::Green);
    }
}
