use chrono::{DateTime, TimeZone, Utc};
use deal_desk::decision::{build_decision_queue, Readiness, DRAFT_RISK_SCORE, MAX_ITEMS};
use deal_desk::reports::{risk_report, summary_report};
use deal_desk::synthesis::{
    resolve_profile, seed_from_name, synthesize_trend, Basis, DealContext, Period,
    ProfileSource, TieOutStatus,
};
use proptest::prelude::*;

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 11, 16, 20, 0)
        .single()
        .expect("valid timestamp")
}

fn period() -> impl Strategy<Value = Period> {
    prop::sample::select(Period::ordered().to_vec())
}

fn basis() -> impl Strategy<Value = Basis> {
    prop::sample::select(Basis::ordered().to_vec())
}

#[test]
fn zyphon_fallback_is_pinned() {
    let profile = resolve_profile("Zyphon Holdings");
    assert_eq!(profile.source, ProfileSource::Seeded);
    assert_eq!(seed_from_name("Zyphon Holdings"), 12423);
    assert_eq!(profile.seed, 12423);
    assert!((profile.params.base_revenue_ltm - 62.897_125_306_8).abs() < 1e-6);
    assert!((profile.params.risk_tilt - 0.865_328_125_7).abs() < 1e-6);
}

proptest! {
    #[test]
    fn trend_ranges_hold_for_any_deal(deal in "\\PC{0,40}", period in period(), basis in basis()) {
        let trend = synthesize_trend(&resolve_profile(&deal), period, basis);
        prop_assert_eq!(trend.len(), 12);
        for point in &trend {
            prop_assert!((-10.0..=88.0).contains(&point.cash_conversion));
            prop_assert!((0.01..=0.23).contains(&point.adjustment_pct));
            prop_assert!(point.revenue >= 0.0);
        }
    }

    #[test]
    fn risk_view_laws_hold_for_any_deal(deal in "\\PC{0,40}", period in period(), basis in basis()) {
        let ctx = DealContext::new(&deal, period, basis, as_of());
        let risk = risk_report(&ctx).expect("risk view validates");

        prop_assert!((1.4..=9.6).contains(&risk.risk_score));
        for dimension in &risk.dimensions {
            prop_assert!((1.5..=9.7).contains(&dimension.score));
        }
        for row in &risk.tie_outs {
            let expected = if row.variance_pct <= row.tolerance_pct {
                TieOutStatus::Pass
            } else if row.variance_pct <= row.tolerance_pct * 1.5 {
                TieOutStatus::Warn
            } else {
                TieOutStatus::Fail
            };
            prop_assert_eq!(row.status, expected);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn payloads_are_deterministic_for_any_deal(deal in "\\PC{0,40}", period in period(), basis in basis()) {
        let ctx = DealContext::new(&deal, period, basis, as_of());
        let first = serde_json::to_string(&summary_report(&ctx).expect("summary")).expect("json");
        let again = serde_json::to_string(&summary_report(&ctx).expect("summary")).expect("json");
        prop_assert_eq!(first, again);

        let first = build_decision_queue(&ctx).expect("queue");
        let again = build_decision_queue(&ctx).expect("queue");
        prop_assert_eq!(first, again);
    }

    #[test]
    fn queue_laws_hold_for_any_deal(deal in "\\PC{0,40}", period in period(), basis in basis()) {
        let ctx = DealContext::new(&deal, period, basis, as_of());
        let risk = risk_report(&ctx).expect("risk view");
        let queue = build_decision_queue(&ctx).expect("queue");

        prop_assert!(queue.items.len() <= MAX_ITEMS);
        prop_assert!(queue
            .items
            .windows(2)
            .all(|pair| pair[0].impact_score >= pair[1].impact_score));

        for prefix in ["dq-risk-fail-", "dq-risk-warn-", "dq-inquiry-", "dq-adjustment-", "dq-docs-"] {
            let mut ranked: Vec<_> = queue
                .items
                .iter()
                .filter(|item| item.id.starts_with(prefix))
                .collect();
            ranked.sort_by_key(|item| {
                item.id[prefix.len()..]
                    .parse::<usize>()
                    .expect("numeric rank suffix")
            });
            prop_assert!(ranked
                .windows(2)
                .all(|pair| pair[0].impact_score > pair[1].impact_score));
        }

        let any_fail = risk.tie_outs.iter().any(|row| row.status == TieOutStatus::Fail);
        let expected = if queue.items.iter().any(|item| item.blocking) || any_fail {
            Readiness::Blocked
        } else if risk.risk_score >= DRAFT_RISK_SCORE {
            Readiness::Draft
        } else {
            Readiness::Ready
        };
        prop_assert_eq!(queue.readiness, expected);
    }
}
