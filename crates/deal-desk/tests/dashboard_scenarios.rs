use chrono::{DateTime, TimeZone, Utc};
use deal_desk::decision::{build_decision_queue, Readiness, DRAFT_RISK_SCORE, MAX_ITEMS};
use deal_desk::reports::{
    analysis_report, customer_report, documents_report, inquiry_report, risk_report,
    summary_report,
};
use deal_desk::synthesis::{
    resolve_profile, seasonality_factor, synthesize_trend, volatility_factor, Basis, DealContext,
    Period, ProfileSource, TieOutRow, TieOutStatus,
};

const DEALS: [&str; 8] = [
    "Apple",
    "Tesla",
    "Microsoft",
    "Meridian Logistics",
    "Zenith",
    "Project Atlas",
    "Zyphon Holdings",
    "Kestrel Foods",
];

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 11, 16, 20, 0)
        .single()
        .expect("valid timestamp")
}

fn contexts() -> impl Iterator<Item = DealContext> {
    DEALS.into_iter().flat_map(|deal| {
        Period::ordered().into_iter().flat_map(move |period| {
            Basis::ordered()
                .into_iter()
                .map(move |basis| DealContext::new(deal, period, basis, as_of()))
        })
    })
}

#[test]
fn every_view_is_byte_identical_for_a_fixed_context() {
    for deal in ["Tesla", "Zyphon Holdings"] {
        let ctx = DealContext::new(deal, Period::Quarterly, Basis::Normalized, as_of());
        let first = serde_json::to_string(&summary_report(&ctx).expect("summary")).expect("json");
        let again = serde_json::to_string(&summary_report(&ctx).expect("summary")).expect("json");
        assert_eq!(first, again);

        let first = serde_json::to_string(&analysis_report(&ctx).expect("analysis")).expect("json");
        let again = serde_json::to_string(&analysis_report(&ctx).expect("analysis")).expect("json");
        assert_eq!(first, again);

        let first = serde_json::to_string(&build_decision_queue(&ctx).expect("queue")).expect("json");
        let again = serde_json::to_string(&build_decision_queue(&ctx).expect("queue")).expect("json");
        assert_eq!(first, again);
    }
}

#[test]
fn every_selection_produces_valid_payloads() {
    for ctx in contexts() {
        let label = format!("{} / {} / {}", ctx.deal, ctx.period, ctx.basis);
        summary_report(&ctx).unwrap_or_else(|err| panic!("{label}: {err}"));
        analysis_report(&ctx).unwrap_or_else(|err| panic!("{label}: {err}"));
        risk_report(&ctx).unwrap_or_else(|err| panic!("{label}: {err}"));
        documents_report(&ctx).unwrap_or_else(|err| panic!("{label}: {err}"));
        customer_report(&ctx).unwrap_or_else(|err| panic!("{label}: {err}"));
        inquiry_report(&ctx).unwrap_or_else(|err| panic!("{label}: {err}"));
        build_decision_queue(&ctx).unwrap_or_else(|err| panic!("{label}: {err}"));
    }
}

#[test]
fn apple_resolves_through_its_named_scenario() {
    let profile = resolve_profile("Apple");
    assert_eq!(profile.source, ProfileSource::Named("apple"));
    assert_eq!(profile.params.base_revenue_ltm, 91.4);
    assert_eq!(profile.params.risk_tilt, 0.22);

    let trend = synthesize_trend(&profile, Period::Monthly, Basis::Reported);
    let expected =
        91.4 / 12.0 * 1.0 * seasonality_factor(&profile, 0) * 1.0 * volatility_factor(&profile, 0);
    assert!((trend.points()[0].revenue - expected).abs() <= 0.005);
}

#[test]
fn unseen_deal_resolves_to_a_stable_fallback() {
    let first = resolve_profile("Zyphon Holdings");
    let second = resolve_profile("  zyphon holdings ");
    assert_eq!(first.source, ProfileSource::Seeded);
    assert_eq!(first.seed, second.seed);
    assert_eq!(first.params, second.params);
    assert!((0.15..=0.95).contains(&first.params.risk_tilt));
    assert!((38.0..=100.0).contains(&first.params.base_revenue_ltm));
}

#[test]
fn tie_out_thresholds_hold_for_every_row() {
    for ctx in contexts() {
        let risk = risk_report(&ctx).expect("risk view");
        for row in &risk.tie_outs {
            let expected = if row.variance_pct <= row.tolerance_pct {
                TieOutStatus::Pass
            } else if row.variance_pct <= row.tolerance_pct * 1.5 {
                TieOutStatus::Warn
            } else {
                TieOutStatus::Fail
            };
            assert_eq!(row.status, expected, "{} / {}", ctx.deal, row.name);
        }
    }
}

#[test]
fn variance_beyond_the_warning_band_fails() {
    let row = TieOutRow::from_variance("TB <-> BS (A=L+E)", 100.0, 0.39, 0.2);
    assert_eq!(row.status, TieOutStatus::Fail);
}

#[test]
fn readiness_follows_blocking_items_failures_and_score() {
    for ctx in contexts() {
        let risk = risk_report(&ctx).expect("risk view");
        let queue = build_decision_queue(&ctx).expect("queue");
        let any_blocking = queue.items.iter().any(|item| item.blocking);
        let any_fail = risk
            .tie_outs
            .iter()
            .any(|row| row.status == TieOutStatus::Fail);

        let expected = if any_blocking || any_fail {
            Readiness::Blocked
        } else if risk.risk_score >= DRAFT_RISK_SCORE {
            Readiness::Draft
        } else {
            Readiness::Ready
        };
        assert_eq!(queue.readiness, expected, "{}", ctx.deal);
        assert!(queue.items.len() <= MAX_ITEMS);
        assert!(queue.degraded_sources.is_empty());
    }
}

#[test]
fn queue_scores_decay_within_each_category() {
    for ctx in contexts() {
        let queue = build_decision_queue(&ctx).expect("queue");
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
            assert!(
                ranked
                    .windows(2)
                    .all(|pair| pair[0].impact_score > pair[1].impact_score),
                "{} {prefix}",
                ctx.deal
            );
        }
    }
}

#[test]
fn ranges_hold_across_views() {
    for ctx in contexts() {
        let risk = risk_report(&ctx).expect("risk view");
        assert!((1.4..=9.6).contains(&risk.risk_score));
        assert!(risk
            .dimensions
            .iter()
            .all(|dimension| (1.5..=9.7).contains(&dimension.score)));

        let summary = summary_report(&ctx).expect("summary view");
        assert!(summary
            .trend
            .iter()
            .all(|point| (-10.0..=88.0).contains(&point.cash_conversion)));
    }
}

#[test]
fn documents_ignore_reporting_selection() {
    let monthly = documents_report(&DealContext::new(
        "Meridian",
        Period::Monthly,
        Basis::Reported,
        as_of(),
    ))
    .expect("documents view");
    let annual = documents_report(&DealContext::new(
        "Meridian",
        Period::Annual,
        Basis::ProForma,
        as_of(),
    ))
    .expect("documents view");
    assert_eq!(monthly, annual);
}
