use super::metric::{formula, whole_pct, MetricBuilder};
use super::schema::validate;
use super::views::{CustomerView, DiscountAnomaly, Metric, TopTrendPoint};
use super::ReportError;
use crate::synthesis::noise::round_to;
use crate::synthesis::{DealContext, DealSnapshot, ScenarioParams, Severity, MONTHS};

/// A month is flagged when its discount rate exceeds the prior rate by this factor.
pub const DISCOUNT_SPIKE_RATIO: f64 = 1.5;
const SPIKE_MONTHS: usize = 2;

fn top_trend(snapshot: &DealSnapshot) -> Vec<TopTrendPoint> {
    let top10_base = snapshot.top10_concentration();
    let top1_base = snapshot.top1_concentration();
    let seed = snapshot.profile.seed;
    let multiplier = snapshot.multiplier;

    MONTHS
        .iter()
        .enumerate()
        .map(|(idx, month)| {
            let step = idx as f64;
            let top1 = top1_base
                + step * 0.07 * multiplier
                + ((step + (seed % 5) as f64) / 3.0).sin() * 0.08;
            let top10 = top10_base
                + step * 0.11 * multiplier
                + ((step + (seed % 7) as f64) / 3.0).cos() * 0.14;
            TopTrendPoint {
                month: (*month).to_string(),
                top1: round_to(top1, 2),
                top10: round_to(top10, 2),
            }
        })
        .collect()
}

/// Monthly discount rates against the prior period; the final months spike.
pub fn discount_anomalies(params: &ScenarioParams) -> Vec<DiscountAnomaly> {
    let risk = params.discount_risk;
    MONTHS
        .iter()
        .enumerate()
        .map(|(idx, month)| {
            let prior = 0.024 + idx as f64 * (0.001 + risk * 0.0005);
            let spike = if idx >= MONTHS.len() - SPIKE_MONTHS {
                1.2 + risk * 0.9
            } else {
                1.0 + risk * 0.35
            };
            let prior_rate = round_to(prior, 4);
            let rate = round_to(prior * spike, 4);
            DiscountAnomaly {
                month: (*month).to_string(),
                rate,
                prior_rate,
                flagged: rate > prior_rate * DISCOUNT_SPIKE_RATIO,
            }
        })
        .collect()
}

fn metrics(
    params: &ScenarioParams,
    trend: &[TopTrendPoint],
    anomalies: &[DiscountAnomaly],
) -> Vec<Metric> {
    let latest = trend.last();
    let top10 = latest.map(|point| point.top10).unwrap_or_default();
    let top1 = latest.map(|point| point.top1).unwrap_or_default();
    let nrr = (95.0 + params.recurring_revenue_pct * 0.22 - params.risk_tilt * 9.0).clamp(78.0, 128.0);
    let flagged = anomalies.iter().filter(|row| row.flagged).count();

    vec![
        MetricBuilder::new("cust-top10", "Top 10 concentration %", formula::REVENUE)
            .value(whole_pct(top10))
            .build(),
        MetricBuilder::new("cust-largest", "Largest customer %", formula::REVENUE)
            .value(whole_pct(top1))
            .build(),
        MetricBuilder::new("cust-nrr", "NRR proxy", formula::NRR)
            .value(whole_pct(nrr))
            .build(),
        MetricBuilder::new("cust-disc", "#discount anomalies", formula::DISCOUNT)
            .value(flagged.to_string())
            .severity(Severity::from_count(flagged, 1, 3))
            .build(),
    ]
}

pub fn build_customer(ctx: &DealContext) -> CustomerView {
    let snapshot = DealSnapshot::compute(ctx);
    let params = &snapshot.profile.params;
    let top_trend = top_trend(&snapshot);
    let discount_anomalies = discount_anomalies(params);

    CustomerView {
        last_updated: ctx.timestamp(),
        metrics: metrics(params, &top_trend, &discount_anomalies),
        top_trend,
        discount_anomalies,
    }
}

pub fn customer_report(ctx: &DealContext) -> Result<CustomerView, ReportError> {
    Ok(validate(build_customer(ctx))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::resolve_profile;

    #[test]
    fn only_final_months_spike_for_aggressive_discounting() {
        let rows = discount_anomalies(&resolve_profile("Tesla").params);
        let flagged: Vec<_> = rows
            .iter()
            .filter(|row| row.flagged)
            .map(|row| row.month.as_str())
            .collect();
        assert_eq!(flagged, vec!["Jan-26", "Feb-26"]);
    }

    #[test]
    fn mild_discounting_raises_no_flags() {
        let rows = discount_anomalies(&resolve_profile("Microsoft").params);
        assert!(rows.iter().all(|row| !row.flagged));
        assert!(rows.windows(2).all(|pair| pair[0].prior_rate < pair[1].prior_rate));
    }
}
