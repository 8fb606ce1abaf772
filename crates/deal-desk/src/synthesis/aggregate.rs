use super::trend::Trend;
use serde::Serialize;

/// Trailing-twelve-month roll-up of a synthesized trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LtmAggregates {
    pub revenue_ltm: f64,
    pub reported_ebitda_ltm: f64,
    pub adjusted_ebitda_ltm: f64,
    pub ocf_ltm: f64,
    pub avg_nwc: f64,
    pub avg_cash_conversion: f64,
    /// Adjusted minus reported EBITDA, $M.
    pub adjustments: f64,
    /// Adjustments as a percent of reported EBITDA.
    pub adjustment_pct: f64,
}

impl LtmAggregates {
    pub fn from_trend(trend: &Trend) -> Self {
        let months = trend.len().max(1) as f64;
        let sum = |field: fn(&super::trend::TimePoint) -> f64| trend.iter().map(field).sum::<f64>();

        let revenue_ltm = sum(|point| point.revenue);
        let reported_ebitda_ltm = sum(|point| point.reported_ebitda);
        let adjusted_ebitda_ltm = sum(|point| point.adjusted_ebitda);
        let ocf_ltm = sum(|point| point.ocf);
        let avg_nwc = sum(|point| point.nwc) / months;
        let avg_cash_conversion = sum(|point| point.cash_conversion) / months;
        let adjustments = adjusted_ebitda_ltm - reported_ebitda_ltm;
        let adjustment_pct = adjustments / reported_ebitda_ltm.max(0.1) * 100.0;

        Self {
            revenue_ltm,
            reported_ebitda_ltm,
            adjusted_ebitda_ltm,
            ocf_ltm,
            avg_nwc,
            avg_cash_conversion,
            adjustments,
            adjustment_pct,
        }
    }

    /// Adjusted EBITDA margin, percent of revenue.
    pub fn adjusted_margin_pct(&self) -> f64 {
        self.adjusted_ebitda_ltm / self.revenue_ltm.max(0.1) * 100.0
    }

    /// Reported EBITDA margin, percent of revenue.
    pub fn reported_margin_pct(&self) -> f64 {
        self.reported_ebitda_ltm / self.revenue_ltm.max(0.1) * 100.0
    }

    /// Proposed working-capital peg.
    pub fn nwc_peg(&self) -> f64 {
        self.avg_nwc * 1.03
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::domain::{Basis, Period};
    use crate::synthesis::profile::resolve_profile;
    use crate::synthesis::trend::synthesize_trend;

    #[test]
    fn sums_and_averages_match_the_trend() {
        let trend = synthesize_trend(&resolve_profile("Tesla"), Period::Quarterly, Basis::Normalized);
        let ltm = LtmAggregates::from_trend(&trend);

        let revenue: f64 = trend.iter().map(|point| point.revenue).sum();
        let nwc: f64 = trend.iter().map(|point| point.nwc).sum::<f64>() / 12.0;
        assert!((ltm.revenue_ltm - revenue).abs() < 1e-9);
        assert!((ltm.avg_nwc - nwc).abs() < 1e-9);
        assert!(
            (ltm.adjustments - (ltm.adjusted_ebitda_ltm - ltm.reported_ebitda_ltm)).abs() < 1e-9
        );
    }

    #[test]
    fn adjustment_pct_tracks_monthly_uplift() {
        let trend = synthesize_trend(&resolve_profile("Apple"), Period::Monthly, Basis::Reported);
        let ltm = LtmAggregates::from_trend(&trend);
        // Apple's base uplift is 4.8% with +-1% monthly noise.
        assert!(ltm.adjustment_pct > 3.5 && ltm.adjustment_pct < 6.0, "{}", ltm.adjustment_pct);
    }

    #[test]
    fn near_zero_ebitda_uses_floor_divisor() {
        let trend: Trend = serde_json::from_value(serde_json::json!([
            {"month": "Mar-25", "revenue": 0.0, "adjustedEbitda": 0.02, "reportedEbitda": 0.0,
             "nwc": 0.0, "cashConversion": 0.0, "ocf": 0.0}
        ]))
        .expect("valid trend");
        let ltm = LtmAggregates::from_trend(&trend);
        assert!((ltm.adjustment_pct - 20.0).abs() < 1e-9);
        assert!(ltm.adjusted_margin_pct().is_finite());
    }
}
