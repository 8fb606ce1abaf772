use super::domain::{model_multiplier, Basis, Period};
use super::noise::{deterministic_noise, round_to};
use super::profile::CompanyProfile;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Month labels of the trailing window, oldest first.
pub const MONTHS: [&str; 12] = [
    "Mar-25", "Apr-25", "May-25", "Jun-25", "Jul-25", "Aug-25", "Sep-25", "Oct-25", "Nov-25",
    "Dec-25", "Jan-26", "Feb-26",
];

pub const CASH_CONVERSION_RANGE: (f64, f64) = (-10.0, 88.0);
pub const ADJUSTMENT_PCT_RANGE: (f64, f64) = (0.01, 0.23);
const REPORTED_MARGIN_RANGE: (f64, f64) = (0.09, 0.36);

/// One synthesized month. Money figures are in $M.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TimePoint {
    pub month: String,
    pub revenue: f64,
    pub adjusted_ebitda: f64,
    pub reported_ebitda: f64,
    pub nwc: f64,
    pub cash_conversion: f64,
    pub ocf: f64,
    /// Adjustment uplift applied to reported EBITDA, as a fraction.
    #[serde(skip)]
    pub adjustment_pct: f64,
}

/// Twelve chronologically ordered months; read-only once synthesized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trend {
    points: Vec<TimePoint>,
}

impl Trend {
    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimePoint> {
        self.points.iter()
    }

    fn revenue_at(&self, idx: usize) -> f64 {
        self.points.get(idx).map(|point| point.revenue).unwrap_or(0.0)
    }

    fn last_revenue(&self) -> f64 {
        self.points.last().map(|point| point.revenue).unwrap_or(0.0)
    }

    /// Percent change of the final month against the month three back.
    pub fn last_quarter_change_pct(&self) -> f64 {
        let anchor = self.points.len().saturating_sub(4);
        (self.last_revenue() / self.revenue_at(anchor).max(0.1) - 1.0) * 100.0
    }

    /// Percent change of the final month against the first.
    pub fn window_growth_pct(&self) -> f64 {
        (self.last_revenue() / self.revenue_at(0).max(0.1) - 1.0) * 100.0
    }

    pub fn negative_ocf_months(&self) -> usize {
        self.points.iter().filter(|point| point.ocf < 0.0).count()
    }
}

impl<'a> IntoIterator for &'a Trend {
    type Item = &'a TimePoint;
    type IntoIter = std::slice::Iter<'a, TimePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

fn phase(profile: &CompanyProfile, month_idx: usize) -> f64 {
    month_idx as f64 / 12.0 * TAU + (profile.seed % 9) as f64 * 0.15
}

/// Seasonal swing for a month: `1 + sin(phase) * seasonalityAmp`.
pub fn seasonality_factor(profile: &CompanyProfile, month_idx: usize) -> f64 {
    1.0 + phase(profile, month_idx).sin() * profile.params.seasonality_amp
}

/// Month-specific noise: `1 + (noise - 0.5) * volatilityAmp`.
pub fn volatility_factor(profile: &CompanyProfile, month_idx: usize) -> f64 {
    1.0 + (deterministic_noise(profile.seed, month_idx as u64 + 11) - 0.5)
        * profile.params.volatility_amp
}

/// Builds the twelve-month series for a profile under the given reporting selection.
pub fn synthesize_trend(profile: &CompanyProfile, period: Period, basis: Basis) -> Trend {
    let params = &profile.params;
    let seed = profile.seed;
    let base_monthly_revenue = params.base_revenue_ltm / 12.0 * model_multiplier(period, basis);

    let points = MONTHS
        .iter()
        .enumerate()
        .map(|(idx, month)| {
            let offset = idx as u64;
            let phase = phase(profile, idx);
            let growth = 1.0 + params.monthly_growth * idx as f64;
            let revenue = base_monthly_revenue
                * seasonality_factor(profile, idx)
                * growth
                * volatility_factor(profile, idx);

            let reported_margin = (params.reported_margin + (phase * 1.1).cos() * 0.008)
                .clamp(REPORTED_MARGIN_RANGE.0, REPORTED_MARGIN_RANGE.1);
            let reported_ebitda = revenue * reported_margin;

            let adjustment_pct = (params.adjustment_pct_base
                + (deterministic_noise(seed, offset + 101) - 0.5) * 0.02)
                .clamp(ADJUSTMENT_PCT_RANGE.0, ADJUSTMENT_PCT_RANGE.1);
            let adjusted_ebitda = reported_ebitda * (1.0 + adjustment_pct);

            let nwc =
                revenue * params.nwc_pct * (0.94 + deterministic_noise(seed, offset + 201) * 0.12);

            let cash_conversion = (params.cash_conv_base + (phase * 0.8).sin() * 6.0
                - params.adjustment_pct_base * 120.0
                + (deterministic_noise(seed, offset + 301) - 0.5) * 4.0)
                .clamp(CASH_CONVERSION_RANGE.0, CASH_CONVERSION_RANGE.1);
            let ocf = adjusted_ebitda * (cash_conversion / 100.0);

            TimePoint {
                month: (*month).to_string(),
                revenue: round_to(revenue, 2),
                adjusted_ebitda: round_to(adjusted_ebitda, 2),
                reported_ebitda: round_to(reported_ebitda, 2),
                nwc: round_to(nwc, 2),
                cash_conversion: round_to(cash_conversion, 1),
                ocf: round_to(ocf, 2),
                adjustment_pct,
            }
        })
        .collect();

    Trend { points }
}
