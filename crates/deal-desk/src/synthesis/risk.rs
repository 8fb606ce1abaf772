use super::aggregate::LtmAggregates;
use super::noise::{deterministic_noise, round_to};
use super::profile::CompanyProfile;
use serde::{Deserialize, Serialize};

pub const RISK_SCORE_RANGE: (f64, f64) = (1.4, 9.6);
pub const DIMENSION_SCORE_RANGE: (f64, f64) = (1.5, 9.7);

pub const RISK_DIMENSIONS: [&str; 6] = [
    "Data integrity",
    "Earnings quality",
    "Revenue quality",
    "Margin sustainability",
    "Working capital risk",
    "Cash flow risk",
];

/// Composite 0-10 deal risk score.
pub fn risk_score(profile: &CompanyProfile, ltm: &LtmAggregates, multiplier: f64) -> f64 {
    let cash_penalty = if ltm.avg_cash_conversion < 60.0 { 0.85 } else { 0.0 };
    let uplift_penalty = if multiplier > 1.03 { 0.25 } else { 0.0 };
    let working_capital_intensity = ltm.avg_nwc / ltm.revenue_ltm.max(1.0) * 11.0;

    let score = 3.2
        + profile.params.risk_tilt * 2.3
        + ltm.adjustment_pct * 0.08
        + cash_penalty
        + working_capital_intensity
        + uplift_penalty;

    score.clamp(RISK_SCORE_RANGE.0, RISK_SCORE_RANGE.1)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskDimension {
    pub subject: String,
    pub score: f64,
}

/// Per-dimension scores drifting deterministically around the composite score.
pub fn risk_dimensions(profile: &CompanyProfile, score: f64) -> Vec<RiskDimension> {
    RISK_DIMENSIONS
        .iter()
        .enumerate()
        .map(|(idx, subject)| {
            let drift = ((idx % 3) as f64 - 1.0) * 0.45
                + (deterministic_noise(profile.seed, idx as u64 + 40) - 0.5) * 0.8;
            let dimension = (score + drift + profile.params.risk_tilt * 0.5)
                .clamp(DIMENSION_SCORE_RANGE.0, DIMENSION_SCORE_RANGE.1);
            RiskDimension {
                subject: (*subject).to_string(),
                score: round_to(dimension, 1),
            }
        })
        .collect()
}
