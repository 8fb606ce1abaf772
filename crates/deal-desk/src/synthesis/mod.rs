//! Deterministic scenario synthesis.
//!
//! Data flows one way: seed, profile, trend, LTM aggregates, then the risk score
//! and tie-outs. Every function here is a pure transform of its inputs.

mod aggregate;
pub mod domain;
pub mod noise;
mod profile;
mod risk;
mod tieout;
mod trend;

pub use aggregate::LtmAggregates;
pub use domain::{
    model_multiplier, Basis, DealContext, DealQuery, ParseSelectionError, Period, Severity,
    DEFAULT_DEAL,
};
pub use noise::{deterministic_noise, seed_from_name};
pub use profile::{named_scenario_keys, resolve_profile, CompanyProfile, ProfileSource, ScenarioParams};
pub use risk::{
    risk_dimensions, risk_score, RiskDimension, DIMENSION_SCORE_RANGE, RISK_DIMENSIONS,
    RISK_SCORE_RANGE,
};
pub use tieout::{count_status, evaluate_tie_outs, TieOutRow, TieOutStatus, WARN_BAND};
pub use trend::{
    seasonality_factor, synthesize_trend, volatility_factor, TimePoint, Trend,
    ADJUSTMENT_PCT_RANGE, CASH_CONVERSION_RANGE, MONTHS,
};

/// Profile, trend, aggregates, and composite risk for one request context.
///
/// Builders compute their own snapshot from the context rather than sharing one,
/// which keeps every view a function of `(deal, period, basis)` alone.
#[derive(Debug, Clone)]
pub struct DealSnapshot {
    pub profile: CompanyProfile,
    pub trend: Trend,
    pub ltm: LtmAggregates,
    pub multiplier: f64,
    pub risk_score: f64,
}

impl DealSnapshot {
    pub fn compute(ctx: &DealContext) -> Self {
        let profile = resolve_profile(&ctx.deal);
        let trend = synthesize_trend(&profile, ctx.period, ctx.basis);
        let ltm = LtmAggregates::from_trend(&trend);
        let multiplier = ctx.multiplier();
        let risk_score = risk_score(&profile, &ltm, multiplier);

        Self {
            profile,
            trend,
            ltm,
            multiplier,
            risk_score,
        }
    }

    /// Risk score as displayed: one decimal place.
    pub fn displayed_risk_score(&self) -> f64 {
        noise::round_to(self.risk_score, 1)
    }

    pub fn tie_outs(&self) -> Vec<TieOutRow> {
        evaluate_tie_outs(&self.profile, &self.ltm)
    }

    pub fn dimensions(&self) -> Vec<RiskDimension> {
        risk_dimensions(&self.profile, self.risk_score)
    }

    /// Top-10 customer concentration base, percent of revenue.
    pub fn top10_concentration(&self) -> f64 {
        let params = &self.profile.params;
        (params.top10_concentration + params.risk_tilt * 3.0 + (self.multiplier - 1.0) * 8.0)
            .clamp(20.0, 70.0)
    }

    /// Largest-customer concentration base, percent of revenue.
    pub fn top1_concentration(&self) -> f64 {
        (self.top10_concentration() * self.profile.params.top1_ratio).clamp(6.0, 25.0)
    }
}
