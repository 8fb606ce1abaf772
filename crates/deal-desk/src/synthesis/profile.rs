use super::noise::{deterministic_noise, seed_from_name};
use serde::Serialize;

/// Tunable parameters describing one deal's growth and risk archetype.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioParams {
    pub base_revenue_ltm: f64,
    pub monthly_growth: f64,
    pub seasonality_amp: f64,
    pub volatility_amp: f64,
    pub reported_margin: f64,
    pub adjustment_pct_base: f64,
    pub nwc_pct: f64,
    pub cash_conv_base: f64,
    pub risk_tilt: f64,
    pub top10_concentration: f64,
    pub top1_ratio: f64,
    pub recurring_revenue_pct: f64,
    pub missing_coverage_bias: f64,
    pub parsing_quality: f64,
    pub discount_risk: f64,
}

/// How a profile was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum ProfileSource {
    Named(&'static str),
    Seeded,
}

/// Scenario parameters bound to a specific deal name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub source: ProfileSource,
    pub display_name: String,
    pub seed: u64,
    pub params: ScenarioParams,
}

struct NamedScenario {
    key: &'static str,
    params: ScenarioParams,
}

const NAMED_SCENARIOS: [NamedScenario; 6] = [
    NamedScenario {
        key: "apple",
        params: ScenarioParams {
            base_revenue_ltm: 91.4,
            monthly_growth: 0.0055,
            seasonality_amp: 0.024,
            volatility_amp: 0.018,
            reported_margin: 0.272,
            adjustment_pct_base: 0.048,
            nwc_pct: 0.084,
            cash_conv_base: 74.0,
            risk_tilt: 0.22,
            top10_concentration: 24.0,
            top1_ratio: 0.28,
            recurring_revenue_pct: 84.0,
            missing_coverage_bias: 0.14,
            parsing_quality: 0.97,
            discount_risk: 0.31,
        },
    },
    NamedScenario {
        key: "tesla",
        params: ScenarioParams {
            base_revenue_ltm: 58.6,
            monthly_growth: 0.0038,
            seasonality_amp: 0.043,
            volatility_amp: 0.041,
            reported_margin: 0.178,
            adjustment_pct_base: 0.098,
            nwc_pct: 0.148,
            cash_conv_base: 46.0,
            risk_tilt: 0.66,
            top10_concentration: 49.0,
            top1_ratio: 0.33,
            recurring_revenue_pct: 61.0,
            missing_coverage_bias: 0.42,
            parsing_quality: 0.89,
            discount_risk: 0.77,
        },
    },
    NamedScenario {
        key: "microsoft",
        params: ScenarioParams {
            base_revenue_ltm: 76.8,
            monthly_growth: 0.0048,
            seasonality_amp: 0.021,
            volatility_amp: 0.02,
            reported_margin: 0.258,
            adjustment_pct_base: 0.042,
            nwc_pct: 0.092,
            cash_conv_base: 71.0,
            risk_tilt: 0.26,
            top10_concentration: 27.0,
            top1_ratio: 0.25,
            recurring_revenue_pct: 83.0,
            missing_coverage_bias: 0.18,
            parsing_quality: 0.96,
            discount_risk: 0.28,
        },
    },
    NamedScenario {
        key: "meridian",
        params: ScenarioParams {
            base_revenue_ltm: 47.2,
            monthly_growth: 0.0023,
            seasonality_amp: 0.034,
            volatility_amp: 0.033,
            reported_margin: 0.186,
            adjustment_pct_base: 0.086,
            nwc_pct: 0.142,
            cash_conv_base: 43.0,
            risk_tilt: 0.62,
            top10_concentration: 45.0,
            top1_ratio: 0.31,
            recurring_revenue_pct: 64.0,
            missing_coverage_bias: 0.45,
            parsing_quality: 0.86,
            discount_risk: 0.69,
        },
    },
    NamedScenario {
        key: "zenith",
        params: ScenarioParams {
            base_revenue_ltm: 69.1,
            monthly_growth: 0.0042,
            seasonality_amp: 0.029,
            volatility_amp: 0.024,
            reported_margin: 0.224,
            adjustment_pct_base: 0.058,
            nwc_pct: 0.104,
            cash_conv_base: 63.0,
            risk_tilt: 0.34,
            top10_concentration: 31.0,
            top1_ratio: 0.27,
            recurring_revenue_pct: 78.0,
            missing_coverage_bias: 0.22,
            parsing_quality: 0.93,
            discount_risk: 0.36,
        },
    },
    NamedScenario {
        key: "atlas",
        params: ScenarioParams {
            base_revenue_ltm: 63.7,
            monthly_growth: 0.0031,
            seasonality_amp: 0.03,
            volatility_amp: 0.026,
            reported_margin: 0.192,
            adjustment_pct_base: 0.092,
            nwc_pct: 0.118,
            cash_conv_base: 52.0,
            risk_tilt: 0.49,
            top10_concentration: 41.0,
            top1_ratio: 0.29,
            recurring_revenue_pct: 69.0,
            missing_coverage_bias: 0.31,
            parsing_quality: 0.9,
            discount_risk: 0.57,
        },
    },
];

/// Keys of the hand-tuned scenarios, in match priority order.
pub fn named_scenario_keys() -> impl Iterator<Item = &'static str> {
    NAMED_SCENARIOS.iter().map(|scenario| scenario.key)
}

/// Resolves a deal name to its profile.
///
/// Total and deterministic: a case-insensitive substring hit on a named scenario
/// wins, otherwise parameters are derived from the name's seed.
pub fn resolve_profile(deal: &str) -> CompanyProfile {
    let display_name = deal.trim().to_string();
    let normalized = display_name.to_lowercase();
    let seed = seed_from_name(&display_name);

    match NAMED_SCENARIOS
        .iter()
        .find(|scenario| normalized.contains(scenario.key))
    {
        Some(scenario) => CompanyProfile {
            source: ProfileSource::Named(scenario.key),
            display_name,
            seed,
            params: scenario.params,
        },
        None => CompanyProfile {
            source: ProfileSource::Seeded,
            display_name,
            seed,
            params: seeded_params(seed),
        },
    }
}

fn seeded_params(seed: u64) -> ScenarioParams {
    let r1 = deterministic_noise(seed, 1);
    let r2 = deterministic_noise(seed, 2);
    let r3 = deterministic_noise(seed, 3);
    let r4 = deterministic_noise(seed, 4);

    ScenarioParams {
        base_revenue_ltm: 38.0 + r1 * 62.0,
        monthly_growth: -0.003 + r2 * 0.013,
        seasonality_amp: 0.02 + r3 * 0.05,
        volatility_amp: 0.02 + r4 * 0.04,
        reported_margin: 0.13 + r2 * 0.14,
        adjustment_pct_base: 0.03 + r3 * 0.12,
        nwc_pct: 0.08 + r4 * 0.08,
        cash_conv_base: 30.0 + r1 * 40.0,
        risk_tilt: 0.15 + r3 * 0.8,
        top10_concentration: 26.0 + r2 * 27.0,
        top1_ratio: 0.24 + r4 * 0.12,
        recurring_revenue_pct: 56.0 + r1 * 28.0,
        missing_coverage_bias: 0.2 + r3 * 0.5,
        parsing_quality: 0.82 + r4 * 0.14,
        discount_risk: 0.25 + r2 * 0.7,
    }
}
