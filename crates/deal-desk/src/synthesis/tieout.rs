use super::aggregate::LtmAggregates;
use super::noise::{deterministic_noise, round_to};
use super::profile::CompanyProfile;
use serde::{Deserialize, Serialize};

/// Warn band upper bound, as a multiple of the tolerance.
pub const WARN_BAND: f64 = 1.5;
const VARIANCE_FLOOR: f64 = 0.04;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TieOutStatus {
    Pass,
    Warn,
    Fail,
}

impl TieOutStatus {
    /// Pass within tolerance, Warn within 1.5x tolerance, Fail beyond.
    pub fn classify(variance_pct: f64, tolerance_pct: f64) -> Self {
        if variance_pct <= tolerance_pct {
            Self::Pass
        } else if variance_pct <= tolerance_pct * WARN_BAND {
            Self::Warn
        } else {
            Self::Fail
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "Pass",
            Self::Warn => "Warn",
            Self::Fail => "Fail",
        }
    }
}

/// One reconciliation between two independently sourced figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TieOutRow {
    pub name: String,
    pub expected: f64,
    pub observed: f64,
    pub diff: f64,
    pub variance_pct: f64,
    pub tolerance_pct: f64,
    pub status: TieOutStatus,
}

impl TieOutRow {
    /// Builds a row from an expected figure and a computed variance.
    pub fn from_variance(name: &str, expected: f64, variance_pct: f64, tolerance_pct: f64) -> Self {
        let observed = expected * (1.0 - variance_pct / 100.0);
        Self {
            name: name.to_string(),
            expected: expected.round(),
            observed: observed.round(),
            diff: (observed - expected).round(),
            variance_pct,
            tolerance_pct,
            status: TieOutStatus::classify(variance_pct, tolerance_pct),
        }
    }
}

struct TieOutTemplate {
    name: &'static str,
    expected: fn(&LtmAggregates) -> f64,
    tolerance_pct: f64,
}

const TEMPLATES: [TieOutTemplate; 6] = [
    TieOutTemplate {
        name: "TB <-> IS (Revenue)",
        expected: |ltm| ltm.revenue_ltm,
        tolerance_pct: 0.25,
    },
    TieOutTemplate {
        name: "TB <-> BS (A=L+E)",
        expected: |ltm| ltm.revenue_ltm * 2.02,
        tolerance_pct: 0.2,
    },
    TieOutTemplate {
        name: "AR Aging <-> BS AR",
        expected: |ltm| ltm.avg_nwc * 0.98,
        tolerance_pct: 0.5,
    },
    TieOutTemplate {
        name: "AP Aging <-> BS AP",
        expected: |ltm| ltm.avg_nwc * 0.74,
        tolerance_pct: 1.0,
    },
    TieOutTemplate {
        name: "Cash <-> Bank",
        expected: |ltm| ltm.adjusted_ebitda_ltm * 0.24,
        tolerance_pct: 0.5,
    },
    TieOutTemplate {
        name: "GL rollforward <-> TB",
        expected: |ltm| ltm.revenue_ltm * 2.02,
        tolerance_pct: 0.4,
    },
];

/// Runs the six reconciliation checks for a deal.
pub fn evaluate_tie_outs(profile: &CompanyProfile, ltm: &LtmAggregates) -> Vec<TieOutRow> {
    TEMPLATES
        .iter()
        .enumerate()
        .map(|(idx, template)| {
            let alternation = if idx % 2 == 0 { 0.84 } else { 1.09 };
            let spread = 0.45
                + profile.params.risk_tilt * 1.45
                + deterministic_noise(profile.seed, idx as u64 + 120) * 1.25;
            let variance_pct =
                round_to((template.tolerance_pct * spread * alternation).max(VARIANCE_FLOOR), 2);

            TieOutRow::from_variance(
                template.name,
                (template.expected)(ltm),
                variance_pct,
                template.tolerance_pct,
            )
        })
        .collect()
}

pub fn count_status(rows: &[TieOutRow], status: TieOutStatus) -> usize {
    rows.iter().filter(|row| row.status == status).count()
}
