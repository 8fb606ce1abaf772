use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deal used whenever a request arrives without a usable identifier.
pub const DEFAULT_DEAL: &str = "Project Atlas";

/// Reporting cadence selected by the analyst.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[default]
    Monthly,
    Quarterly,
    Annual,
}

impl Period {
    pub const fn ordered() -> [Self; 3] {
        [Self::Monthly, Self::Quarterly, Self::Annual]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Annual => "Annual",
        }
    }

    pub const fn factor(self) -> f64 {
        match self {
            Self::Monthly => 1.0,
            Self::Quarterly => 1.03,
            Self::Annual => 1.08,
        }
    }
}

/// Accounting basis the figures are presented on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Basis {
    #[default]
    Reported,
    Normalized,
    #[serde(rename = "Pro Forma")]
    ProForma,
}

impl Basis {
    pub const fn ordered() -> [Self; 3] {
        [Self::Reported, Self::Normalized, Self::ProForma]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Reported => "Reported",
            Self::Normalized => "Normalized",
            Self::ProForma => "Pro Forma",
        }
    }

    pub const fn factor(self) -> f64 {
        match self {
            Self::Reported => 1.0,
            Self::Normalized => 1.01,
            Self::ProForma => 1.06,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {kind} '{value}' (expected one of: {expected})")]
pub struct ParseSelectionError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl FromStr for Period {
    type Err = ParseSelectionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|period| period.label().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| ParseSelectionError {
                kind: "period",
                value: raw.to_string(),
                expected: "Monthly, Quarterly, Annual",
            })
    }
}

impl FromStr for Basis {
    type Err = ParseSelectionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().replace(['-', '_'], " ");
        Self::ordered()
            .into_iter()
            .find(|basis| basis.label().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ParseSelectionError {
                kind: "basis",
                value: raw.to_string(),
                expected: "Reported, Normalized, Pro Forma",
            })
    }
}

/// Combined period and basis uplift applied to synthesized revenue.
pub fn model_multiplier(period: Period, basis: Basis) -> f64 {
    period.factor() * basis.factor()
}

/// Three-band severity shared by metrics, risk dimensions, and registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Green,
    Amber,
    Red,
}

impl Severity {
    /// Standard bucketing for 0-10 risk scores.
    pub fn from_risk_score(score: f64) -> Self {
        if score >= 7.0 {
            Self::Red
        } else if score >= 4.5 {
            Self::Amber
        } else {
            Self::Green
        }
    }

    /// Bucketing for flag counts: Red at `red` or more, Amber at `amber` or more.
    pub fn from_count(count: usize, amber: usize, red: usize) -> Self {
        if count >= red {
            Self::Red
        } else if count >= amber {
            Self::Amber
        } else {
            Self::Green
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Green => "Green",
            Self::Amber => "Amber",
            Self::Red => "Red",
        }
    }
}

/// Raw query parameters as they arrive at the HTTP boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DealQuery {
    #[serde(default)]
    pub deal: Option<String>,
    #[serde(default)]
    pub period: Option<Period>,
    #[serde(default)]
    pub basis: Option<Basis>,
}

impl DealQuery {
    pub fn into_context(self, as_of: DateTime<Utc>) -> DealContext {
        DealContext::new(
            self.deal.as_deref().unwrap_or(DEFAULT_DEAL),
            self.period.unwrap_or_default(),
            self.basis.unwrap_or_default(),
            as_of,
        )
    }
}

/// Immutable request context every builder is a pure function of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealContext {
    pub deal: String,
    pub period: Period,
    pub basis: Basis,
    pub as_of: DateTime<Utc>,
}

impl DealContext {
    pub fn new(deal: &str, period: Period, basis: Basis, as_of: DateTime<Utc>) -> Self {
        let trimmed = deal.trim();
        let deal = if trimmed.is_empty() {
            DEFAULT_DEAL
        } else {
            trimmed
        };

        Self {
            deal: deal.to_string(),
            period,
            basis,
            as_of,
        }
    }

    pub fn multiplier(&self) -> f64 {
        model_multiplier(self.period, self.basis)
    }

    /// `lastUpdated` stamp shared by every payload built for this request.
    pub fn timestamp(&self) -> String {
        self.as_of.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn minutes_before(&self, minutes: i64) -> String {
        (self.as_of - chrono::Duration::minutes(minutes)).to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 11, 16, 20, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn missing_or_blank_deal_falls_back_to_default() {
        let ctx = DealQuery::default().into_context(as_of());
        assert_eq!(ctx.deal, DEFAULT_DEAL);
        assert_eq!(ctx.period, Period::Monthly);
        assert_eq!(ctx.basis, Basis::Reported);

        let blank = DealContext::new("   ", Period::Annual, Basis::ProForma, as_of());
        assert_eq!(blank.deal, DEFAULT_DEAL);
    }

    #[test]
    fn deal_names_are_trimmed() {
        let ctx = DealContext::new("  Apple Inc ", Period::Monthly, Basis::Reported, as_of());
        assert_eq!(ctx.deal, "Apple Inc");
    }

    #[test]
    fn multiplier_combines_period_and_basis() {
        assert_eq!(model_multiplier(Period::Monthly, Basis::Reported), 1.0);
        let annual_pro_forma = model_multiplier(Period::Annual, Basis::ProForma);
        assert!((annual_pro_forma - 1.08 * 1.06).abs() < 1e-12);
    }

    #[test]
    fn selections_parse_from_cli_strings() {
        assert_eq!("quarterly".parse::<Period>(), Ok(Period::Quarterly));
        assert_eq!("pro-forma".parse::<Basis>(), Ok(Basis::ProForma));
        assert_eq!("Pro Forma".parse::<Basis>(), Ok(Basis::ProForma));
        assert!("weekly".parse::<Period>().is_err());
    }

    #[test]
    fn basis_uses_display_label_on_the_wire() {
        let json = serde_json::to_string(&Basis::ProForma).expect("serializes");
        assert_eq!(json, "\"Pro Forma\"");
        let parsed: Basis = serde_json::from_str("\"Normalized\"").expect("parses");
        assert_eq!(parsed, Basis::Normalized);
    }

    #[test]
    fn timestamps_derive_from_as_of() {
        let ctx = DealContext::new("Atlas", Period::Monthly, Basis::Reported, as_of());
        assert_eq!(ctx.timestamp(), "2026-02-11T16:20:00.000Z");
        assert_eq!(ctx.minutes_before(14), "2026-02-11T16:06:00.000Z");
    }

    #[test]
    fn severity_buckets_risk_scores() {
        assert_eq!(Severity::from_risk_score(7.0), Severity::Red);
        assert_eq!(Severity::from_risk_score(4.5), Severity::Amber);
        assert_eq!(Severity::from_risk_score(4.49), Severity::Green);
    }
}
