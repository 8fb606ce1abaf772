use super::views::{CellTrace, LineageStep, Metric};
use crate::synthesis::Severity;

/// Formula library entries quoted in metric lineage.
pub mod formula {
    pub const REVENUE: &str = "Net Revenue = Gross Revenue - Discounts - Returns";
    pub const EBITDA: &str = "EBITDA = Revenue - COGS - Opex (excluding D&A)";
    pub const ADJUSTED_EBITDA: &str =
        "Adjusted EBITDA = Reported EBITDA + SUM(Accepted Adjustments)";
    pub const ADJUSTMENT_PCT: &str = "Adjustment % = Total Adjustments / Reported EBITDA";
    pub const NWC: &str = "NWC = AR + Inventory + Prepaids - AP - Accruals";
    pub const PEG: &str = "Peg = Avg normalized NWC (12m) +/- seasonality adjustments";
    pub const CASH_CONVERSION: &str = "Cash conversion % = Operating Cash Flow / EBITDA";
    pub const GROSS_MARGIN: &str = "Gross Margin % = (Revenue - COGS) / Revenue";
    pub const DSO: &str = "DSO = (AR / Revenue) * 365";
    pub const DPO: &str = "DPO = (AP / COGS) * 365";
    pub const CCC: &str = "CCC = DSO + DIO - DPO";
    pub const TIE_OUT: &str = "Tie-out variance % = |Observed - Expected| / Expected";
    pub const DISCOUNT: &str =
        "Discount anomaly rule: if current discount rate > 1.5 * prior period -> ORANGE";
    pub const FREE_CASH_FLOW: &str = "FCF = OCF - Capex";
    pub const RUNWAY: &str = "Runway = Cash / Avg Monthly Burn";
    pub const NRR: &str =
        "NRR proxy = (Current recurring rev from retained cohort / Prior recurring rev cohort)";
}

/// `$12.3M`
pub fn money_m(value: f64) -> String {
    format!("${value:.1}M")
}

/// `12.3%`
pub fn pct(value: f64) -> String {
    format!("{value:.1}%")
}

/// `12%`
pub fn whole_pct(value: f64) -> String {
    format!("{value:.0}%")
}

/// Fluent constructor for [`Metric`]; lineage and cell trace are filled in by `build`.
pub struct MetricBuilder {
    id: &'static str,
    label: &'static str,
    value: String,
    formula: &'static str,
    delta: Option<String>,
    severity: Option<Severity>,
}

impl MetricBuilder {
    pub fn new(id: &'static str, label: &'static str, formula: &'static str) -> Self {
        Self {
            id,
            label,
            value: String::new(),
            formula,
            delta: None,
            severity: None,
        }
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn delta(mut self, delta: impl Into<String>) -> Self {
        self.delta = Some(delta.into());
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn build(self) -> Metric {
        Metric {
            id: self.id.to_string(),
            label: self.label.to_string(),
            lineage: lineage(self.formula),
            cell_trace: cell_trace(self.formula, &self.value),
            value: self.value,
            delta: self.delta,
            severity: self.severity,
        }
    }
}

fn step(title: &str, description: &str, references: &[&str]) -> LineageStep {
    LineageStep {
        title: title.to_string(),
        description: description.to_string(),
        references: references.iter().map(|reference| reference.to_string()).collect(),
    }
}

fn lineage(formula: &str) -> Vec<LineageStep> {
    vec![
        step(
            "Inputs",
            "Mapped values extracted from standardized trial balance and supporting schedules.",
            &["TB_FY24.xlsx!Revenue", "GL_Export.csv", "Mapping v2.1"],
        ),
        step(
            "Transformations",
            "Entity normalization, currency harmonization, and period alignment applied.",
            &["Normalization Rulebook", "Entity Map: HoldCo -> OpCo"],
        ),
        step("Formula", formula, &["TAM Formula Library"]),
        step(
            "Filters / Overrides",
            "Analyst-approved exclusions and seasonality controls applied.",
            &["Override Log #104", "Materiality threshold $75k"],
        ),
    ]
}

fn cell_trace(formula: &str, value: &str) -> Vec<CellTrace> {
    [
        ("1", "TB_FY24.xlsx / IS / C12:C23", "Sum monthly mapped accounts"),
        ("2", "Adjustments_Register.xlsx / Adj / A:F", formula),
        (
            "3",
            "Normalization_Logic.sql",
            "Apply accepted adjustments and basis selection",
        ),
    ]
    .into_iter()
    .map(|(step, source, logic)| CellTrace {
        step: step.to_string(),
        source: source.to_string(),
        logic: logic.to_string(),
        value: value.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_money_and_percentages() {
        assert_eq!(money_m(63.74), "$63.7M");
        assert_eq!(money_m(-1.26), "$-1.3M");
        assert_eq!(pct(9.81), "9.8%");
        assert_eq!(whole_pct(52.4), "52%");
    }

    #[test]
    fn metric_carries_lineage_and_trace() {
        let metric = MetricBuilder::new("avg-nwc", "Avg NWC (LTM)", formula::NWC)
            .value(money_m(6.1))
            .severity(Severity::Amber)
            .build();

        assert_eq!(metric.lineage.len(), 4);
        assert_eq!(metric.lineage[2].description, formula::NWC);
        assert_eq!(metric.cell_trace.len(), 3);
        assert!(metric.cell_trace.iter().all(|trace| trace.value == "$6.1M"));
        assert_eq!(metric.delta, None);
    }
}
