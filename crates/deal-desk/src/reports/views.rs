use crate::synthesis::{RiskDimension, Severity, TieOutRow, Trend};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LineageStep {
    pub title: String,
    pub description: String,
    pub references: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CellTrace {
    pub step: String,
    pub source: String,
    pub logic: String,
    pub value: String,
}

/// Headline figure with the provenance an analyst can drill into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Metric {
    pub id: String,
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    pub lineage: Vec<LineageStep>,
    pub cell_trace: Vec<CellTrace>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Insight {
    pub id: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeltaFeedItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskBreakdown {
    pub red: u32,
    pub amber: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SummaryView {
    pub last_updated: String,
    pub metrics: Vec<Metric>,
    pub trend: Trend,
    pub insights: Vec<Insight>,
    pub delta_feed: Vec<DeltaFeedItem>,
    pub risk_breakdown: RiskBreakdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjustmentStatus {
    Proposed,
    Reviewed,
    Accepted,
}

impl AdjustmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Proposed => "Proposed",
            Self::Reviewed => "Reviewed",
            Self::Accepted => "Accepted",
        }
    }
}

/// Quality-of-earnings adjustment; `amount` is in whole dollars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Adjustment {
    pub id: String,
    pub category: String,
    pub description: String,
    pub amount: f64,
    pub status: AdjustmentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConcentrationPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgingBucket {
    pub bucket: String,
    pub ar: f64,
    pub ap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpexSlice {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnalysisView {
    pub last_updated: String,
    pub qoe_metrics: Vec<Metric>,
    pub revenue_metrics: Vec<Metric>,
    pub margin_metrics: Vec<Metric>,
    pub wc_metrics: Vec<Metric>,
    pub cash_metrics: Vec<Metric>,
    pub adjustments: Vec<Adjustment>,
    pub trend: Trend,
    pub concentration: Vec<ConcentrationPoint>,
    pub aging: Vec<AgingBucket>,
    pub opex_mix: Vec<OpexSlice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegisterStatus {
    Open,
    Monitoring,
    Mitigated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RiskRegisterRow {
    pub id: String,
    pub risk: String,
    pub severity: Severity,
    pub impact_area: String,
    pub exposure_range: String,
    pub status: RegisterStatus,
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RiskView {
    pub last_updated: String,
    pub dimensions: Vec<RiskDimension>,
    pub tie_outs: Vec<TieOutRow>,
    pub register: Vec<RiskRegisterRow>,
    pub risk_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverageStatus {
    Available,
    Partial,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoverageCell {
    pub month: String,
    pub status: CoverageStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoverageRow {
    pub schedule: String,
    pub months: Vec<CoverageCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileInventoryRow {
    pub id: String,
    pub file: String,
    pub detected_type: String,
    pub period_coverage: String,
    pub entity: String,
    pub status: String,
    pub confidence: f64,
}

/// Outstanding "provided by client" document request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PbcRequest {
    pub id: String,
    pub request: String,
    pub severity: Severity,
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DocumentsView {
    pub last_updated: String,
    pub coverage: Vec<CoverageRow>,
    pub inventory: Vec<FileInventoryRow>,
    pub pbc: Vec<PbcRequest>,
}

impl DocumentsView {
    /// Missing cells in schedule-major order.
    pub fn missing_cells(&self) -> impl Iterator<Item = (&CoverageRow, &CoverageCell)> {
        self.coverage.iter().flat_map(|row| {
            row.months
                .iter()
                .filter(|cell| cell.status == CoverageStatus::Missing)
                .map(move |cell| (row, cell))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopTrendPoint {
    pub month: String,
    pub top1: f64,
    pub top10: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DiscountAnomaly {
    pub month: String,
    pub rate: f64,
    pub prior_rate: f64,
    pub flagged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomerView {
    pub last_updated: String,
    pub metrics: Vec<Metric>,
    pub top_trend: Vec<TopTrendPoint>,
    pub discount_anomalies: Vec<DiscountAnomaly>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InquiryStatus {
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Monitoring,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Inquiry {
    pub id: String,
    pub request: String,
    pub owner: String,
    pub due_date: String,
    pub status: InquiryStatus,
    pub blocking: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InquiryView {
    pub last_updated: String,
    pub inquiries: Vec<Inquiry>,
}
