use super::{DecisionQueueItem, QueueStatus, SourceTab};
use crate::reports::{
    AdjustmentStatus, AnalysisView, CoverageCell, CoverageRow, DocumentsView, Inquiry,
    InquiryStatus, InquiryView, ReportError, RiskView,
};
use crate::synthesis::{TieOutRow, TieOutStatus};

const MAX_WARN_TIE_OUTS: usize = 2;
const MAX_INQUIRIES: usize = 3;
const MAX_ADJUSTMENTS: usize = 3;
const MAX_COVERAGE_GAPS: usize = 4;

/// Base score and per-rank decay for one contributing category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decay {
    pub base: f64,
    pub step: f64,
}

impl Decay {
    pub const TIE_OUT_FAIL: Self = Self::new(95.0, 4.0);
    pub const TIE_OUT_WARN: Self = Self::new(78.0, 3.0);
    pub const INQUIRY: Self = Self::new(88.0, 5.0);
    pub const ADJUSTMENT: Self = Self::new(72.0, 2.0);
    pub const COVERAGE: Self = Self::new(66.0, 2.0);

    pub const fn new(base: f64, step: f64) -> Self {
        Self { base, step }
    }

    pub fn score(self, rank: usize) -> f64 {
        self.base - self.step * rank as f64
    }
}

/// Front-end route with percent-encoded query parameters.
fn deep_link(path: &str, params: &[(&str, &str)]) -> Result<String, ReportError> {
    Ok(format!("/{path}?{}", serde_urlencoded::to_string(params)?))
}

fn tie_out_link(row: &TieOutRow) -> Result<String, ReportError> {
    deep_link(
        SourceTab::RiskAssessment.path(),
        &[("focus", "tieout"), ("name", row.name.as_str())],
    )
}

pub(super) fn tie_out_items(risk: &RiskView) -> Result<Vec<DecisionQueueItem>, ReportError> {
    let failing = risk
        .tie_outs
        .iter()
        .filter(|row| row.status == TieOutStatus::Fail)
        .enumerate()
        .map(|(rank, row)| {
            Ok(DecisionQueueItem {
                id: format!("dq-risk-fail-{}", rank + 1),
                title: format!("Resolve tie-out failure: {}", row.name),
                impact_area: "Risk / Tie-out".to_string(),
                impact_score: Decay::TIE_OUT_FAIL.score(rank),
                owner: "Finance Controller".to_string(),
                due_date: "2026-03-05".to_string(),
                status: QueueStatus::Open,
                blocking: true,
                rationale: format!(
                    "{} is failing at {:.2}% vs tolerance {:.2}%.",
                    row.name, row.variance_pct, row.tolerance_pct
                ),
                source_tab: SourceTab::RiskAssessment,
                source_id: row.name.clone(),
                source_label: row.name.clone(),
                source_url: tie_out_link(row)?,
            })
        });

    let warning = risk
        .tie_outs
        .iter()
        .filter(|row| row.status == TieOutStatus::Warn)
        .take(MAX_WARN_TIE_OUTS)
        .enumerate()
        .map(|(rank, row)| {
            Ok(DecisionQueueItem {
                id: format!("dq-risk-warn-{}", rank + 1),
                title: format!("Tighten warning tie-out: {}", row.name),
                impact_area: "Risk / Tie-out".to_string(),
                impact_score: Decay::TIE_OUT_WARN.score(rank),
                owner: "Deal Team".to_string(),
                due_date: "2026-03-06".to_string(),
                status: QueueStatus::InProgress,
                blocking: rank == 0,
                rationale: format!(
                    "{} sits in warning band at {:.2}%.",
                    row.name, row.variance_pct
                ),
                source_tab: SourceTab::RiskAssessment,
                source_id: row.name.clone(),
                source_label: row.name.clone(),
                source_url: tie_out_link(row)?,
            })
        });

    failing.chain(warning).collect()
}

fn is_open_blocker(inquiry: &Inquiry) -> bool {
    inquiry.blocking && inquiry.status != InquiryStatus::Closed
}

pub(super) fn inquiry_items(inquiry: &InquiryView) -> Result<Vec<DecisionQueueItem>, ReportError> {
    inquiry
        .inquiries
        .iter()
        .filter(|row| is_open_blocker(row))
        .take(MAX_INQUIRIES)
        .enumerate()
        .map(|(rank, row)| {
            Ok(DecisionQueueItem {
                id: format!("dq-inquiry-{}", rank + 1),
                title: format!("Close blocking inquiry: {}", row.request),
                impact_area: "Inquiry / Readiness".to_string(),
                impact_score: Decay::INQUIRY.score(rank),
                owner: row.owner.clone(),
                due_date: row.due_date.clone(),
                status: match row.status {
                    InquiryStatus::InProgress => QueueStatus::InProgress,
                    _ => QueueStatus::Open,
                },
                blocking: true,
                rationale:
                    "Blocking inquiry directly gates report readiness and IC package quality."
                        .to_string(),
                source_tab: SourceTab::Inquiry,
                source_id: row.id.clone(),
                source_label: row.id.clone(),
                source_url: deep_link(
                    SourceTab::Inquiry.path(),
                    &[("focus", "inquiry"), ("id", row.id.as_str())],
                )?,
            })
        })
        .collect()
}

pub(super) fn adjustment_items(
    analysis: &AnalysisView,
) -> Result<Vec<DecisionQueueItem>, ReportError> {
    let mut pending: Vec<_> = analysis
        .adjustments
        .iter()
        .filter(|row| row.status != AdjustmentStatus::Accepted)
        .collect();
    pending.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    pending
        .into_iter()
        .take(MAX_ADJUSTMENTS)
        .enumerate()
        .map(|(rank, row)| {
            Ok(DecisionQueueItem {
                id: format!("dq-adjustment-{}", rank + 1),
                title: format!("Validate adjustment support: {}", row.id),
                impact_area: "QoE / Adjustments".to_string(),
                impact_score: Decay::ADJUSTMENT.score(rank),
                owner: "QoE Workstream Lead".to_string(),
                due_date: "2026-03-07".to_string(),
                status: match row.status {
                    AdjustmentStatus::Reviewed => QueueStatus::InProgress,
                    _ => QueueStatus::Open,
                },
                blocking: rank == 0,
                rationale: format!(
                    "{} ({}) carries material impact of ${:.2}M.",
                    row.id,
                    row.status.label(),
                    row.amount / 1_000_000.0
                ),
                source_tab: SourceTab::FinancialAnalysis,
                source_id: row.id.clone(),
                source_label: format!("{} - {}", row.id, row.category),
                source_url: deep_link(
                    SourceTab::FinancialAnalysis.path(),
                    &[("sub", "qoe"), ("focus", "adjustment"), ("id", row.id.as_str())],
                )?,
            })
        })
        .collect()
}

fn coverage_item(
    rank: usize,
    row: &CoverageRow,
    cell: &CoverageCell,
) -> Result<DecisionQueueItem, ReportError> {
    Ok(DecisionQueueItem {
        id: format!("dq-docs-{}", rank + 1),
        title: format!("Ingest missing document: {} ({})", row.schedule, cell.month),
        impact_area: "Documents / Data Integrity".to_string(),
        impact_score: Decay::COVERAGE.score(rank),
        owner: "Data Room Owner".to_string(),
        due_date: "2026-03-08".to_string(),
        status: QueueStatus::Open,
        blocking: rank == 0,
        rationale: format!(
            "Coverage gap on {} for {} reduces confidence and traceability.",
            row.schedule, cell.month
        ),
        source_tab: SourceTab::Documents,
        source_id: format!("{}-{}", row.schedule, cell.month),
        source_label: row.schedule.clone(),
        source_url: deep_link(
            SourceTab::Documents.path(),
            &[
                ("focus", "coverage"),
                ("schedule", row.schedule.as_str()),
                ("month", cell.month.as_str()),
            ],
        )?,
    })
}

pub(super) fn coverage_items(
    documents: &DocumentsView,
) -> Result<Vec<DecisionQueueItem>, ReportError> {
    documents
        .missing_cells()
        .take(MAX_COVERAGE_GAPS)
        .enumerate()
        .map(|(rank, (row, cell))| coverage_item(rank, row, cell))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_steps_down_by_rank() {
        assert_eq!(Decay::TIE_OUT_FAIL.score(0), 95.0);
        assert_eq!(Decay::TIE_OUT_FAIL.score(1), 91.0);
        assert_eq!(Decay::INQUIRY.score(2), 78.0);
        assert_eq!(Decay::COVERAGE.score(3), 60.0);
    }

    #[test]
    fn deep_links_encode_query_values() {
        let url = deep_link("risk-assessment", &[("focus", "tieout"), ("name", "TB <-> IS (Revenue)")])
            .expect("encodes");
        assert_eq!(url, "/risk-assessment?focus=tieout&name=TB+%3C-%3E+IS+%28Revenue%29");
    }
}
