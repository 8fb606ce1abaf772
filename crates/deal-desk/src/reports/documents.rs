use super::schema::validate;
use super::views::{
    CoverageCell, CoverageRow, CoverageStatus, DocumentsView, FileInventoryRow, PbcRequest,
};
use super::ReportError;
use crate::synthesis::noise::round_to;
use crate::synthesis::{
    deterministic_noise, resolve_profile, CompanyProfile, DealContext, Severity, MONTHS,
};

pub const SCHEDULES: [&str; 9] = [
    "Income Statement",
    "Balance Sheet",
    "Cash Flow",
    "Trial Balance",
    "General Ledger",
    "AR Aging",
    "AP Aging",
    "Bank Statements",
    "Payroll",
];

/// Trailing months treated as the late period, where gaps are likelier.
const LATE_MONTHS: usize = 4;

/// Availability of one schedule for one month.
pub fn coverage_status(
    profile: &CompanyProfile,
    schedule_idx: usize,
    month_idx: usize,
) -> CoverageStatus {
    let draw = deterministic_noise(profile.seed, (schedule_idx * 37 + month_idx * 17) as u64);
    let late = month_idx >= MONTHS.len() - LATE_MONTHS;
    let bias = profile.params.missing_coverage_bias;

    let missing_below = bias * if late { 0.32 } else { 0.12 };
    let partial_below = 0.18 + bias * if late { 0.22 } else { 0.12 };

    if draw < missing_below {
        CoverageStatus::Missing
    } else if draw < partial_below {
        CoverageStatus::Partial
    } else {
        CoverageStatus::Available
    }
}

fn coverage(profile: &CompanyProfile) -> Vec<CoverageRow> {
    SCHEDULES
        .iter()
        .enumerate()
        .map(|(schedule_idx, schedule)| CoverageRow {
            schedule: (*schedule).to_string(),
            months: MONTHS
                .iter()
                .enumerate()
                .map(|(month_idx, month)| CoverageCell {
                    month: (*month).to_string(),
                    status: coverage_status(profile, schedule_idx, month_idx),
                })
                .collect(),
        })
        .collect()
}

/// Number of Missing cells across the whole coverage grid.
pub fn missing_coverage_count(profile: &CompanyProfile) -> usize {
    (0..SCHEDULES.len())
        .flat_map(|schedule_idx| (0..MONTHS.len()).map(move |month_idx| (schedule_idx, month_idx)))
        .filter(|&(schedule_idx, month_idx)| {
            coverage_status(profile, schedule_idx, month_idx) == CoverageStatus::Missing
        })
        .count()
}

const INVENTORY: [(&str, &str, &str, &str, &str); 4] = [
    ("F-001", "TB_FY24.xlsx", "Trial Balance", "Jan-25 to Feb-26", "Processed"),
    ("F-002", "GL_JanFeb26.csv", "General Ledger", "Jan-26 to Feb-26", "Processed"),
    ("F-003", "AR_Aging_Feb26.xlsx", "AR Aging", "Feb-26", "Partial"),
    ("F-004", "Bank_Stmt_Jan26.pdf", "Bank Statements", "Jan-26", "Processed"),
];

fn inventory(profile: &CompanyProfile) -> Vec<FileInventoryRow> {
    INVENTORY
        .iter()
        .enumerate()
        .map(|(idx, (id, file, detected_type, period_coverage, status))| {
            let confidence = (profile.params.parsing_quality - 0.05
                + deterministic_noise(profile.seed, idx as u64 + 220) * 0.12)
                .clamp(0.7, 0.99);
            FileInventoryRow {
                id: (*id).to_string(),
                file: (*file).to_string(),
                detected_type: (*detected_type).to_string(),
                period_coverage: (*period_coverage).to_string(),
                entity: profile.display_name.clone(),
                status: (*status).to_string(),
                confidence: round_to(confidence, 2),
            }
        })
        .collect()
}

fn pbc(missing: usize) -> Vec<PbcRequest> {
    let requests = [
        (
            "PBC-01",
            "Provide AP aging detail by vendor for Feb-26",
            "Controller",
            if missing > 5 { Severity::Red } else { Severity::Amber },
        ),
        (
            "PBC-02",
            "Support memo for ADJ-009 FX impact",
            "Finance Manager",
            Severity::Red,
        ),
        (
            "PBC-03",
            "Bank rec support for HoldCo cash account",
            "Treasury",
            Severity::Amber,
        ),
    ];

    requests
        .into_iter()
        .map(|(id, request, owner, severity)| PbcRequest {
            id: id.to_string(),
            request: request.to_string(),
            severity,
            owner: owner.to_string(),
        })
        .collect()
}

/// Data-room view: schedule coverage grid, parsed file inventory, and open requests.
///
/// Depends on the deal alone; period and basis do not move the grid.
pub fn build_documents(ctx: &DealContext) -> DocumentsView {
    let profile = resolve_profile(&ctx.deal);

    let mut view = DocumentsView {
        last_updated: ctx.timestamp(),
        coverage: coverage(&profile),
        inventory: inventory(&profile),
        pbc: Vec::new(),
    };
    view.pbc = pbc(view.missing_cells().count());
    view
}

pub fn documents_report(ctx: &DealContext) -> Result<DocumentsView, ReportError> {
    Ok(validate(build_documents(ctx))?)
}
