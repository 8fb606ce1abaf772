use super::customer::discount_anomalies;
use super::documents::missing_coverage_count;
use super::schema::validate;
use super::views::{Inquiry, InquiryStatus, InquiryView};
use super::ReportError;
use crate::synthesis::{count_status, DealContext, DealSnapshot, TieOutStatus};

/// Tilt above which discount follow-ups stay open rather than monitored.
const OPEN_DISCOUNT_TILT: f64 = 0.55;
/// Tilt above which discount follow-ups block the report.
const BLOCKING_DISCOUNT_TILT: f64 = 0.7;

const BASE_INQUIRIES: [(&str, &str, &str, InquiryStatus); 4] = [
    (
        "Reconcile AP aging variance to BS AP",
        "Controller",
        "2026-02-15",
        InquiryStatus::Open,
    ),
    (
        "Provide support for ADJ-009 FX adjustment",
        "Finance Manager",
        "2026-02-13",
        InquiryStatus::InProgress,
    ),
    (
        "Confirm deferred revenue policy updates",
        "Revenue Ops",
        "2026-02-18",
        InquiryStatus::Open,
    ),
    (
        "Upload payroll file for Feb-26",
        "HR Lead",
        "2026-02-14",
        InquiryStatus::Closed,
    ),
];

fn inquiry_id(seed: u64, offset: u64) -> String {
    format!("INQ-{}", seed % 9000 + offset)
}

/// Open questions to management, seeded by tie-out health, data-room gaps,
/// and discount anomalies.
pub fn build_inquiry(ctx: &DealContext) -> InquiryView {
    let snapshot = DealSnapshot::compute(ctx);
    let profile = &snapshot.profile;
    let tilt = profile.params.risk_tilt;

    let tie_outs = snapshot.tie_outs();
    let any_failure = count_status(&tie_outs, TieOutStatus::Fail) > 0;
    let not_passing = tie_outs.len() - count_status(&tie_outs, TieOutStatus::Pass);
    let blocking_count = (not_passing / 2).max(1);

    let mut inquiries: Vec<Inquiry> = BASE_INQUIRIES
        .iter()
        .enumerate()
        .map(|(idx, (request, owner, due_date, status))| Inquiry {
            id: inquiry_id(profile.seed, 1000 + idx as u64),
            request: (*request).to_string(),
            owner: (*owner).to_string(),
            due_date: (*due_date).to_string(),
            status: if idx == 0 && any_failure {
                InquiryStatus::Open
            } else {
                *status
            },
            blocking: idx < blocking_count,
        })
        .collect();

    let missing = missing_coverage_count(profile);
    if missing > 0 {
        inquiries.insert(
            0,
            Inquiry {
                id: inquiry_id(profile.seed, 9999),
                request: format!(
                    "Provide missing schedules support for {} ({missing} missing coverage cells)",
                    profile.display_name
                ),
                owner: "Data Room Owner".to_string(),
                due_date: "2026-03-01".to_string(),
                status: InquiryStatus::Open,
                blocking: true,
            },
        );
    }

    let flagged = discount_anomalies(&profile.params)
        .iter()
        .filter(|row| row.flagged)
        .count();
    if flagged > 0 {
        inquiries.insert(
            0,
            Inquiry {
                id: inquiry_id(profile.seed, 8888),
                request: format!(
                    "Explain {flagged} discount anomaly flag(s) and supporting commercial terms."
                ),
                owner: "Revenue Ops".to_string(),
                due_date: "2026-03-03".to_string(),
                status: if tilt > OPEN_DISCOUNT_TILT {
                    InquiryStatus::Open
                } else {
                    InquiryStatus::Monitoring
                },
                blocking: tilt > BLOCKING_DISCOUNT_TILT,
            },
        );
    }

    InquiryView {
        last_updated: ctx.timestamp(),
        inquiries,
    }
}

pub fn inquiry_report(ctx: &DealContext) -> Result<InquiryView, ReportError> {
    Ok(validate(build_inquiry(ctx))?)
}
