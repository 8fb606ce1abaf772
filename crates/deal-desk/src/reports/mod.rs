//! Per-view payload builders.
//!
//! Each view has a raw `build_*` function and a `*_report` wrapper that runs the
//! payload through [`schema::validate`] before it is handed out.

mod analysis;
mod customer;
mod documents;
mod inquiry;
pub mod metric;
mod risk;
pub mod schema;
mod summary;
pub mod views;

pub use analysis::{adjustments, analysis_report, build_analysis};
pub use customer::{build_customer, customer_report, discount_anomalies, DISCOUNT_SPIKE_RATIO};
pub use documents::{
    build_documents, coverage_status, documents_report, missing_coverage_count, SCHEDULES,
};
pub use inquiry::{build_inquiry, inquiry_report};
pub use risk::{build_risk, risk_register, risk_report};
pub use schema::{validate, RuleSet, Schema, SchemaViolation};
pub use summary::{build_summary, risk_breakdown, summary_report};
pub use views::*;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Schema(#[from] SchemaViolation),
    #[error("could not encode deep link: {0}")]
    DeepLink(#[from] serde_urlencoded::ser::Error),
    #[error("{report} builder did not complete: {reason}")]
    Aborted { report: &'static str, reason: String },
}

impl ReportError {
    pub fn aborted(report: &'static str, reason: impl ToString) -> Self {
        Self::Aborted {
            report,
            reason: reason.to_string(),
        }
    }
}
