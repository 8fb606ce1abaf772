//! Cross-view decision queue and readiness.
//!
//! The queue merges findings from the risk, inquiry, analysis, and documents
//! views. Each category scores its own items with a fixed per-rank decay; the
//! merged list is stably sorted by score and cut to [`MAX_ITEMS`].

mod items;

pub use items::Decay;

use crate::reports::{
    analysis_report, documents_report, inquiry_report, risk_report, summary_report, validate,
    AnalysisView, DocumentsView, InquiryView, ReportError, RiskView, RuleSet, Schema,
    SchemaViolation, SummaryView,
};
use crate::synthesis::{count_status, DealContext, TieOutStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_ITEMS: usize = 10;
/// Displayed risk score at or above which an unblocked deal is still a draft.
pub const DRAFT_RISK_SCORE: f64 = 5.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueStatus {
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Deferred,
}

impl QueueStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Deferred => "Deferred",
        }
    }
}

/// Dashboard tab an item deep-links into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceTab {
    RiskAssessment,
    Inquiry,
    Documents,
    FinancialAnalysis,
}

impl SourceTab {
    pub const fn path(self) -> &'static str {
        match self {
            Self::RiskAssessment => "risk-assessment",
            Self::Inquiry => "inquiry",
            Self::Documents => "documents",
            Self::FinancialAnalysis => "financial-analysis",
        }
    }
}

/// One of the five views the queue is assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueSource {
    Summary,
    Analysis,
    Risk,
    Documents,
    Inquiry,
}

impl QueueSource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Analysis => "analysis",
            Self::Risk => "risk",
            Self::Documents => "documents",
            Self::Inquiry => "inquiry",
        }
    }
}

impl fmt::Display for QueueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Readiness {
    Ready,
    Draft,
    Blocked,
}

impl Readiness {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Draft => "Draft",
            Self::Blocked => "Blocked",
        }
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DecisionQueueItem {
    pub id: String,
    pub title: String,
    pub impact_area: String,
    pub impact_score: f64,
    pub owner: String,
    pub due_date: String,
    pub status: QueueStatus,
    pub blocking: bool,
    pub rationale: String,
    pub source_tab: SourceTab,
    pub source_id: String,
    pub source_label: String,
    pub source_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DecisionQueueView {
    pub last_updated: String,
    pub readiness: Readiness,
    pub items: Vec<DecisionQueueItem>,
    /// Views that failed to build and contributed nothing.
    #[serde(default)]
    pub degraded_sources: Vec<QueueSource>,
}

impl DecisionQueueView {
    pub fn blocking_items(&self) -> impl Iterator<Item = &DecisionQueueItem> {
        self.items.iter().filter(|item| item.blocking)
    }
}

impl Schema for DecisionQueueView {
    const NAME: &'static str = "decision-queue";

    fn check(&self, rules: &mut RuleSet) {
        rules.non_empty("lastUpdated", &self.last_updated);
        rules.require(self.items.len() <= MAX_ITEMS, || {
            format!("items must hold at most {MAX_ITEMS} entries, found {}", self.items.len())
        });
        rules.unique("items", self.items.iter().map(|item| item.id.as_str()));
        rules.require(
            self.items
                .windows(2)
                .all(|pair| pair[0].impact_score >= pair[1].impact_score),
            || "items must be sorted by impactScore descending".to_string(),
        );
        for item in &self.items {
            rules.within(&format!("items.{}.impactScore", item.id), item.impact_score, (0.0, 100.0));
            rules.require(item.source_url.starts_with('/'), || {
                format!("items.{}.sourceUrl must be an absolute path", item.id)
            });
        }
        rules.require(
            self.blocking_items().next().is_none() || self.readiness == Readiness::Blocked,
            || "readiness must be Blocked while a blocking item is queued".to_string(),
        );
    }
}

/// Per-source results of the fan-out; any of them may have failed.
#[derive(Debug)]
pub struct QueueInputs {
    pub last_updated: String,
    pub summary: Result<SummaryView, ReportError>,
    pub analysis: Result<AnalysisView, ReportError>,
    pub risk: Result<RiskView, ReportError>,
    pub documents: Result<DocumentsView, ReportError>,
    pub inquiry: Result<InquiryView, ReportError>,
}

impl QueueInputs {
    /// Builds every source one after another on the current thread.
    pub fn sequential(ctx: &DealContext) -> Self {
        Self {
            last_updated: ctx.timestamp(),
            summary: summary_report(ctx),
            analysis: analysis_report(ctx),
            risk: risk_report(ctx),
            documents: documents_report(ctx),
            inquiry: inquiry_report(ctx),
        }
    }
}

/// Readiness from the queued items, the failing tie-out count, and the displayed
/// risk score. A missing risk view leaves failures unknown, so the deal is blocked.
pub fn derive_readiness(
    items: &[DecisionQueueItem],
    failing_tie_outs: usize,
    risk_score: Option<f64>,
) -> Readiness {
    let Some(risk_score) = risk_score else {
        return Readiness::Blocked;
    };

    if items.iter().any(|item| item.blocking) || failing_tie_outs > 0 {
        Readiness::Blocked
    } else if risk_score >= DRAFT_RISK_SCORE {
        Readiness::Draft
    } else {
        Readiness::Ready
    }
}

fn contribute<T>(
    source: QueueSource,
    view: &Result<T, ReportError>,
    build: impl FnOnce(&T) -> Result<Vec<DecisionQueueItem>, ReportError>,
    items: &mut Vec<DecisionQueueItem>,
    degraded: &mut Vec<QueueSource>,
) {
    let outcome = match view {
        Ok(view) => build(view),
        Err(err) => {
            tracing::warn!(source = source.label(), error = %err, "decision queue source unavailable");
            degraded.push(source);
            return;
        }
    };

    match outcome {
        Ok(mut contributed) => items.append(&mut contributed),
        Err(err) => {
            tracing::warn!(source = source.label(), error = %err, "decision queue source dropped");
            degraded.push(source);
        }
    }
}

/// Merges, ranks, and truncates the queue, then derives readiness.
pub fn rank_decision_queue(inputs: QueueInputs) -> DecisionQueueView {
    let mut queue = Vec::new();
    let mut degraded = Vec::new();

    if let Err(err) = &inputs.summary {
        tracing::warn!(source = "summary", error = %err, "decision queue source unavailable");
        degraded.push(QueueSource::Summary);
    }

    contribute(QueueSource::Risk, &inputs.risk, items::tie_out_items, &mut queue, &mut degraded);
    contribute(QueueSource::Inquiry, &inputs.inquiry, items::inquiry_items, &mut queue, &mut degraded);
    contribute(
        QueueSource::Analysis,
        &inputs.analysis,
        items::adjustment_items,
        &mut queue,
        &mut degraded,
    );
    contribute(
        QueueSource::Documents,
        &inputs.documents,
        items::coverage_items,
        &mut queue,
        &mut degraded,
    );

    queue.sort_by(|a, b| b.impact_score.total_cmp(&a.impact_score));
    queue.truncate(MAX_ITEMS);

    let (failing, risk_score) = match (&inputs.risk, degraded.contains(&QueueSource::Risk)) {
        (Ok(risk), false) => (
            count_status(&risk.tie_outs, TieOutStatus::Fail),
            Some(risk.risk_score),
        ),
        _ => (0, None),
    };
    let readiness = derive_readiness(&queue, failing, risk_score);

    let last_updated = match &inputs.summary {
        Ok(summary) => summary.last_updated.clone(),
        Err(_) => inputs.last_updated,
    };

    degraded.sort();

    DecisionQueueView {
        last_updated,
        readiness,
        items: queue,
        degraded_sources: degraded,
    }
}

pub fn decision_queue_report(inputs: QueueInputs) -> Result<DecisionQueueView, SchemaViolation> {
    validate(rank_decision_queue(inputs))
}

/// Sequential queue for callers without a runtime.
pub fn build_decision_queue(ctx: &DealContext) -> Result<DecisionQueueView, ReportError> {
    Ok(decision_queue_report(QueueInputs::sequential(ctx))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::{Basis, Period};
    use chrono::{TimeZone, Utc};

    fn ctx(deal: &str) -> DealContext {
        let as_of = Utc
            .with_ymd_and_hms(2026, 2, 11, 16, 20, 0)
            .single()
            .expect("valid timestamp");
        DealContext::new(deal, Period::Monthly, Basis::Reported, as_of)
    }

    fn item(id: &str, score: f64, blocking: bool) -> DecisionQueueItem {
        DecisionQueueItem {
            id: id.to_string(),
            title: "title".to_string(),
            impact_area: "area".to_string(),
            impact_score: score,
            owner: "owner".to_string(),
            due_date: "2026-03-05".to_string(),
            status: QueueStatus::Open,
            blocking,
            rationale: "why".to_string(),
            source_tab: SourceTab::Documents,
            source_id: id.to_string(),
            source_label: id.to_string(),
            source_url: "/documents".to_string(),
        }
    }

    #[test]
    fn readiness_follows_blockers_failures_and_score() {
        let clear = [item("a", 50.0, false)];
        let blocked = [item("a", 50.0, true)];
        assert_eq!(derive_readiness(&blocked, 0, Some(2.0)), Readiness::Blocked);
        assert_eq!(derive_readiness(&clear, 1, Some(2.0)), Readiness::Blocked);
        assert_eq!(derive_readiness(&clear, 0, Some(5.5)), Readiness::Draft);
        assert_eq!(derive_readiness(&clear, 0, Some(5.4)), Readiness::Ready);
        assert_eq!(derive_readiness(&[], 0, None), Readiness::Blocked);
    }

    #[test]
    fn categories_decay_monotonically() {
        let view = build_decision_queue(&ctx("Tesla")).expect("valid queue");
        assert!(view.items.len() <= MAX_ITEMS);
        for prefix in ["dq-risk-fail-", "dq-risk-warn-", "dq-inquiry-", "dq-adjustment-", "dq-docs-"] {
            let mut scores: Vec<_> = view
                .items
                .iter()
                .filter(|item| item.id.starts_with(prefix))
                .map(|item| {
                    let rank: usize = item.id[prefix.len()..].parse().expect("numeric rank");
                    (rank, item.impact_score)
                })
                .collect();
            scores.sort_by_key(|(rank, _)| *rank);
            assert!(scores.windows(2).all(|pair| pair[0].1 > pair[1].1), "{prefix}: {scores:?}");
        }
    }

    #[test]
    fn failed_risk_source_blocks_and_is_reported() {
        let context = ctx("Microsoft");
        let mut inputs = QueueInputs::sequential(&context);
        inputs.risk = Err(ReportError::aborted("risk", "task panicked"));

        let view = rank_decision_queue(inputs);
        assert_eq!(view.readiness, Readiness::Blocked);
        assert_eq!(view.degraded_sources, vec![QueueSource::Risk]);
        assert!(view
            .items
            .iter()
            .all(|item| item.source_tab != SourceTab::RiskAssessment));
    }

    #[test]
    fn failed_summary_keeps_the_queue_and_falls_back_on_timestamp() {
        let context = ctx("Apple");
        let full = rank_decision_queue(QueueInputs::sequential(&context));

        let mut inputs = QueueInputs::sequential(&context);
        inputs.summary = Err(ReportError::aborted("summary", "cancelled"));
        let degraded = rank_decision_queue(inputs);

        assert_eq!(degraded.items, full.items);
        assert_eq!(degraded.readiness, full.readiness);
        assert_eq!(degraded.last_updated, context.timestamp());
        assert_eq!(degraded.degraded_sources, vec![QueueSource::Summary]);
    }

    #[test]
    fn merged_queue_is_sorted_without_degradation() {
        let view = build_decision_queue(&ctx("Meridian Logistics")).expect("valid queue");
        let scores: Vec<_> = view.items.iter().map(|item| item.impact_score).collect();
        assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
        assert!(view.degraded_sources.is_empty());
        assert_eq!(view.readiness, Readiness::Blocked);
    }
}
