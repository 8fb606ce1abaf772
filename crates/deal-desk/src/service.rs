//! Async facade over the pure builders.
//!
//! Every public call waits the simulated processing delay exactly once and then
//! builds its payload. The decision queue fans its five sources out onto the
//! blocking pool and joins them; a source that fails is reported per-source
//! instead of failing the whole queue.

use crate::config::LatencyConfig;
use crate::decision::{decision_queue_report, DecisionQueueView, QueueInputs};
use crate::reports::{
    analysis_report, customer_report, documents_report, inquiry_report, risk_report,
    summary_report, AnalysisView, CustomerView, DocumentsView, InquiryView, ReportError,
    RiskView, SummaryView,
};
use crate::synthesis::{DealContext, DealQuery};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Base delay plus uniformly drawn jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedLatency {
    base: Duration,
    jitter: Duration,
}

impl SimulatedLatency {
    pub fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn is_none(&self) -> bool {
        self.base.is_zero() && self.jitter.is_zero()
    }

    fn sample(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        let jitter: u64 = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_ms)
        };
        self.base + Duration::from_millis(jitter)
    }

    pub async fn wait(&self) {
        if self.is_none() {
            return;
        }
        let delay = self.sample();
        debug!(delay_ms = delay.as_millis() as u64, "simulating processing latency");
        sleep(delay).await;
    }
}

impl From<LatencyConfig> for SimulatedLatency {
    fn from(config: LatencyConfig) -> Self {
        Self::new(config.base(), config.jitter())
    }
}

/// Source of `as_of` for new request contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DealDeskService {
    latency: SimulatedLatency,
    clock: Clock,
}

impl Default for DealDeskService {
    fn default() -> Self {
        Self::new(SimulatedLatency::none())
    }
}

impl DealDeskService {
    pub fn new(latency: SimulatedLatency) -> Self {
        Self {
            latency,
            clock: Clock::System,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Pins the query to an immutable context stamped with the current clock.
    pub fn context(&self, query: DealQuery) -> DealContext {
        query.into_context(self.clock.now())
    }

    pub async fn summary(&self, ctx: &DealContext) -> Result<SummaryView, ReportError> {
        self.latency.wait().await;
        summary_report(ctx)
    }

    pub async fn analysis(&self, ctx: &DealContext) -> Result<AnalysisView, ReportError> {
        self.latency.wait().await;
        analysis_report(ctx)
    }

    pub async fn risk(&self, ctx: &DealContext) -> Result<RiskView, ReportError> {
        self.latency.wait().await;
        risk_report(ctx)
    }

    pub async fn documents(&self, ctx: &DealContext) -> Result<DocumentsView, ReportError> {
        self.latency.wait().await;
        documents_report(ctx)
    }

    pub async fn customer(&self, ctx: &DealContext) -> Result<CustomerView, ReportError> {
        self.latency.wait().await;
        customer_report(ctx)
    }

    pub async fn inquiry(&self, ctx: &DealContext) -> Result<InquiryView, ReportError> {
        self.latency.wait().await;
        inquiry_report(ctx)
    }

    pub async fn decision_queue(
        &self,
        ctx: &DealContext,
    ) -> Result<DecisionQueueView, ReportError> {
        self.latency.wait().await;

        let shared = Arc::new(ctx.clone());
        let (summary, analysis, risk, documents, inquiry) = tokio::join!(
            spawn_report("summary", shared.clone(), summary_report),
            spawn_report("analysis", shared.clone(), analysis_report),
            spawn_report("risk", shared.clone(), risk_report),
            spawn_report("documents", shared.clone(), documents_report),
            spawn_report("inquiry", shared, inquiry_report),
        );

        let view = decision_queue_report(QueueInputs {
            last_updated: ctx.timestamp(),
            summary,
            analysis,
            risk,
            documents,
            inquiry,
        })?;

        info!(
            deal = %ctx.deal,
            period = %ctx.period,
            basis = %ctx.basis,
            readiness = %view.readiness,
            items = view.items.len(),
            blocking = view.blocking_items().count(),
            degraded = ?view.degraded_sources,
            "decision queue ranked"
        );

        Ok(view)
    }
}

async fn spawn_report<T>(
    report: &'static str,
    ctx: Arc<DealContext>,
    build: fn(&DealContext) -> Result<T, ReportError>,
) -> Result<T, ReportError>
where
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(move || build(&ctx)).await {
        Ok(result) => result,
        Err(err) => Err(ReportError::aborted(report, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::build_decision_queue;
    use crate::synthesis::{Basis, Period};
    use chrono::TimeZone;

    fn fixed_clock() -> Clock {
        Clock::Fixed(
            Utc.with_ymd_and_hms(2026, 2, 11, 16, 20, 0)
                .single()
                .expect("valid timestamp"),
        )
    }

    fn service() -> DealDeskService {
        DealDeskService::default().with_clock(fixed_clock())
    }

    #[test]
    fn zero_jitter_samples_the_base_delay() {
        let latency = SimulatedLatency::new(Duration::from_millis(40), Duration::ZERO);
        assert_eq!(latency.sample(), Duration::from_millis(40));
        assert!(!latency.is_none());
        assert!(SimulatedLatency::from(LatencyConfig::disabled()).is_none());
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let latency = SimulatedLatency::new(Duration::from_millis(10), Duration::from_millis(5));
        for _ in 0..50 {
            let delay = latency.sample();
            assert!(delay >= Duration::from_millis(10));
            assert!(delay <= Duration::from_millis(15));
        }
    }

    #[test]
    fn context_uses_the_service_clock_and_defaults() {
        let ctx = service().context(DealQuery::default());
        assert_eq!(ctx.deal, "Project Atlas");
        assert_eq!(ctx.period, Period::Monthly);
        assert_eq!(ctx.basis, Basis::Reported);
        assert_eq!(ctx.as_of, fixed_clock().now());
    }

    #[tokio::test]
    async fn concurrent_queue_matches_sequential_queue() {
        let service = service();
        for deal in ["Apple", "Tesla", "Zyphon Holdings"] {
            let ctx = service.context(DealQuery {
                deal: Some(deal.to_string()),
                period: Some(Period::Quarterly),
                basis: Some(Basis::ProForma),
            });
            let concurrent = service.decision_queue(&ctx).await.expect("queue builds");
            let sequential = build_decision_queue(&ctx).expect("queue builds");
            assert_eq!(concurrent, sequential, "{deal}");
            assert!(concurrent.degraded_sources.is_empty());
        }
    }

    #[tokio::test]
    async fn risk_score_is_shared_between_views() {
        let service = service();
        let ctx = service.context(DealQuery {
            deal: Some("Meridian".to_string()),
            ..DealQuery::default()
        });
        let risk = service.risk(&ctx).await.expect("risk builds");
        let summary = service.summary(&ctx).await.expect("summary builds");
        let overall = summary
            .metrics
            .iter()
            .find(|metric| metric.id == "overall-risk")
            .expect("overall risk metric");
        assert_eq!(overall.value, format!("{:.1} / 10", risk.risk_score));
    }

    #[tokio::test]
    async fn spawned_panics_surface_as_aborted_reports() {
        fn explode(_: &DealContext) -> Result<SummaryView, ReportError> {
            panic!("builder exploded")
        }
        let ctx = Arc::new(service().context(DealQuery::default()));
        let err = spawn_report("summary", ctx, explode)
            .await
            .expect_err("panic is captured");
        assert!(matches!(err, ReportError::Aborted { report: "summary", .. }));
    }
}
