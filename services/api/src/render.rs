use crate::infra::parse_as_of;
use chrono::{DateTime, Utc};
use clap::Args;
use deal_desk::config::AppConfig;
use deal_desk::decision::DecisionQueueView;
use deal_desk::error::AppError;
use deal_desk::reports::RiskView;
use deal_desk::service::{Clock, DealDeskService};
use deal_desk::synthesis::{Basis, DealContext, DealQuery, DealSnapshot, Period, DEFAULT_DEAL};
use deal_desk::telemetry::{self, LogSink};
use serde::Serialize;
use std::io;

#[derive(Args, Debug, Clone)]
pub(crate) struct SelectionArgs {
    /// Deal or company name; named scenarios resolve before the seeded fallback
    #[arg(long, default_value = DEFAULT_DEAL)]
    pub(crate) deal: String,
    /// Reporting period (Monthly, Quarterly, Annual)
    #[arg(long, default_value_t = Period::Monthly)]
    pub(crate) period: Period,
    /// Accounting basis (Reported, Normalized, Pro Forma)
    #[arg(long, default_value_t = Basis::Reported)]
    pub(crate) basis: Basis,
    /// Pin the report timestamp (RFC 3339). Defaults to now.
    #[arg(long, value_parser = parse_as_of)]
    pub(crate) as_of: Option<DateTime<Utc>>,
}

impl SelectionArgs {
    fn service(&self) -> DealDeskService {
        let clock = self.as_of.map(Clock::Fixed).unwrap_or_default();
        DealDeskService::default().with_clock(clock)
    }

    fn query(&self) -> DealQuery {
        DealQuery {
            deal: Some(self.deal.clone()),
            period: Some(self.period),
            basis: Some(self.basis),
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    #[command(flatten)]
    pub(crate) selection: SelectionArgs,
    /// Emit the risk view and decision queue as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct TrendArgs {
    #[command(flatten)]
    pub(crate) selection: SelectionArgs,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportBundle<'a> {
    deal: &'a str,
    period: Period,
    basis: Basis,
    risk: &'a RiskView,
    decision_queue: &'a DecisionQueueView,
}

pub(crate) async fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogSink::Stderr)?;

    let service = args.selection.service();
    let ctx = service.context(args.selection.query());
    let risk = service.risk(&ctx).await?;
    let queue = service.decision_queue(&ctx).await?;

    if args.json {
        let bundle = ReportBundle {
            deal: &ctx.deal,
            period: ctx.period,
            basis: ctx.basis,
            risk: &risk,
            decision_queue: &queue,
        };
        println!("{}", report_json(&bundle)?);
        return Ok(());
    }

    render_report(&ctx, &risk, &queue);
    Ok(())
}

fn report_json(bundle: &ReportBundle<'_>) -> Result<String, AppError> {
    serde_json::to_string_pretty(bundle).map_err(|err| AppError::Io(err.into()))
}

fn render_report(ctx: &DealContext, risk: &RiskView, queue: &DecisionQueueView) {
    println!("Deal readiness report");
    println!(
        "{} | {} | {} basis (as of {})",
        ctx.deal,
        ctx.period,
        ctx.basis,
        ctx.timestamp()
    );
    println!(
        "Readiness: {} | Overall risk {:.1} / 10",
        queue.readiness, risk.risk_score
    );

    println!("\nTie-outs");
    for row in &risk.tie_outs {
        println!(
            "- {:<28} {:?} ({:.2}% vs tolerance {:.2}%)",
            row.name, row.status, row.variance_pct, row.tolerance_pct
        );
    }

    println!(
        "\nDecision queue ({} items, {} blocking)",
        queue.items.len(),
        queue.blocking_items().count()
    );
    if queue.items.is_empty() {
        println!("- nothing outstanding");
    }
    for (idx, item) in queue.items.iter().enumerate() {
        let blocking = if item.blocking { " [blocking]" } else { "" };
        println!(
            "{:>2}. [{:>4.0}] {}{}",
            idx + 1,
            item.impact_score,
            item.title,
            blocking
        );
        println!(
            "    {} | owner {} | due {} | {}",
            item.impact_area,
            item.owner,
            item.due_date,
            item.status.label()
        );
        println!("    -> {}", item.source_url);
    }

    if !queue.degraded_sources.is_empty() {
        let sources: Vec<_> = queue
            .degraded_sources
            .iter()
            .map(|source| source.label())
            .collect();
        println!("\nDegraded sources: {}", sources.join(", "));
    }
}

pub(crate) fn run_trend(args: TrendArgs) -> Result<(), AppError> {
    let ctx = args.selection.service().context(args.selection.query());
    write_trend(&ctx, io::stdout().lock())
}

fn write_trend<W: io::Write>(ctx: &DealContext, out: W) -> Result<(), AppError> {
    let snapshot = DealSnapshot::compute(ctx);
    let mut writer = csv::Writer::from_writer(out);
    for point in snapshot.trend.iter() {
        writer
            .serialize(point)
            .map_err(|err| AppError::Io(err.into()))?;
    }
    writer.flush()?;
    Ok(())
}
