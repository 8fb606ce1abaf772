use crate::render::{run_report, run_trend, ReportArgs, TrendArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use deal_desk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "deal-desk",
    about = "Serve and inspect deterministic due-diligence deal dashboards",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print readiness, tie-outs, and the ranked decision queue for a deal
    Report(ReportArgs),
    /// Write the synthesized 12-month series as CSV on stdout
    Trend(TrendArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Respond without the simulated processing delay
    #[arg(long)]
    pub(crate) no_latency: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args).await,
        Command::Trend(args) => run_trend(args),
    }
}
