use crate::commands::{run_scales, run_shift_report, ScalesArgs, ShiftReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use icu_ward::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "ICU Ward Engine",
    about = "Serve and inspect the ICU scoring and procedure reporting engine",
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
    /// Print the clinical scales with their bands and tiers
    Scales(ScalesArgs),
    /// Group an exported procedure log into registros and shift metrics
    ShiftReport(ShiftReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Scales(args) => run_scales(args),
        Command::ShiftReport(args) => run_shift_report(args),
    }
}
