use crate::demo::{run_demo, DemoArgs};
use crate::screen::{run_analyze, run_batch, AnalyzeArgs, BatchArgs};
use clap::{Parser, Subcommand};
use cv_screening::config::AppConfig;
use cv_screening::error::AppError;
use cv_screening::telemetry;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "cv-screener",
    about = "Score CV documents against a job's requirements",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one document and print the result as JSON
    Analyze(AnalyzeArgs),
    /// Analyze several documents against the same job
    Batch(BatchArgs),
    /// Walk through the application workflow against in-memory storage
    Demo(DemoArgs),
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    debug!(environment = ?config.environment, "configuration loaded");

    match cli.command {
        Command::Analyze(args) => run_analyze(&config, args).await,
        Command::Batch(args) => run_batch(&config, args).await,
        Command::Demo(args) => run_demo(&config, args).await,
    }
}
