use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use tracing::{error, info};

use ranked_report::{AppError, Config, ReportJob, TracingProgress, logging, riot::RiotClient};

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Write a spreadsheet of the last day's ranked games for each configured player"
)]
struct Args {
    /// Path to the JSON configuration file
    #[arg(long, env = "RANKED_REPORT_CONFIG", default_value = Config::DEFAULT_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init();

    info!("🐙 Starting...");

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("Run aborted: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every player got a report.
async fn run(args: Args) -> Result<bool, AppError> {
    let config = Config::load(&args.config)?;
    info!(
        "Config loaded from {} ({} players)",
        args.config.display(),
        config.players.len()
    );

    let client = RiotClient::from_config(&config)?;
    let progress = TracingProgress;
    let job = ReportJob::from_config(&config, &client, &progress);

    // The failing player and its error are already logged by the progress sink.
    let Ok(summary) = job.run(&config.players, config.on_player_error).await else {
        error!("Run aborted after a player failure");
        return Ok(false);
    };

    info!(
        "Done: {} reports written, {} players failed",
        summary.exported.len(),
        summary.failed.len()
    );

    Ok(summary.is_success())
}
