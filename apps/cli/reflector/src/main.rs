use reflector::cli::Cli;
use reflector::commands::run;
use reflector::logger::initialize as LoggerInitialize;

use std::fs::create_dir_all;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // Missing .env is fine
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_dir = match cli.log_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = create_dir_all(&log_dir) {
        eprintln!("Failed to create log directory {}: {e}", log_dir.display());
        return ExitCode::FAILURE;
    }
    if let Err(e) = LoggerInitialize(&log_dir, cli.logger_settings()) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    info!("Reflector starting, logging to {}", log_dir.display());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
