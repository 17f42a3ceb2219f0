//! fide-query - Main entry point

use clap::Parser;
use colored::Colorize;
use fide_cli::Cli;
use fide_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process::ExitCode;
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Normal mode: only warnings and errors reach the console
    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .output(LogOutput::Console)
        .log_file_prefix("fide-query")
        .build();

    // Environment variables take precedence; the CLI works without logging
    let _guard = log_config
        .merge_env()
        .and_then(|config| init_logging(&config))
        .ok()
        .flatten();

    match fide_cli::commands::query::run(&cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Query failed");
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        },
    }
}
