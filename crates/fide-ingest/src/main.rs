//! fide-sync - Synchronize the FIDE ratings feed into the local store

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use fide_common::logging::{init_logging, LogConfig, LogLevel};
use fide_common::store::DatasetStore;
use fide_ingest::config::{
    DEFAULT_ARCHIVE_NAME, DEFAULT_BASE_URL, DEFAULT_DATABASE_PATH, DEFAULT_DATA_FILE_NAME,
    DEFAULT_HASH_FILE, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS,
};
use fide_ingest::{SyncConfig, SyncOutcome, SyncPipeline};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "fide-sync")]
#[command(author, version, about = "Download the FIDE players list and load it into SQLite")]
struct Cli {
    /// Base URL of the ratings download area
    #[arg(long, env = "FIDE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Archive name published at the base URL
    #[arg(long, env = "FIDE_ARCHIVE_NAME", default_value = DEFAULT_ARCHIVE_NAME)]
    archive_name: String,

    /// Archive entry holding the players XML
    #[arg(long, env = "FIDE_DATA_FILE", default_value = DEFAULT_DATA_FILE_NAME)]
    data_file: String,

    /// Directory used for the download and extraction
    #[arg(long, env = "FIDE_WORK_DIR", default_value = ".")]
    work_dir: PathBuf,

    /// SQLite database file
    #[arg(short, long, env = "FIDE_DATABASE", default_value = DEFAULT_DATABASE_PATH)]
    database: PathBuf,

    /// File holding the digest of the last ingested archive
    #[arg(long, env = "FIDE_HASH_FILE", default_value = DEFAULT_HASH_FILE)]
    hash_file: PathBuf,

    /// HTTP timeout in seconds
    #[arg(long, env = "FIDE_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Download attempts before giving up
    #[arg(long, env = "FIDE_MAX_RETRIES", default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: u32,

    /// Suppress step-by-step progress and the download bar
    #[arg(long)]
    no_progress: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn sync_config(&self) -> SyncConfig {
        SyncConfig::builder()
            .base_url(&self.base_url)
            .archive_name(&self.archive_name)
            .data_file_name(&self.data_file)
            .work_dir(&self.work_dir)
            .database_path(&self.database)
            .hash_file(&self.hash_file)
            .timeout_secs(self.timeout_secs)
            .max_retries(self.max_retries)
            .show_progress(!self.no_progress)
            .build()
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("fide-sync")
        .build();

    // Environment variables take precedence
    let _guard = match log_config.merge_env().and_then(|config| init_logging(&config)) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            return ExitCode::FAILURE;
        },
    };

    match run(&cli).await {
        Ok(outcome) => {
            println!("{} {}", "✓".green().bold(), summary(&outcome));
            ExitCode::SUCCESS
        },
        Err(e) => {
            error!(error = %format!("{:#}", e), "Sync failed");
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: &Cli) -> Result<SyncOutcome> {
    let config = cli.sync_config();
    info!(url = %config.archive_url(), database = %config.database_path.display(), "Starting sync");

    let pipeline = SyncPipeline::new(config)?;
    let store = DatasetStore::open(&pipeline.config().database_path)
        .await
        .context("Failed to open dataset store")?;

    let result = pipeline.run(&store).await;
    store.close().await;
    Ok(result?)
}

/// Final line of a successful run, always carrying the record count
fn summary(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::Unchanged { records, .. } => {
            format!("Dataset is up to date ({} records)", records)
        },
        SyncOutcome::Loaded { records, .. } => format!("Inserted {} records", records),
    }
}
