//! Sync pipeline
//!
//! Runs fetch, change detection, extraction, parsing and the transactional
//! reload once. Nothing destructive happens before the new feed is fully
//! parsed, and the digest is persisted only after the load commits, so a
//! failed run leaves the dataset and digest untouched and the next run
//! starts from scratch.

use crate::config::SyncConfig;
use crate::detector::ChangeDetector;
use crate::extractor::extract_archive;
use crate::fetcher::RemoteFetcher;
use crate::hash_store::HashStore;
use crate::parser::parse_file;
use colored::Colorize;
use fide_common::store::DatasetStore;
use fide_common::{FideError, Result};
use std::path::Path;
use tracing::{info, warn};

/// Result of one successful sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The fetched archive matched the stored digest; nothing was loaded.
    /// `records` is the size of the snapshot already in the store.
    Unchanged { records: u64, digest: String },
    /// A new snapshot was committed
    Loaded { records: u64, digest: String },
}

impl SyncOutcome {
    pub fn digest(&self) -> &str {
        match self {
            SyncOutcome::Unchanged { digest, .. } | SyncOutcome::Loaded { digest, .. } => digest,
        }
    }

    /// Number of records in the store after the run
    pub fn records(&self) -> u64 {
        match self {
            SyncOutcome::Unchanged { records, .. } | SyncOutcome::Loaded { records, .. } => *records,
        }
    }
}

pub struct SyncPipeline {
    config: SyncConfig,
    fetcher: RemoteFetcher,
    hash_store: HashStore,
}

impl SyncPipeline {
    pub fn new(config: SyncConfig) -> Result<Self> {
        let fetcher = RemoteFetcher::new(&config)?;
        let hash_store = HashStore::new(config.hash_file.clone());
        Ok(Self {
            config,
            fetcher,
            hash_store,
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Run the pipeline once against `store`
    pub async fn run(&self, store: &DatasetStore) -> Result<SyncOutcome> {
        store.ensure_schema().await?;

        let detector = ChangeDetector::new(self.hash_store.load()?);

        self.step(&format!("Downloading {}", self.config.archive_url()));
        let archive = self
            .fetcher
            .fetch(&self.config.archive_name, &self.config.work_dir)
            .await?;

        let decision = detector.detect(&archive)?;
        if !decision.changed {
            info!(digest = %decision.digest, "Feed unchanged since last sync");
            remove_if_present(&archive);
            self.step("No changes detected, skipping update");
            let records = u64::try_from(store.count().await?).unwrap_or_default();
            return Ok(SyncOutcome::Unchanged {
                records,
                digest: decision.digest,
            });
        }

        // A data file left by an earlier failed run must never stand in for
        // this archive's content
        let data_file = self.config.data_file_path();
        remove_if_present(&data_file);

        self.step("New data detected, extracting archive");
        let extracted = extract_archive(&archive, &self.config.work_dir)?;
        if !extracted.contains(&data_file) || !data_file.is_file() {
            return Err(FideError::MissingDataFile(data_file));
        }

        self.step(&format!("Parsing {}", data_file.display()));
        let records = parse_file(&data_file)?;

        self.step(&format!("Loading {} records", records.len()));
        let loaded = store.replace_all(&records).await?;

        self.hash_store.save(&decision.digest)?;
        remove_if_present(&data_file);

        info!(records = loaded, digest = %decision.digest, "Sync complete");
        Ok(SyncOutcome::Loaded {
            records: loaded,
            digest: decision.digest,
        })
    }

    fn step(&self, message: &str) {
        if self.config.show_progress {
            println!("{} {}", "→".cyan().bold(), message);
        }
    }
}

fn remove_if_present(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {},
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
        Err(e) => warn!(path = %path.display(), error = %e, "Could not remove file"),
    }
}
