//! FIDE Ingest Library
//!
//! Synchronizes the public FIDE players feed into the local dataset store.
//!
//! # Pipeline
//!
//! - **fetcher**: downloads the published archive
//! - **detector**: skips the run when the archive digest is unchanged
//! - **extractor**: unpacks the archive into the working directory
//! - **parser**: streams player records out of the XML data file
//! - **pipeline**: wires the steps together and reloads the store
//!
//! # Example
//!
//! ```no_run
//! use fide_common::store::DatasetStore;
//! use fide_ingest::{SyncConfig, SyncPipeline};
//!
//! #[tokio::main]
//! async fn main() -> fide_common::Result<()> {
//!     let config = SyncConfig::default();
//!     let store = DatasetStore::open(&config.database_path).await?;
//!     let outcome = SyncPipeline::new(config)?.run(&store).await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod detector;
pub mod extractor;
pub mod fetcher;
pub mod hash_store;
pub mod parser;
pub mod pipeline;

#[cfg(test)]
mod test_helpers;

pub use config::SyncConfig;
pub use pipeline::{SyncOutcome, SyncPipeline};
