//! FIDE Common Library
//!
//! Shared types, storage and error handling for the FIDE ratings tools.
//!
//! # Overview
//!
//! This crate provides the functionality used by both the sync pipeline
//! (`fide-ingest`) and the query tool (`fide-cli`):
//!
//! - **Error Handling**: The [`FideError`] taxonomy and [`Result`] alias
//! - **Checksums**: Streaming SHA-256 digests of downloaded artifacts
//! - **Types**: The player rating record and the closed field whitelist
//! - **Store**: The SQLite-backed dataset store
//! - **Logging**: Subscriber setup shared by both binaries
//!
//! # Example
//!
//! ```no_run
//! use fide_common::store::DatasetStore;
//! use fide_common::types::Field;
//!
//! # async fn run() -> fide_common::Result<()> {
//! let store = DatasetStore::open("fide_ratings.db").await?;
//! store.ensure_schema().await?;
//! let rows = store
//!     .query_by_ids(&["1503014".to_string()], &[Field::Id, Field::Rating])
//!     .await?;
//! println!("{} rows", rows.len());
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod checksum;
pub mod error;
pub mod logging;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{FideError, Result};
pub use types::{Field, FieldValue, PlayerRecord};
