//! Error types for the FIDE ratings tools

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for FIDE operations
pub type Result<T> = std::result::Result<T, FideError>;

/// Main error type shared by the sync pipeline and the query tool
#[derive(Error, Debug)]
pub enum FideError {
    /// Network, DNS, HTTP status or timeout failure while fetching the feed
    #[error("Fetch failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    /// The downloaded archive could not be read as a zip file
    #[error("Corrupt archive '{}': {reason}", .path.display())]
    CorruptArchive { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The contractually known data file was not in the archive
    #[error("Data file not found after extraction: {}", .0.display())]
    MissingDataFile(PathBuf),

    /// A required field is missing or does not have the expected type
    #[error("Malformed record #{record}: field '{field}' {reason}")]
    MalformedRecord {
        record: usize,
        field: String,
        reason: String,
    },

    #[error("Failed to open database '{}': {source}", .path.display())]
    Database {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    #[error("Schema error: {0}")]
    Schema(#[source] sqlx::Error),

    /// The full-replace load was rolled back; the previous snapshot is intact
    #[error("Transaction failed, previous snapshot retained: {0}")]
    TransactionFailure(#[source] sqlx::Error),

    /// An empty feed is treated as a load failure, never as a valid snapshot
    #[error("Refusing to replace the dataset with an empty snapshot")]
    EmptySnapshot,

    #[error("Invalid field '{name}'. Allowed fields: {allowed}")]
    InvalidField { name: String, allowed: String },

    #[error("No output fields requested")]
    EmptyProjection,

    #[error("Query error: {0}")]
    Query(#[source] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FideError {
    /// Create a fetch failure error
    pub fn fetch_failed(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::FetchFailed {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a corrupt archive error
    pub fn corrupt_archive(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::CorruptArchive {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a malformed record error
    pub fn malformed(record: usize, field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            record,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
