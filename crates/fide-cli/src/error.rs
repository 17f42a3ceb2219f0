//! Error types for the query CLI
//!
//! Every variant is user-facing: the message names the offending input and,
//! where one exists, the way to fix it.

use fide_common::FideError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// The key-list file could not be read
    #[error("Cannot read key list '{}': {source}. Verify the file path exists and you have read permissions.", .path.display())]
    KeyListUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The database file does not exist
    #[error("Database '{}' does not exist. Run 'fide-sync' first or pass --database.", .0.display())]
    DatabaseMissing(PathBuf),

    /// Writing the CSV output failed
    #[error("Failed to write output '{}': {reason}. Check file permissions and disk space.", .path.display())]
    Output { path: PathBuf, reason: String },

    /// Validation, store and query failures from the shared library
    #[error(transparent)]
    Fide(#[from] FideError),
}

impl CliError {
    pub fn output(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Output {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
