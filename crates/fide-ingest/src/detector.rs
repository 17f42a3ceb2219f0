//! Change detection
//!
//! Parsing and loading dominate a sync run, so a freshly fetched archive is
//! only processed when its SHA-256 digest differs from the digest recorded
//! by the last successful run.

use fide_common::checksum::compute_file_checksum;
use fide_common::Result;
use std::path::Path;
use tracing::debug;

/// Outcome of comparing an artifact against the previous digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeDecision {
    pub changed: bool,
    /// Hex digest of the artifact that was just examined
    pub digest: String,
}

/// Compares artifacts against the digest of the last ingested one
///
/// The previous digest is handed in explicitly at the start of a run; the
/// caller persists the new digest only after the load commits.
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    previous: Option<String>,
}

impl ChangeDetector {
    pub fn new(previous: Option<String>) -> Self {
        Self { previous }
    }

    pub fn previous(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    /// Digest `artifact` (streamed) and compare it with the previous digest
    pub fn detect(&self, artifact: &Path) -> Result<ChangeDecision> {
        let digest = compute_file_checksum(artifact)?;
        let changed = self.previous.as_deref() != Some(digest.as_str());

        debug!(
            previous = self.previous().unwrap_or("<none>"),
            current = %digest,
            changed,
            "Compared artifact digest"
        );

        Ok(ChangeDecision { changed, digest })
    }
}
