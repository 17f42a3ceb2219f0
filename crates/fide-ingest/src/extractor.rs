//! Archive extraction
//!
//! Extracts every entry of the downloaded zip into the working directory and
//! removes the archive afterwards. The parser only reads the one entry whose
//! name it is configured with; extra entries are left alone.

use fide_common::{FideError, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::result::ZipError;
use zip::ZipArchive;

/// Extract all entries of `archive_path` into `target_dir`, then delete the
/// archive
///
/// Returns the paths of the extracted files. On failure the archive is kept
/// so it can be inspected.
pub fn extract_archive(archive_path: &Path, target_dir: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| classify(archive_path, e))?;

    let mut extracted = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(|e| classify(archive_path, e))?;
        if entry.is_dir() {
            continue;
        }
        match entry.enclosed_name() {
            Some(relative) => extracted.push(target_dir.join(relative)),
            None => warn!(entry = entry.name(), "Skipping entry with unsafe path"),
        }
    }

    std::fs::create_dir_all(target_dir)?;
    archive
        .extract(target_dir)
        .map_err(|e| classify(archive_path, e))?;

    debug!(entries = extracted.len(), target = %target_dir.display(), "Archive extracted");

    std::fs::remove_file(archive_path)?;
    info!(archive = %archive_path.display(), "Removed archive after extraction");

    Ok(extracted)
}

/// Disk errors are IO failures; everything else means the archive is bad
fn classify(archive_path: &Path, error: ZipError) -> FideError {
    match error {
        ZipError::Io(io) => FideError::Io(io),
        other => FideError::corrupt_archive(archive_path, other),
    }
}
