// Persisted digest of the last successfully ingested archive

use fide_common::Result;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A single plain-text file holding one hex digest
///
/// Absence of the file (or an empty file) means no sync has ever completed.
#[derive(Debug, Clone)]
pub struct HashStore {
    path: PathBuf,
}

impl HashStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored digest, if any
    pub fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let digest = contents.trim();
                if digest.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(digest.to_string()))
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite the stored digest
    ///
    /// Written to a sibling temp file and renamed, so readers see either the
    /// old digest or the new one.
    pub fn save(&self, digest: &str) -> Result<()> {
        let mut tmp_name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "last_hash".into());
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        std::fs::write(&tmp_path, digest)?;
        std::fs::rename(&tmp_path, &self.path)?;

        debug!(path = %self.path.display(), "Stored digest");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_means_no_prior_sync() {
        let temp = TempDir::new().unwrap();
        let store = HashStore::new(temp.path().join("last_hash.txt"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_blank_file_means_no_prior_sync() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("last_hash.txt");
        std::fs::write(&path, "  \n").unwrap();
        assert_eq!(HashStore::new(path).load().unwrap(), None);
    }

    #[test]
    fn test_save_then_load_trims_whitespace() {
        let temp = TempDir::new().unwrap();
        let store = HashStore::new(temp.path().join("last_hash.txt"));

        store.save("abc123").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc123"));

        std::fs::write(store.path(), "def456\n").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("def456"));

        assert!(!temp.path().join("last_hash.txt.tmp").exists());
    }
}
