// Sync pipeline configuration

use fide_common::{FideError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

// ============================================================================
// Defaults
// ============================================================================

/// Public download area of the ratings feed
pub const DEFAULT_BASE_URL: &str = "https://ratings.fide.com/download";

/// Archive published by the feed
pub const DEFAULT_ARCHIVE_NAME: &str = "players_list_xml.zip";

/// The one archive entry the parser reads
pub const DEFAULT_DATA_FILE_NAME: &str = "players_list_xml_foa.xml";

pub const DEFAULT_DATABASE_PATH: &str = "fide_ratings.db";

pub const DEFAULT_HASH_FILE: &str = "last_hash.txt";

/// The full feed is tens of megabytes; allow slow mirrors
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Configuration for one sync run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL; the archive is fetched from `{base_url}/{archive_name}`
    pub base_url: String,

    pub archive_name: String,

    /// Entry name read from the extracted archive
    pub data_file_name: String,

    /// Directory the archive is downloaded to and extracted into
    pub work_dir: PathBuf,

    pub database_path: PathBuf,

    /// Plain-text file holding the digest of the last ingested archive
    pub hash_file: PathBuf,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,

    /// Fetch attempts before giving up (at least 1)
    pub max_retries: u32,

    /// Print step-by-step progress and a download bar
    pub show_progress: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            data_file_name: DEFAULT_DATA_FILE_NAME.to_string(),
            work_dir: PathBuf::from("."),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            hash_file: PathBuf::from(DEFAULT_HASH_FILE),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            show_progress: true,
        }
    }
}

impl SyncConfig {
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Full URL of the archive
    pub fn archive_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.archive_name)
    }

    pub fn data_file_path(&self) -> PathBuf {
        self.work_dir.join(&self.data_file_name)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            FideError::config(format!("base_url '{}' is not a valid URL: {}", self.base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FideError::config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }

        for (label, name) in [
            ("archive_name", &self.archive_name),
            ("data_file_name", &self.data_file_name),
        ] {
            if name.is_empty() || name.contains('/') || name.contains('\\') {
                return Err(FideError::config(format!(
                    "{} must be a plain file name, got '{}'",
                    label, name
                )));
            }
        }

        if self.timeout_secs == 0 {
            return Err(FideError::config("timeout_secs must be greater than 0"));
        }

        if self.max_retries == 0 {
            return Err(FideError::config("max_retries must be at least 1"));
        }

        Ok(())
    }
}

/// Builder for SyncConfig
#[derive(Default)]
pub struct SyncConfigBuilder {
    config: SyncConfig,
}

impl SyncConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn archive_name(mut self, name: impl Into<String>) -> Self {
        self.config.archive_name = name.into();
        self
    }

    pub fn data_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.data_file_name = name.into();
        self
    }

    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.work_dir = dir.into();
        self
    }

    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.database_path = path.into();
        self
    }

    pub fn hash_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.hash_file = path.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.config.show_progress = show;
        self
    }

    pub fn build(self) -> SyncConfig {
        self.config
    }
}
