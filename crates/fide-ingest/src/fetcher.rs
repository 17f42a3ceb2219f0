// Remote fetcher for the ratings archive

use crate::config::SyncConfig;
use fide_common::{FideError, Result};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Failure of a single download attempt
struct AttemptError {
    error: FideError,
    /// Transport failures, timeouts and 5xx responses may succeed on retry
    retryable: bool,
}

impl AttemptError {
    fn retryable(error: FideError) -> Self {
        Self {
            error,
            retryable: true,
        }
    }
}

impl From<std::io::Error> for AttemptError {
    fn from(e: std::io::Error) -> Self {
        Self {
            error: FideError::Io(e),
            retryable: false,
        }
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

/// Downloads named artifacts from the feed's base URL
pub struct RemoteFetcher {
    client: Client,
    base_url: String,
    max_retries: u32,
    show_progress: bool,
}

impl RemoteFetcher {
    pub fn new(config: &SyncConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("fide-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FideError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            show_progress: config.show_progress,
        })
    }

    pub fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    /// Fetch `name` into `dest_dir/name`, overwriting any existing file
    ///
    /// The body is streamed into `name.part` and renamed into place only
    /// once complete. On failure the partial file is removed, so the caller
    /// never sees a half-written artifact. Only transport errors, timeouts
    /// and 5xx responses are retried.
    pub async fn fetch(&self, name: &str, dest_dir: &Path) -> Result<PathBuf> {
        let url = self.url_for(name);
        let dest = dest_dir.join(name);
        let partial = dest_dir.join(format!("{}.part", name));

        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            match self.fetch_once(&url, &partial).await {
                Ok(bytes) => {
                    if let Err(e) = tokio::fs::rename(&partial, &dest).await {
                        remove_partial(&partial).await;
                        return Err(e.into());
                    }
                    info!(url = %url, bytes, path = %dest.display(), "Fetched artifact");
                    return Ok(dest);
                },
                Err(AttemptError { error, retryable }) => {
                    remove_partial(&partial).await;
                    warn!(attempt, max = self.max_retries, error = %error, "Fetch attempt failed");
                    if !retryable {
                        return Err(error);
                    }
                    last_error = Some(error);

                    if attempt < self.max_retries {
                        // Exponential backoff: 2^attempt seconds
                        let backoff_secs = 2u64.pow(attempt);
                        info!("Retrying in {} seconds...", backoff_secs);
                        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                    }
                },
            }
        }

        Err(last_error.unwrap_or_else(|| FideError::fetch_failed(url, "no attempts were made")))
    }

    /// Single download attempt, returns the number of bytes written
    async fn fetch_once(&self, url: &str, partial: &Path) -> std::result::Result<u64, AttemptError> {
        debug!(url = %url, "Requesting artifact");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AttemptError::retryable(FideError::fetch_failed(url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError {
                error: FideError::fetch_failed(url, format!("HTTP status {}", status)),
                retryable: is_retryable_status(status),
            });
        }

        let pb = self.progress_bar(response.content_length(), url);

        let mut file = tokio::fs::File::create(partial).await?;
        let mut downloaded = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| AttemptError::retryable(FideError::fetch_failed(url, e)))?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;
            pb.set_position(downloaded);
        }

        file.flush().await?;
        file.sync_all().await?;
        pb.finish_and_clear();

        Ok(downloaded)
    }

    fn progress_bar(&self, total: Option<u64>, url: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total.unwrap_or(0));
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(format!("Downloading {}", url));
        pb
    }
}

async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed partial download"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
        Err(e) => warn!(path = %path.display(), error = %e, "Could not remove partial download"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> SyncConfig {
        SyncConfig::builder()
            .base_url(base_url)
            .max_retries(1)
            .timeout_secs(5)
            .show_progress(false)
            .build()
    }

    #[tokio::test]
    async fn test_fetch_writes_body_to_named_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"zip-bytes".to_vec()))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("feed.zip"), b"stale").unwrap();

        let fetcher = RemoteFetcher::new(&test_config(&server.uri())).unwrap();
        let dest = fetcher.fetch("feed.zip", temp.path()).await.unwrap();

        assert_eq!(dest, temp.path().join("feed.zip"));
        assert_eq!(std::fs::read(&dest).unwrap(), b"zip-bytes");
        assert!(!temp.path().join("feed.zip.part").exists());
    }

    #[tokio::test]
    async fn test_http_error_is_fetch_failed_and_leaves_no_partial() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let fetcher = RemoteFetcher::new(&test_config(&server.uri())).unwrap();
        let result = fetcher.fetch("feed.zip", temp.path()).await;

        match result {
            Err(FideError::FetchFailed { url, reason }) => {
                assert!(url.ends_with("/feed.zip"));
                assert!(reason.contains("404"));
            },
            other => panic!("expected FetchFailed, got {:?}", other),
        }
        assert!(!temp.path().join("feed.zip").exists());
        assert!(!temp.path().join("feed.zip.part").exists());
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let config = SyncConfig::builder()
            .base_url(server.uri())
            .max_retries(3)
            .timeout_secs(5)
            .show_progress(false)
            .build();
        let fetcher = RemoteFetcher::new(&config).unwrap();

        let started = std::time::Instant::now();
        let result = fetcher.fetch("feed.zip", temp.path()).await;

        assert!(matches!(result, Err(FideError::FetchFailed { .. })));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed.zip"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/feed.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"zip-bytes".to_vec()))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let config = SyncConfig::builder()
            .base_url(server.uri())
            .max_retries(2)
            .timeout_secs(5)
            .show_progress(false)
            .build();
        let fetcher = RemoteFetcher::new(&config).unwrap();

        let dest = fetcher.fetch("feed.zip", temp.path()).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"zip-bytes");
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_rename_leaves_no_partial() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"zip-bytes".to_vec()))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        // A non-empty directory cannot be replaced by a file
        let blocker = temp.path().join("feed.zip");
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("keep"), b"x").unwrap();

        let fetcher = RemoteFetcher::new(&test_config(&server.uri())).unwrap();
        let result = fetcher.fetch("feed.zip", temp.path()).await;

        assert!(matches!(result, Err(FideError::Io(_))));
        assert!(!temp.path().join("feed.zip.part").exists());
        assert!(blocker.join("keep").exists());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_failed() {
        let temp = TempDir::new().unwrap();
        // Port 9 (discard) on localhost is closed in test environments
        let fetcher = RemoteFetcher::new(&test_config("http://127.0.0.1:9")).unwrap();
        let result = fetcher.fetch("feed.zip", temp.path()).await;
        assert!(matches!(result, Err(FideError::FetchFailed { .. })));
    }

    #[test]
    fn test_url_for_joins_base_and_name() {
        let fetcher = RemoteFetcher::new(&test_config("https://example.org/download/")).unwrap();
        assert_eq!(fetcher.url_for("a.zip"), "https://example.org/download/a.zip");
    }
}
