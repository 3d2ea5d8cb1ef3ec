//! Byte transfer of a single stream over HTTP.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::{ProviderError, TransferCallback};
use crate::user_agent;

/// Time allowed to establish a connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Time allowed for a whole transfer. Long videos run to gigabytes.
pub const TRANSFER_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Distinguishes `.part` files of concurrent transfers within one process.
static PART_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Streams remote media into local files.
///
/// One client is shared by every transfer of a run so connections are pooled.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeouts(CONNECT_TIMEOUT, TRANSFER_TIMEOUT)
    }

    /// # Panics
    ///
    /// Panics if reqwest cannot build a client from this fixed configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_timeouts(connect: Duration, transfer: Duration) -> Self {
        let client = Client::builder()
            .connect_timeout(connect)
            .timeout(transfer)
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .expect("static HTTP client configuration is valid");
        Self { client }
    }

    /// Streams `url` into `output_dir/filename`, creating `output_dir` if needed.
    ///
    /// `on_progress` receives `(downloaded, remaining)` after every chunk;
    /// `size_hint` stands in for a missing Content-Length. With
    /// `skip_existing` an existing destination short-circuits to `Ok(None)`
    /// before any request is made. The body goes to a hidden `.part` file next
    /// to the destination and replaces it only once complete, so a transfer
    /// that fails or is dropped midway leaves the destination untouched.
    ///
    /// # Errors
    ///
    /// [`ProviderError::InvalidUrl`] for an unparsable URL,
    /// [`ProviderError::HttpStatus`] for a non-2xx response,
    /// [`ProviderError::Network`] or [`ProviderError::Timeout`] when the
    /// connection fails and [`ProviderError::Io`] when the file cannot be written.
    #[instrument(skip(self, on_progress), fields(url = %url))]
    pub async fn download_to_file(
        &self,
        url: &str,
        output_dir: &Path,
        filename: &str,
        skip_existing: bool,
        size_hint: Option<u64>,
        on_progress: Option<TransferCallback>,
    ) -> Result<Option<PathBuf>, ProviderError> {
        let destination = output_dir.join(filename);
        if skip_existing && destination.exists() {
            debug!(path = %destination.display(), "destination exists, not requesting");
            return Ok(None);
        }
        let parsed = Url::parse(url).map_err(|_| ProviderError::invalid_url(url))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| ProviderError::network(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::http_status(url, status.as_u16()));
        }
        let expected = response.content_length().or(size_hint);

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| ProviderError::io(output_dir, e))?;
        let mut partial = PartialFile::new(output_dir);
        let file = File::create(&partial.path)
            .await
            .map_err(|e| ProviderError::io(&partial.path, e))?;

        let sink = BodySink {
            url,
            path: &partial.path,
            expected,
            on_progress: on_progress.as_ref(),
        };
        let bytes = sink.write(file, response).await?;
        tokio::fs::rename(&partial.path, &destination)
            .await
            .map_err(|e| ProviderError::io(&destination, e))?;
        partial.keep();

        info!(path = %destination.display(), bytes, "stream saved");
        Ok(Some(destination))
    }
}

/// An in-progress download file, deleted on drop unless kept.
///
/// Covers error returns and a transfer future dropped mid-stream.
struct PartialFile {
    path: PathBuf,
    kept: bool,
}

impl PartialFile {
    fn new(output_dir: &Path) -> Self {
        let n = PART_COUNTER.fetch_add(1, Ordering::Relaxed);
        let name = format!(".cadmium-{}-{n}.part", std::process::id());
        Self {
            path: output_dir.join(name),
            kept: false,
        }
    }

    /// The file was renamed into place; nothing to remove.
    fn keep(&mut self) {
        self.kept = true;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.kept {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed partial download"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => debug!(path = %self.path.display(), error = %e, "partial file not removed"),
        }
    }
}

/// Where one response body goes.
struct BodySink<'a> {
    url: &'a str,
    path: &'a Path,
    expected: Option<u64>,
    on_progress: Option<&'a TransferCallback>,
}

impl BodySink<'_> {
    /// Writes every chunk and returns the byte count.
    async fn write(&self, file: File, response: reqwest::Response) -> Result<u64, ProviderError> {
        let mut writer = BufWriter::new(file);
        let mut body = response.bytes_stream();
        let mut written = 0_u64;

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| ProviderError::network(self.url, e))?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| ProviderError::io(self.path, e))?;
            written += chunk.len() as u64;
            if let Some(callback) = self.on_progress {
                callback(written, self.remaining(written));
            }
        }

        writer
            .flush()
            .await
            .map_err(|e| ProviderError::io(self.path, e))?;
        Ok(written)
    }

    fn remaining(&self, written: u64) -> u64 {
        self.expected.map_or(0, |total| total.saturating_sub(written))
    }
}
