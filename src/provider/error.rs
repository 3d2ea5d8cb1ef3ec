//! Error types for metadata providers and byte transfer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving metadata or transferring a stream.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error while writing a stream.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The helper program could not be started.
    #[error("failed to run {program}: {source}\n  Suggestion: install {program} and make sure it is on PATH")]
    ToolMissing {
        /// Program name.
        program: String,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The helper program exited unsuccessfully.
    #[error("{program} failed for {url} (exit code {}): {stderr}", .code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    ToolFailed {
        /// Program name.
        program: String,
        /// The URL being resolved.
        url: String,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Trimmed standard error output.
        stderr: String,
    },

    /// The helper program produced metadata that could not be decoded.
    #[error("unreadable metadata for {url}: {source}")]
    InvalidMetadata {
        /// The URL being resolved.
        url: String,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The stream has no location the provider can transfer from.
    #[error("stream {stream_id} has no transfer URL")]
    NoTransferUrl {
        /// The stream id.
        stream_id: String,
    },
}

impl ProviderError {
    /// Creates a network error from a reqwest error, promoting timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a missing-tool error.
    pub fn tool_missing(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::ToolMissing {
            program: program.into(),
            source,
        }
    }
}
