//! Error types for the download module.
//!
//! [`DownloadError`] describes why a single media item could not be placed on
//! disk. It never escapes the orchestrators: it is folded into a
//! [`MediaItemResult`](super::MediaItemResult) or a collection failure entry.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::convert::ConversionError;
use crate::provider::ProviderError;

/// Errors that end the processing of one media item.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Metadata could not be resolved, or no stream matched the requested format.
    #[error("YouTube video: ({title}) has no streams.")]
    NoStreamsFound {
        /// Resolved title, or the source URL when resolution failed.
        title: String,
    },

    /// The destination already exists and skip-existing is enabled.
    #[error(
        "Skipping download of ({title}) because it already exists in the download directory ({directory})"
    )]
    DownloadSkippedExisting {
        /// Media title.
        title: String,
        /// Directory that already holds the file.
        directory: PathBuf,
    },

    /// The provider returned no file without reporting an error.
    #[error("Download of ({title}) was cancelled before it completed")]
    DownloadCancelled {
        /// Media title.
        title: String,
    },

    /// The destination directory leaves no room for a filename.
    #[error(
        "Cannot download media to ({directory}) due to hitting the system's path length limit. Choose a shorter download location."
    )]
    ImpossibleDownloadPath {
        /// Directory that is too deep.
        directory: PathBuf,
    },

    /// The external converter failed.
    #[error("Failed to convert ({title}): {source}")]
    ConverterFailure {
        /// Media title.
        title: String,
        /// The underlying converter error.
        #[source]
        source: ConversionError,
    },

    /// One or more streams of a custom selection failed.
    #[error("{} of the selected streams of ({title}) failed: {}", .failed.len(), format_failed_streams(.failed))]
    StreamsFailed {
        /// Media title.
        title: String,
        /// `(stream id, error message)` per failed stream, in selection order.
        failed: Vec<(String, String)>,
    },

    /// The metadata provider failed while transferring a stream.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// File system error while preparing the destination.
    #[error("IO error at {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates a no-streams error.
    pub fn no_streams(title: impl Into<String>) -> Self {
        Self::NoStreamsFound {
            title: title.into(),
        }
    }

    /// Creates a skipped-existing error.
    pub fn skipped_existing(title: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self::DownloadSkippedExisting {
            title: title.into(),
            directory: directory.into(),
        }
    }

    /// Creates a cancelled error.
    pub fn cancelled(title: impl Into<String>) -> Self {
        Self::DownloadCancelled {
            title: title.into(),
        }
    }

    /// Creates a path-length error for `directory`.
    pub fn impossible_path(directory: impl Into<PathBuf>) -> Self {
        Self::ImpossibleDownloadPath {
            directory: directory.into(),
        }
    }

    /// Creates a converter failure.
    pub fn converter(title: impl Into<String>, source: ConversionError) -> Self {
        Self::ConverterFailure {
            title: title.into(),
            source,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Classifies the error for summaries and exit codes.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NoStreamsFound { .. } => FailureKind::NoStreams,
            Self::DownloadSkippedExisting { .. } => FailureKind::SkippedExisting,
            Self::DownloadCancelled { .. } => FailureKind::Cancelled,
            Self::ImpossibleDownloadPath { .. } => FailureKind::PathTooLong,
            Self::ConverterFailure { .. } => FailureKind::Conversion,
            Self::StreamsFailed { .. } => FailureKind::StreamsFailed,
            Self::Provider(_) => FailureKind::Provider,
            Self::Io { .. } => FailureKind::Io,
        }
    }
}

fn format_failed_streams(failed: &[(String, String)]) -> String {
    failed
        .iter()
        .map(|(id, message)| format!("[{id}] {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Coarse category of an item failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    NoStreams,
    SkippedExisting,
    Cancelled,
    PathTooLong,
    Conversion,
    StreamsFailed,
    Provider,
    Io,
}

impl FailureKind {
    /// Short label used in run summaries.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoStreams => "no streams",
            Self::SkippedExisting => "skipped",
            Self::Cancelled => "cancelled",
            Self::PathTooLong => "path too long",
            Self::Conversion => "conversion",
            Self::StreamsFailed => "streams failed",
            Self::Provider => "provider",
            Self::Io => "io",
        }
    }

    /// Whether the item was intentionally left alone rather than broken.
    #[must_use]
    pub fn is_skip(self) -> bool {
        matches!(self, Self::SkippedExisting)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
