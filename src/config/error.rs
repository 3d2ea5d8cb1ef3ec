//! Error types for configuration loading and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that make a whole run impossible.
///
/// Unlike per-item download errors these are never recorded against a single
/// media item; they propagate to the caller and end the run.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A setting holds a value the run cannot work with.
    #[error("invalid configuration for '{setting}': {context}")]
    InvalidConfiguration {
        /// Name of the offending setting.
        setting: String,
        /// What is wrong with it.
        context: String,
    },

    /// A configured path does not exist.
    #[error("'{setting}' points to {} which does not exist", .path.display())]
    PathDoesNotExist {
        /// Name of the offending setting.
        setting: String,
        /// The missing path.
        path: PathBuf,
    },

    /// A configured directory is a regular file.
    #[error("'{setting}' points to {} which is a file, not a directory", .path.display())]
    DirectoryIsAFile {
        /// Name of the offending setting.
        setting: String,
        /// The file path.
        path: PathBuf,
    },

    /// The configuration file exists but could not be read.
    #[error("failed to read configuration file {}: {source}", .path.display())]
    Read {
        /// Configuration file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for the expected shape.
    #[error("failed to parse configuration file {}: {source}", .path.display())]
    Parse {
        /// Configuration file path.
        path: PathBuf,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Creates an invalid-configuration error.
    pub fn invalid(setting: impl Into<String>, context: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            setting: setting.into(),
            context: context.into(),
        }
    }
}
