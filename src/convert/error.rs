//! Error types for external conversion jobs.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or running a conversion job.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// A job needs at least one input file.
    #[error("conversion job has no input files")]
    NoInputs,

    /// The converter process could not be started.
    #[error("failed to start converter {}: {source}", .program.display())]
    Spawn {
        /// Converter executable.
        program: PathBuf,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The converter exited unsuccessfully.
    #[error("converter exited with code {}: {stderr}", .code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    Failed {
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Trimmed standard error output.
        stderr: String,
    },

    /// Waiting on or reading from the converter failed.
    #[error("IO error while converting to {}: {source}", .output.display())]
    Io {
        /// Requested output file.
        output: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The job was started twice.
    #[error("conversion job was already executed")]
    AlreadyExecuted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_error_failed_display() {
        let error = ConversionError::Failed {
            code: Some(1),
            stderr: "Invalid data found when processing input".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("code 1"), "{msg}");
        assert!(msg.contains("Invalid data"), "{msg}");
    }

    #[test]
    fn test_conversion_error_killed_display() {
        let error = ConversionError::Failed {
            code: None,
            stderr: String::new(),
        };
        assert!(error.to_string().contains("code none"));
    }
}
