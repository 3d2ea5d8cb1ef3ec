//! External media conversion.
//!
//! A [`Converter`] turns one or more staged inputs into a single output file.
//! Each call produces a [`ConversionJob`] that owns the external process for
//! its lifetime.

mod error;
mod ffmpeg;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

pub use error::ConversionError;
pub use ffmpeg::{FfmpegConverter, parse_progress_line};

/// Progress callback: seconds of output media written so far.
pub type ConversionCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// Factory for conversion jobs.
pub trait Converter: Send + Sync {
    /// Prepares a job converting `inputs` into `output`. Nothing runs yet.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::NoInputs`] for an empty input list.
    fn build_job(
        &self,
        inputs: &[PathBuf],
        output: &Path,
    ) -> Result<Box<dyn ConversionJob>, ConversionError>;
}

/// A single conversion run.
#[async_trait]
pub trait ConversionJob: Send {
    /// Registers the progress observer. Must be called before `execute`.
    fn on_progress(&mut self, callback: ConversionCallback);

    /// Runs the conversion to completion.
    async fn execute(&mut self) -> Result<(), ConversionError>;

    /// Stops the conversion if it is still running. Safe to call at any time.
    async fn terminate(&mut self);
}
