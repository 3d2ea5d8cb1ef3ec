//! Temporary staging area for downloads that still need converting.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::DownloadError;
use crate::progress::{ProgressScope, ProgressSink, ProgressUnit};

/// Directory holding streams between transfer and conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingArea {
    directory: PathBuf,
}

impl StagingArea {
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Creates the directory and reports files left behind by earlier runs.
    ///
    /// Residue is never an error. Returns the number of residual files.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] when the directory cannot be created or read.
    pub async fn prepare(&self, silence_residue: bool) -> Result<usize, DownloadError> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| DownloadError::io(&self.directory, e))?;

        let residue = self.residual_files().await?.len();
        if residue > 0 {
            if silence_residue {
                debug!(directory = %self.directory.display(), files = residue, "staging residue");
            } else {
                warn!(
                    directory = %self.directory.display(),
                    files = residue,
                    "Staging directory is not empty; run `cadmium clean` to remove leftovers"
                );
            }
        }
        Ok(residue)
    }

    /// Number of regular files currently staged. A missing directory counts as empty.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] when the directory cannot be read.
    pub async fn count_residue(&self) -> Result<usize, DownloadError> {
        Ok(self.residual_files().await?.len())
    }

    /// Removes every regular file in the staging directory.
    ///
    /// Progress is reported in files. Returns the number of files removed.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] for the first file that cannot be removed.
    pub async fn clear(&self, sink: &Arc<dyn ProgressSink>) -> Result<usize, DownloadError> {
        let files = self.residual_files().await?;
        if files.is_empty() {
            debug!(directory = %self.directory.display(), "staging already empty");
            return Ok(0);
        }

        let scope = ProgressScope::open(
            sink,
            "Clearing staging directory",
            files.len() as u64,
            ProgressUnit::Files,
        );
        for (index, file) in files.iter().enumerate() {
            tokio::fs::remove_file(file)
                .await
                .map_err(|e| DownloadError::io(file, e))?;
            scope.update(index as u64 + 1);
        }
        scope.complete();

        info!(directory = %self.directory.display(), files = files.len(), "staging cleared");
        Ok(files.len())
    }

    async fn residual_files(&self) -> Result<Vec<PathBuf>, DownloadError> {
        let mut entries = match tokio::fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DownloadError::io(&self.directory, e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DownloadError::io(&self.directory, e))?
        {
            let is_file = entry
                .file_type()
                .await
                .map_err(|e| DownloadError::io(entry.path(), e))?
                .is_file();
            if is_file {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Staged inputs of one item, removed when dropped.
#[derive(Debug, Default)]
pub struct StagedFiles {
    paths: Vec<PathBuf>,
}

impl StagedFiles {
    pub fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl Drop for StagedFiles {
    fn drop(&mut self) {
        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "removed staged file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "could not remove staged file"),
            }
        }
    }
}
