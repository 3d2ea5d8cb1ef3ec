//! Outcome records for single items and collections.

use std::path::{Path, PathBuf};

use super::error::{DownloadError, FailureKind};

/// Outcome of downloading one media item.
///
/// Built only through [`succeeded`](Self::succeeded) and
/// [`failed`](Self::failed): a success always carries a path, a failure always
/// carries a message and never a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItemResult {
    success: bool,
    title: String,
    result_path: Option<PathBuf>,
    error_message: Option<String>,
    failure_kind: Option<FailureKind>,
}

impl MediaItemResult {
    /// Item placed at `path` (a file, or a folder for split/custom downloads).
    #[must_use]
    pub fn succeeded(title: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            success: true,
            title: title.into(),
            result_path: Some(path.into()),
            error_message: None,
            failure_kind: None,
        }
    }

    /// Item that ended with `error`.
    #[must_use]
    pub fn failed(title: impl Into<String>, error: &DownloadError) -> Self {
        Self {
            success: false,
            title: title.into(),
            result_path: None,
            error_message: Some(error.to_string()),
            failure_kind: Some(error.kind()),
        }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.success
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn result_path(&self) -> Option<&Path> {
        self.result_path.as_deref()
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.failure_kind
    }

    /// Failed only because the destination already existed.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.failure_kind.is_some_and(FailureKind::is_skip)
    }
}

/// One failed member of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedItem {
    /// Title when known, otherwise the member URL.
    pub title: String,
    pub source_url: String,
    pub error_message: String,
    pub kind: Option<FailureKind>,
}

/// Outcome of downloading a playlist or channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionResult {
    success: bool,
    collection_name: String,
    destination_directory: Option<PathBuf>,
    failed_items: Vec<FailedItem>,
    completed: usize,
}

impl CollectionResult {
    /// True when no member failed.
    #[must_use]
    pub fn success(&self) -> bool {
        self.success
    }

    #[must_use]
    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    #[must_use]
    pub fn destination_directory(&self) -> Option<&Path> {
        self.destination_directory.as_deref()
    }

    /// Failures in the order the members were listed.
    #[must_use]
    pub fn failed_items(&self) -> &[FailedItem] {
        &self.failed_items
    }

    /// Members downloaded successfully.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Members that failed for a reason other than skip-existing.
    #[must_use]
    pub fn hard_failures(&self) -> usize {
        self.failed_items
            .iter()
            .filter(|item| !item.kind.is_some_and(FailureKind::is_skip))
            .count()
    }
}

/// Accumulates member outcomes while a collection is processed.
#[derive(Debug, Default)]
pub struct CollectionResultBuilder {
    collection_name: String,
    destination_directory: Option<PathBuf>,
    failed_items: Vec<FailedItem>,
    completed: usize,
}

impl CollectionResultBuilder {
    #[must_use]
    pub fn new(collection_name: impl Into<String>) -> Self {
        Self {
            collection_name: collection_name.into(),
            ..Self::default()
        }
    }

    pub fn destination(&mut self, directory: impl Into<PathBuf>) -> &mut Self {
        self.destination_directory = Some(directory.into());
        self
    }

    /// Records a member outcome.
    pub fn record(&mut self, source_url: &str, result: &MediaItemResult) -> &mut Self {
        if result.success() {
            self.completed += 1;
        } else {
            self.failed_items.push(FailedItem {
                title: result.title().to_string(),
                source_url: source_url.to_string(),
                error_message: result.error_message().unwrap_or_default().to_string(),
                kind: result.failure_kind(),
            });
        }
        self
    }

    /// Records a failure that has no item result, e.g. a listing error.
    pub fn record_failure(
        &mut self,
        title: impl Into<String>,
        source_url: impl Into<String>,
        error_message: impl Into<String>,
    ) -> &mut Self {
        self.failed_items.push(FailedItem {
            title: title.into(),
            source_url: source_url.into(),
            error_message: error_message.into(),
            kind: None,
        });
        self
    }

    #[must_use]
    pub fn finish(self) -> CollectionResult {
        CollectionResult {
            success: self.failed_items.is_empty(),
            collection_name: self.collection_name,
            destination_directory: self.destination_directory,
            failed_items: self.failed_items,
            completed: self.completed,
        }
    }
}
