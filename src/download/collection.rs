//! Playlist and channel fan-out.
//!
//! Members are processed one after another through the item orchestrator.
//! A failing member is recorded and the next one starts; only configuration
//! errors stop a collection.

use std::path::Path;
use std::sync::Arc;

use futures_util::StreamExt;
use tracing::{info, instrument, warn};

use super::error::DownloadError;
use super::filename::safe_subdirectory;
use super::format::DownloadFormat;
use super::orchestrator::ItemDownloadOrchestrator;
use super::result::{CollectionResult, CollectionResultBuilder};
use crate::config::ConfigError;
use crate::provider::CollectionListing;

/// Downloads every member of a playlist or channel.
pub struct CollectionDownloadOrchestrator {
    items: Arc<ItemDownloadOrchestrator>,
}

impl CollectionDownloadOrchestrator {
    #[must_use]
    pub fn new(items: Arc<ItemDownloadOrchestrator>) -> Self {
        Self { items }
    }

    /// Downloads the collection at `url` into `base_directory`.
    ///
    /// When grouping is enabled for the collection's kind, members go into a
    /// subfolder named after the collection, created before the first member
    /// is fetched. A listing failure produces a
    /// failed result with a single entry for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the settings cannot serve `format`.
    #[instrument(skip(self, base_directory), fields(url = %url, format = %format))]
    pub async fn download_collection(
        &self,
        url: &str,
        format: DownloadFormat,
        base_directory: &Path,
    ) -> Result<CollectionResult, ConfigError> {
        let settings = self.items.settings();
        let config = settings.effective(format);
        self.items.conversion_step(format, &config)?;

        let listing = match self.items.provider().list_collection(url).await {
            Ok(listing) => listing,
            Err(error) => {
                warn!(error = %error, "could not list collection");
                let mut builder = CollectionResultBuilder::new(url);
                builder.record_failure(url, url, error.to_string());
                return Ok(builder.finish());
            }
        };
        let CollectionListing {
            title,
            stable_id,
            kind,
            mut members,
        } = listing;

        let fallback_name = format!("{} ({stable_id})", kind.label());
        let collection_name = if title.trim().is_empty() {
            fallback_name.clone()
        } else {
            title.clone()
        };
        let mut builder = CollectionResultBuilder::new(&collection_name);

        let destination = if settings.group_collection(kind) {
            match safe_subdirectory(base_directory, &title, &fallback_name, config.os) {
                Ok(folder) => {
                    if let Err(e) = tokio::fs::create_dir_all(&folder).await {
                        warn!(directory = %folder.display(), error = %e, "could not create collection folder");
                        builder.record_failure(
                            &collection_name,
                            url,
                            DownloadError::io(&folder, e).to_string(),
                        );
                        return Ok(builder.finish());
                    }
                    folder
                }
                Err(error) => {
                    warn!(directory = %base_directory.display(), "{error}");
                    builder.record_failure(
                        &collection_name,
                        url,
                        DownloadError::impossible_path(base_directory).to_string(),
                    );
                    return Ok(builder.finish());
                }
            }
        } else {
            base_directory.to_path_buf()
        };
        builder.destination(&destination);
        info!(
            collection = %collection_name,
            kind = kind.label(),
            destination = %destination.display(),
            "downloading collection"
        );

        let mut position = 0_usize;
        while let Some(member) = members.next().await {
            position += 1;
            match member {
                Ok(member) => {
                    let result = self
                        .items
                        .download_single_item(&member.url, format, &destination)
                        .await?;
                    builder.record(&member.url, &result);
                }
                Err(error) => {
                    warn!(position, error = %error, "could not read collection entry");
                    builder.record_failure(
                        format!("{collection_name} #{position}"),
                        url,
                        error.to_string(),
                    );
                }
            }
        }

        let result = builder.finish();
        info!(
            collection = %result.collection_name(),
            completed = result.completed(),
            failed = result.failed_items().len(),
            "collection finished"
        );
        Ok(result)
    }
}
