//! Per-item download pipeline.
//!
//! One media item moves through metadata resolution, stream selection,
//! destination naming, the existence check, the transfer and an optional
//! conversion. Every per-item failure ends up in a [`MediaItemResult`]; only
//! configuration errors escape as `Err`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::constants::{
    AUDIO_PREFIX, VIDEO_PREFIX, fallback_streams_folder_name, fallback_video_name, stream_prefix,
};
use super::conversion::{self, CONVERTER_SETTING};
use super::error::DownloadError;
use super::filename::{compose_safe_filename, filename_budget, safe_subdirectory};
use super::format::DownloadFormat;
use super::picker::{FixedStreamPicker, StreamPicker};
use super::result::MediaItemResult;
use super::selector::{StreamSelection, select_streams};
use super::staging::StagedFiles;
use crate::config::{ConfigError, DownloadSettings, EffectiveDownloadConfig};
use crate::convert::Converter;
use crate::progress::{ProgressScope, ProgressSink, ProgressUnit};
use crate::provider::{MetadataProvider, ResolvedMedia, StreamDescriptor, TransferCallback};

/// A conversion that every item of a run goes through.
pub(crate) struct ConversionStep {
    converter: Arc<dyn Converter>,
    extension: String,
}

/// What one item is being processed with.
struct ItemContext<'a> {
    media: &'a ResolvedMedia,
    config: &'a EffectiveDownloadConfig,
    conversion: Option<&'a ConversionStep>,
    fallback_name: String,
}

/// Downloads single media items.
///
/// Collaborators are injected once; the settings snapshot is read-only for
/// the lifetime of the orchestrator.
pub struct ItemDownloadOrchestrator {
    provider: Arc<dyn MetadataProvider>,
    converter: Option<Arc<dyn Converter>>,
    progress: Arc<dyn ProgressSink>,
    picker: Arc<dyn StreamPicker>,
    settings: Arc<DownloadSettings>,
}

impl ItemDownloadOrchestrator {
    /// Creates an orchestrator without a converter that picks every custom stream.
    #[must_use]
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        progress: Arc<dyn ProgressSink>,
        settings: DownloadSettings,
    ) -> Self {
        Self {
            provider,
            converter: None,
            progress,
            picker: Arc::new(FixedStreamPicker::all()),
            settings: Arc::new(settings),
        }
    }

    #[must_use]
    pub fn with_converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.converter = Some(converter);
        self
    }

    #[must_use]
    pub fn with_picker(mut self, picker: Arc<dyn StreamPicker>) -> Self {
        self.picker = picker;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &DownloadSettings {
        &self.settings
    }

    pub(crate) fn provider(&self) -> &Arc<dyn MetadataProvider> {
        &self.provider
    }

    /// Resolves the conversion applied to every item of `format`.
    pub(crate) fn conversion_step(
        &self,
        format: DownloadFormat,
        config: &EffectiveDownloadConfig,
    ) -> Result<Option<ConversionStep>, ConfigError> {
        let decision = conversion::resolve(format, config)?;
        let (true, Some(extension)) = (decision.required, decision.target_extension) else {
            return Ok(None);
        };
        let Some(converter) = self.converter.clone() else {
            return Err(ConfigError::invalid(
                CONVERTER_SETTING,
                "conversion is enabled but no converter is available",
            ));
        };
        Ok(Some(ConversionStep {
            converter,
            extension,
        }))
    }

    /// Downloads one item into `directory`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the settings cannot serve `format`. Every
    /// other failure is reported through the returned [`MediaItemResult`].
    #[instrument(skip(self, directory), fields(url = %url, format = %format))]
    pub async fn download_single_item(
        &self,
        url: &str,
        format: DownloadFormat,
        directory: &Path,
    ) -> Result<MediaItemResult, ConfigError> {
        let config = self.settings.effective(format);
        let conversion = self.conversion_step(format, &config)?;

        let media = match self.provider.resolve(url).await {
            Ok(media) => media,
            Err(error) => {
                warn!(error = %error, "could not resolve media");
                return Ok(MediaItemResult::failed(url, &DownloadError::no_streams(url)));
            }
        };

        let item = ItemContext {
            media: &media,
            config: &config,
            conversion: conversion.as_ref(),
            fallback_name: fallback_video_name(&media.stable_id),
        };
        let result = match self.download_media(&item, directory).await {
            Ok(path) => {
                info!(title = %media.title, path = %path.display(), "download complete");
                MediaItemResult::succeeded(&media.title, path)
            }
            Err(error) if error.kind().is_skip() => {
                if config.silence_already_exists {
                    debug!(title = %media.title, "{error}");
                } else {
                    warn!("{error}");
                }
                MediaItemResult::failed(&media.title, &error)
            }
            Err(error) => {
                warn!(title = %media.title, kind = %error.kind(), "{error}");
                MediaItemResult::failed(&media.title, &error)
            }
        };
        Ok(result)
    }

    async fn download_media(
        &self,
        item: &ItemContext<'_>,
        directory: &Path,
    ) -> Result<PathBuf, DownloadError> {
        let media = item.media;
        if media.streams.is_empty() {
            return Err(DownloadError::no_streams(&media.title));
        }
        let selection = select_streams(item.config.format, &media.streams)
            .map_err(|_| DownloadError::no_streams(&media.title))?;

        match selection {
            StreamSelection::Single(stream) => {
                announce(item, stream);
                self.download_leg(item, stream, directory, None).await
            }
            StreamSelection::Pair { video, audio } => {
                announce(item, video);
                announce(item, audio);
                match item.conversion {
                    Some(step) => self.download_merged(item, step, video, audio, directory).await,
                    None => self.download_split(item, video, audio, directory).await,
                }
            }
            StreamSelection::Candidates(candidates) => {
                self.download_custom(item, candidates, directory).await
            }
        }
    }

    /// Names, checks, transfers and optionally converts one stream.
    async fn download_leg(
        &self,
        item: &ItemContext<'_>,
        stream: &StreamDescriptor,
        directory: &Path,
        prefix: Option<&str>,
    ) -> Result<PathBuf, DownloadError> {
        let os = item.config.os;
        let base_name = base_filename(item.media, stream);
        let filename = compose_safe_filename(
            &base_name,
            &item.fallback_name,
            prefix,
            item.conversion.map(|step| step.extension.as_str()),
            filename_budget(directory, os),
            os,
        )
        .map_err(|_| DownloadError::impossible_path(directory))?;
        let destination = directory.join(&filename);
        if item.config.skip_existing && destination.exists() {
            return Err(DownloadError::skipped_existing(&item.media.title, directory));
        }

        let Some(step) = item.conversion else {
            return self
                .transfer(
                    &item.media.title,
                    stream,
                    directory,
                    &filename,
                    item.config.skip_existing,
                )
                .await;
        };

        let staging = self.settings.staging_directory.as_path();
        let staged_name = compose_safe_filename(
            &base_name,
            &item.fallback_name,
            prefix,
            None,
            filename_budget(staging, os),
            os,
        )
        .map_err(|_| DownloadError::impossible_path(staging))?;

        let mut staged = StagedFiles::default();
        staged.push(
            self.transfer(&item.media.title, stream, staging, &staged_name, false)
                .await?,
        );
        let description = format!(
            "Converting ({}) to ({})",
            item.media.title, step.extension
        );
        self.convert(item, step, staged.paths(), &destination, &description)
            .await?;
        Ok(destination)
    }

    /// Best-of-both with merging: both legs staged, one output file.
    async fn download_merged(
        &self,
        item: &ItemContext<'_>,
        step: &ConversionStep,
        video: &StreamDescriptor,
        audio: &StreamDescriptor,
        directory: &Path,
    ) -> Result<PathBuf, DownloadError> {
        let os = item.config.os;
        let title = &item.media.title;
        let filename = compose_safe_filename(
            &base_filename(item.media, video),
            &item.fallback_name,
            None,
            Some(&step.extension),
            filename_budget(directory, os),
            os,
        )
        .map_err(|_| DownloadError::impossible_path(directory))?;
        let destination = directory.join(&filename);
        if item.config.skip_existing && destination.exists() {
            return Err(DownloadError::skipped_existing(title, directory));
        }

        let staging = self.settings.staging_directory.as_path();
        let staging_budget = filename_budget(staging, os);
        let mut staged = StagedFiles::default();
        for (stream, prefix) in [(video, VIDEO_PREFIX), (audio, AUDIO_PREFIX)] {
            let staged_name = compose_safe_filename(
                &base_filename(item.media, stream),
                &item.fallback_name,
                Some(prefix),
                None,
                staging_budget,
                os,
            )
            .map_err(|_| DownloadError::impossible_path(staging))?;
            staged.push(
                self.transfer(title, stream, staging, &staged_name, false)
                    .await?,
            );
        }

        let description = format!("Merging ({title})");
        self.convert(item, step, staged.paths(), &destination, &description)
            .await?;
        Ok(destination)
    }

    /// Best-of-both without merging: two sibling files in a per-item folder.
    async fn download_split(
        &self,
        item: &ItemContext<'_>,
        video: &StreamDescriptor,
        audio: &StreamDescriptor,
        directory: &Path,
    ) -> Result<PathBuf, DownloadError> {
        let folder = safe_subdirectory(
            directory,
            &item.media.title,
            &item.fallback_name,
            item.config.os,
        )
        .map_err(|_| DownloadError::impossible_path(directory))?;

        self.download_leg(item, video, &folder, Some(VIDEO_PREFIX))
            .await?;
        self.download_leg(item, audio, &folder, Some(AUDIO_PREFIX))
            .await?;
        Ok(folder)
    }

    /// Custom selection. A failing stream does not stop the others.
    async fn download_custom(
        &self,
        item: &ItemContext<'_>,
        candidates: &[StreamDescriptor],
        directory: &Path,
    ) -> Result<PathBuf, DownloadError> {
        let title = &item.media.title;
        let picked: Vec<&StreamDescriptor> = self
            .picker
            .pick(title, candidates)
            .iter()
            .filter_map(|id| candidates.iter().find(|s| &s.id == id))
            .collect();
        if picked.is_empty() {
            return Err(DownloadError::cancelled(title));
        }

        let target = if item.config.group_into_subfolder {
            safe_subdirectory(
                directory,
                title,
                &fallback_streams_folder_name(&item.media.stable_id),
                item.config.os,
            )
            .map_err(|_| DownloadError::impossible_path(directory))?
        } else {
            directory.to_path_buf()
        };

        let mut failed = Vec::new();
        let mut last_skip = None;
        let mut written = 0_usize;
        for stream in picked {
            announce(item, stream);
            let prefix = stream_prefix(&stream.id);
            match self.download_leg(item, stream, &target, Some(&prefix)).await {
                Ok(path) => {
                    debug!(stream = %stream.id, path = %path.display(), "stream saved");
                    written += 1;
                }
                Err(error) if error.kind().is_skip() => {
                    debug!(stream = %stream.id, "{error}");
                    last_skip = Some(error);
                }
                Err(error) => {
                    warn!(stream = %stream.id, "{error}");
                    failed.push((stream.id.clone(), error.to_string()));
                }
            }
        }

        if !failed.is_empty() {
            return Err(DownloadError::StreamsFailed {
                title: title.clone(),
                failed,
            });
        }
        match last_skip {
            Some(skip) if written == 0 => Err(skip),
            _ => Ok(target),
        }
    }

    /// Transfers one stream with a byte progress indicator.
    async fn transfer(
        &self,
        title: &str,
        stream: &StreamDescriptor,
        directory: &Path,
        filename: &str,
        skip_existing: bool,
    ) -> Result<PathBuf, DownloadError> {
        tokio::fs::create_dir_all(directory)
            .await
            .map_err(|e| DownloadError::io(directory, e))?;

        let scope = ProgressScope::open(
            &self.progress,
            &format!("Downloading ({title})"),
            stream.filesize.unwrap_or(0),
            ProgressUnit::Bytes,
        );
        let sink = scope.sink();
        let handle = scope.handle();
        let on_progress: TransferCallback =
            Arc::new(move |downloaded: u64, _remaining: u64| sink.update(handle, downloaded));

        let saved = self
            .provider
            .download_stream(stream, directory, filename, skip_existing, on_progress)
            .await?;
        match saved {
            Some(path) => {
                scope.complete();
                Ok(path)
            }
            None if skip_existing => Err(DownloadError::skipped_existing(title, directory)),
            None => Err(DownloadError::cancelled(title)),
        }
    }

    /// Runs one conversion job. A failed job is terminated and whatever it
    /// wrote to `output` is left in place.
    async fn convert(
        &self,
        item: &ItemContext<'_>,
        step: &ConversionStep,
        inputs: &[PathBuf],
        output: &Path,
        description: &str,
    ) -> Result<(), DownloadError> {
        let title = &item.media.title;
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::io(parent, e))?;
        }

        let mut job = step
            .converter
            .build_job(inputs, output)
            .map_err(|e| DownloadError::converter(title, e))?;

        let total = item.media.duration.map_or(0, |d| d.as_secs());
        let scope = ProgressScope::open(&self.progress, description, total, ProgressUnit::Seconds);
        let sink = scope.sink();
        let handle = scope.handle();
        job.on_progress(Arc::new(move |seconds: f64| {
            sink.update(handle, whole_seconds(seconds));
        }));

        debug!(inputs = inputs.len(), output = %output.display(), "starting conversion");
        match job.execute().await {
            Ok(()) => {
                scope.complete();
                Ok(())
            }
            Err(error) => {
                job.terminate().await;
                Err(DownloadError::converter(title, error))
            }
        }
    }
}

fn announce(item: &ItemContext<'_>, stream: &StreamDescriptor) {
    if item.config.announce_chosen_stream {
        info!(title = %item.media.title, "Chosen stream: {stream}");
    }
}

/// Provider filename of `stream`, or `<title>.<container>` when it has none.
fn base_filename(media: &ResolvedMedia, stream: &StreamDescriptor) -> String {
    if stream.default_filename.trim().is_empty() {
        format!("{}.{}", media.title, stream.subtype)
    } else {
        stream.default_filename.clone()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_seconds(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_filename_prefers_provider_name() {
        let media = ResolvedMedia {
            title: "Clip".into(),
            stable_id: "abc".into(),
            duration: None,
            streams: Vec::new(),
        };
        let named = StreamDescriptor {
            default_filename: "Clip (1080p).mp4".into(),
            subtype: "mp4".into(),
            ..StreamDescriptor::default()
        };
        let unnamed = StreamDescriptor {
            subtype: "webm".into(),
            ..StreamDescriptor::default()
        };
        assert_eq!(base_filename(&media, &named), "Clip (1080p).mp4");
        assert_eq!(base_filename(&media, &unnamed), "Clip.webm");
    }

    #[test]
    fn test_whole_seconds() {
        assert_eq!(whole_seconds(12.9), 12);
        assert_eq!(whole_seconds(-1.0), 0);
        assert_eq!(whole_seconds(f64::NAN), 0);
    }
}
