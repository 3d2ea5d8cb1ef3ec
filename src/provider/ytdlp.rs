//! `yt-dlp` backed metadata provider.
//!
//! `yt-dlp` is only asked for JSON metadata. Stream bytes are fetched by
//! [`HttpClient`] so transfers report progress and honor skip-existing the
//! same way for every format.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use super::{
    CollectionKind, CollectionListing, CollectionMember, HttpClient, MetadataProvider,
    ProviderError, ResolvedMedia, StreamDescriptor, TransferCallback,
};
use crate::parser::{MediaKind, classify_url};

const DEFAULT_PROGRAM: &str = "yt-dlp";
const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Metadata from `yt-dlp`, bytes over HTTP.
#[derive(Debug, Clone)]
pub struct YtDlpProvider {
    program: PathBuf,
    client: HttpClient,
}

impl Default for YtDlpProvider {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, HttpClient::new())
    }
}

impl YtDlpProvider {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, client: HttpClient) -> Self {
        Self {
            program: program.into(),
            client,
        }
    }

    async fn dump_json<T: DeserializeOwned>(
        &self,
        extra_args: &[&str],
        url: &str,
    ) -> Result<T, ProviderError> {
        let program = self.program.display().to_string();
        let output = Command::new(&self.program)
            .args(["--dump-single-json", "--no-warnings", "--no-progress"])
            .args(extra_args)
            .arg("--")
            .arg(url)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ProviderError::tool_missing(program.clone(), e))?;

        if !output.status.success() {
            return Err(ProviderError::ToolFailed {
                program,
                url: url.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|source| ProviderError::InvalidMetadata {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl MetadataProvider for YtDlpProvider {
    #[instrument(skip(self))]
    async fn resolve(&self, url: &str) -> Result<ResolvedMedia, ProviderError> {
        let info: VideoInfo = self.dump_json(&["--no-playlist"], url).await?;
        let media = media_from_info(info);
        debug!(
            title = %media.title,
            streams = media.streams.len(),
            "resolved media"
        );
        Ok(media)
    }

    async fn download_stream(
        &self,
        stream: &StreamDescriptor,
        output_directory: &Path,
        filename: &str,
        skip_existing: bool,
        on_progress: TransferCallback,
    ) -> Result<Option<PathBuf>, ProviderError> {
        let Some(url) = stream.url.as_deref() else {
            return Err(ProviderError::NoTransferUrl {
                stream_id: stream.id.clone(),
            });
        };
        self.client
            .download_to_file(
                url,
                output_directory,
                filename,
                skip_existing,
                stream.filesize,
                Some(on_progress),
            )
            .await
    }

    #[instrument(skip(self))]
    async fn list_collection(&self, url: &str) -> Result<CollectionListing, ProviderError> {
        let kind = match classify_url(url) {
            Ok(MediaKind::Channel) => CollectionKind::Channel,
            _ => CollectionKind::Playlist,
        };
        let listing_url = match kind {
            CollectionKind::Channel => channel_videos_url(url),
            CollectionKind::Playlist => url.to_string(),
        };
        let info: PlaylistInfo = self.dump_json(&["--flat-playlist"], &listing_url).await?;
        Ok(listing_from_info(info, kind))
    }
}

#[derive(Debug, Deserialize)]
struct VideoInfo {
    id: String,
    title: Option<String>,
    duration: Option<f64>,
    #[serde(default)]
    formats: Vec<FormatInfo>,
}

#[derive(Debug, Deserialize)]
struct FormatInfo {
    format_id: String,
    ext: Option<String>,
    url: Option<String>,
    protocol: Option<String>,
    vcodec: Option<String>,
    acodec: Option<String>,
    filesize: Option<f64>,
    filesize_approx: Option<f64>,
    /// Total bitrate in kbit/s.
    tbr: Option<f64>,
    height: Option<u32>,
    fps: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PlaylistInfo {
    id: String,
    title: Option<String>,
    channel: Option<String>,
    uploader: Option<String>,
    #[serde(default)]
    entries: Vec<EntryInfo>,
}

#[derive(Debug, Deserialize)]
struct EntryInfo {
    id: Option<String>,
    url: Option<String>,
    title: Option<String>,
}

fn media_from_info(info: VideoInfo) -> ResolvedMedia {
    let title = info
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| info.id.clone());
    let duration = info
        .duration
        .filter(|d| d.is_finite() && *d >= 0.0)
        .map(Duration::from_secs_f64);
    let streams = info
        .formats
        .into_iter()
        .filter_map(|format| stream_from_format(format, &title))
        .collect();

    ResolvedMedia {
        title,
        stable_id: info.id,
        duration,
        streams,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn stream_from_format(format: FormatInfo, title: &str) -> Option<StreamDescriptor> {
    let direct = matches!(format.protocol.as_deref(), Some("https" | "http"));
    if !direct || format.url.is_none() {
        return None;
    }

    let video_codec = format.vcodec.filter(|c| c != "none");
    let audio_codec = format.acodec.filter(|c| c != "none");
    if video_codec.is_none() && audio_codec.is_none() {
        return None;
    }

    let subtype = format.ext.unwrap_or_else(|| "mp4".to_string());
    Some(StreamDescriptor {
        default_filename: format!("{title}.{subtype}"),
        filesize: format
            .filesize
            .or(format.filesize_approx)
            .filter(|size| *size >= 0.0)
            .map(|size| size as u64),
        has_video: video_codec.is_some(),
        has_audio: audio_codec.is_some(),
        subtype,
        bitrate: format
            .tbr
            .filter(|tbr| *tbr >= 0.0)
            .map(|tbr| (tbr * 1000.0) as u64),
        resolution: format.height,
        fps: format.fps.filter(|fps| *fps >= 0.0).map(|fps| fps.round() as u32),
        url: format.url,
        video_codec,
        audio_codec,
        id: format.format_id,
    })
}

fn listing_from_info(info: PlaylistInfo, kind: CollectionKind) -> CollectionListing {
    let title = info
        .title
        .or(info.channel)
        .or(info.uploader)
        .unwrap_or_default();
    let members: Vec<Result<CollectionMember, ProviderError>> = info
        .entries
        .into_iter()
        .filter_map(|entry| {
            let member = member_from_entry(entry);
            if member.is_none() {
                warn!("collection entry without id or url skipped");
            }
            member
        })
        .map(Ok)
        .collect();

    CollectionListing {
        title,
        stable_id: info.id,
        kind,
        members: stream::iter(members).boxed(),
    }
}

fn member_from_entry(entry: EntryInfo) -> Option<CollectionMember> {
    let url = match (entry.url, entry.id) {
        (Some(url), _) if url.starts_with("http://") || url.starts_with("https://") => url,
        (_, Some(id)) => format!("{WATCH_URL_PREFIX}{id}"),
        _ => return None,
    };
    Some(CollectionMember {
        url,
        title: entry.title,
    })
}

/// Points a channel URL at its uploads tab so the flat listing holds videos.
fn channel_videos_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.ends_with("/videos") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/videos")
    }
}
