//! Media metadata and stream transfer.
//!
//! The orchestrators only talk to a [`MetadataProvider`]. The shipped
//! implementation, [`YtDlpProvider`], asks `yt-dlp` for metadata and moves the
//! bytes itself with [`HttpClient`]. Tests substitute in-memory fakes.

mod client;
mod error;
mod ytdlp;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

pub use client::HttpClient;
pub use error::ProviderError;
pub use ytdlp::YtDlpProvider;

/// Progress callback for a single transfer: `(bytes downloaded, bytes remaining)`.
pub type TransferCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// One downloadable encoding of a media item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamDescriptor {
    /// Provider-specific stream id (a yt-dlp format id).
    pub id: String,
    /// Suggested filename including extension, usually `<title>.<subtype>`.
    pub default_filename: String,
    /// Size in bytes, when the provider knows it.
    pub filesize: Option<u64>,
    pub has_video: bool,
    pub has_audio: bool,
    /// Container, e.g. `mp4` or `webm`.
    pub subtype: String,
    /// Average bitrate in bits per second.
    pub bitrate: Option<u64>,
    /// Vertical resolution in pixels.
    pub resolution: Option<u32>,
    pub fps: Option<u32>,
    /// Direct transfer location, for HTTP-backed providers.
    pub url: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
}

impl StreamDescriptor {
    /// Carries both audio and video.
    #[must_use]
    pub fn is_progressive(&self) -> bool {
        self.has_video && self.has_audio
    }

    #[must_use]
    pub fn is_video_only(&self) -> bool {
        self.has_video && !self.has_audio
    }

    #[must_use]
    pub fn is_audio_only(&self) -> bool {
        self.has_audio && !self.has_video
    }

    /// Ordering key used to rank streams: resolution, then fps, then bitrate.
    #[must_use]
    pub fn quality_rank(&self) -> (Option<u32>, Option<u32>, Option<u64>) {
        (self.resolution, self.fps, self.bitrate)
    }
}

impl fmt::Display for StreamDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.id, self.subtype)?;
        if let Some(resolution) = self.resolution {
            write!(f, " {resolution}p")?;
        }
        if let Some(fps) = self.fps {
            write!(f, " {fps}fps")?;
        }
        let tracks = match (self.has_video, self.has_audio) {
            (true, true) => "video+audio",
            (true, false) => "video only",
            (false, true) => "audio only",
            (false, false) => "no tracks",
        };
        write!(f, " {tracks}")?;
        let codecs: Vec<&str> = [self.video_codec.as_deref(), self.audio_codec.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !codecs.is_empty() {
            write!(f, " ({})", codecs.join(", "))?;
        }
        if let Some(bitrate) = self.bitrate {
            write!(f, " {}kbps", bitrate / 1000)?;
        }
        if let Some(size) = self.filesize {
            #[allow(clippy::cast_precision_loss)]
            let mib = size as f64 / (1024.0 * 1024.0);
            write!(f, " {mib:.1} MiB")?;
        }
        Ok(())
    }
}

/// Metadata of a single media item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    pub title: String,
    /// Provider id (the YouTube video id). Used in fallback names.
    pub stable_id: String,
    pub duration: Option<Duration>,
    pub streams: Vec<StreamDescriptor>,
}

/// Kind of multi-item source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Playlist,
    Channel,
}

impl CollectionKind {
    /// Label used in fallback folder names, e.g. `Playlist (<id>)`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Playlist => "Playlist",
            Self::Channel => "Channel",
        }
    }
}

/// A member of a collection, not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionMember {
    pub url: String,
    /// Title from the listing, used when the member fails before resolution.
    pub title: Option<String>,
}

/// A playlist or channel with a single-pass stream of its members.
pub struct CollectionListing {
    pub title: String,
    pub stable_id: String,
    pub kind: CollectionKind,
    pub members: BoxStream<'static, Result<CollectionMember, ProviderError>>,
}

impl fmt::Debug for CollectionListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionListing")
            .field("title", &self.title)
            .field("stable_id", &self.stable_id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Source of media metadata and stream bytes.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Resolves title, id, duration and available streams of a single item.
    async fn resolve(&self, url: &str) -> Result<ResolvedMedia, ProviderError>;

    /// Transfers `stream` into `output_directory/filename`.
    ///
    /// Returns `Ok(None)` when nothing was written: the file already existed
    /// and `skip_existing` was set, or the transfer was abandoned.
    async fn download_stream(
        &self,
        stream: &StreamDescriptor,
        output_directory: &Path,
        filename: &str,
        skip_existing: bool,
        on_progress: TransferCallback,
    ) -> Result<Option<PathBuf>, ProviderError>;

    /// Lists a playlist or channel.
    async fn list_collection(&self, url: &str) -> Result<CollectionListing, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(has_video: bool, has_audio: bool) -> StreamDescriptor {
        StreamDescriptor {
            id: "18".to_string(),
            default_filename: "Clip.mp4".to_string(),
            has_video,
            has_audio,
            subtype: "mp4".to_string(),
            ..StreamDescriptor::default()
        }
    }

    #[test]
    fn test_stream_track_classification() {
        assert!(stream(true, true).is_progressive());
        assert!(stream(true, false).is_video_only());
        assert!(stream(false, true).is_audio_only());
        assert!(!stream(true, true).is_video_only());
        assert!(!stream(true, true).is_audio_only());
    }

    #[test]
    fn test_stream_display_summarizes_quality() {
        let descriptor = StreamDescriptor {
            resolution: Some(720),
            fps: Some(30),
            bitrate: Some(1_500_000),
            filesize: Some(10 * 1024 * 1024),
            video_codec: Some("avc1".to_string()),
            audio_codec: Some("mp4a".to_string()),
            ..stream(true, true)
        };
        assert_eq!(
            descriptor.to_string(),
            "[18] mp4 720p 30fps video+audio (avc1, mp4a) 1500kbps 10.0 MiB"
        );
    }

    #[test]
    fn test_quality_rank_orders_resolution_first() {
        let low = StreamDescriptor {
            resolution: Some(360),
            fps: Some(60),
            ..stream(true, true)
        };
        let high = StreamDescriptor {
            resolution: Some(720),
            fps: Some(30),
            ..stream(true, true)
        };
        assert!(high.quality_rank() > low.quality_rank());
    }
}
