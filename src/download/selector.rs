//! Stream selection per download format.
//!
//! Pure functions over a stream list. A format that cannot be satisfied is
//! reported as [`NoMatchingStream`] so callers never see a silent miss.

use thiserror::Error;

use super::format::DownloadFormat;
use crate::provider::StreamDescriptor;

/// No stream satisfied the requested format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no stream matches the {format} format")]
pub struct NoMatchingStream {
    pub format: DownloadFormat,
}

/// Stream(s) chosen for one media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSelection<'a> {
    /// `Video`, `VideoOnly`, `AudioOnly`.
    Single(&'a StreamDescriptor),
    /// `BestOfBoth`.
    Pair {
        video: &'a StreamDescriptor,
        audio: &'a StreamDescriptor,
    },
    /// `Custom`: everything, for the caller to pick from.
    Candidates(&'a [StreamDescriptor]),
}

/// Highest ranked progressive stream.
#[must_use]
pub fn select_progressive(streams: &[StreamDescriptor]) -> Option<&StreamDescriptor> {
    best_ranked(streams.iter().filter(|s| s.is_progressive()))
}

/// First video-only stream in provider order.
#[must_use]
pub fn select_video_only(streams: &[StreamDescriptor]) -> Option<&StreamDescriptor> {
    streams.iter().find(|s| s.is_video_only())
}

/// Highest ranked audio-only stream.
#[must_use]
pub fn select_audio_only(streams: &[StreamDescriptor]) -> Option<&StreamDescriptor> {
    best_ranked(streams.iter().filter(|s| s.is_audio_only()))
}

/// Chooses the stream(s) to download for `format`.
///
/// # Errors
///
/// Returns [`NoMatchingStream`] when a required slot stays empty, including
/// an empty candidate set for `Custom`.
pub fn select_streams(
    format: DownloadFormat,
    streams: &[StreamDescriptor],
) -> Result<StreamSelection<'_>, NoMatchingStream> {
    let missing = NoMatchingStream { format };
    match format {
        DownloadFormat::Video => select_progressive(streams)
            .map(StreamSelection::Single)
            .ok_or(missing),
        DownloadFormat::VideoOnly => select_video_only(streams)
            .map(StreamSelection::Single)
            .ok_or(missing),
        DownloadFormat::AudioOnly => select_audio_only(streams)
            .map(StreamSelection::Single)
            .ok_or(missing),
        DownloadFormat::BestOfBoth => {
            match (select_video_only(streams), select_audio_only(streams)) {
                (Some(video), Some(audio)) => Ok(StreamSelection::Pair { video, audio }),
                _ => Err(missing),
            }
        }
        DownloadFormat::Custom => {
            if streams.is_empty() {
                Err(missing)
            } else {
                Ok(StreamSelection::Candidates(streams))
            }
        }
    }
}

/// First element after a stable descending sort by quality rank.
fn best_ranked<'a>(
    candidates: impl Iterator<Item = &'a StreamDescriptor>,
) -> Option<&'a StreamDescriptor> {
    let mut ranked: Vec<&StreamDescriptor> = candidates.collect();
    ranked.sort_by(|a, b| b.quality_rank().cmp(&a.quality_rank()));
    ranked.first().copied()
}
