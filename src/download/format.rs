//! Output format requested for a run.

use std::fmt;
use std::str::FromStr;

/// How a media item should be downloaded.
///
/// Chosen once per run; every item in a playlist or channel uses the same format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadFormat {
    /// A single progressive stream carrying both audio and video.
    Video,
    /// The video track alone.
    VideoOnly,
    /// The audio track alone.
    AudioOnly,
    /// Separate best video and best audio, optionally merged into one file.
    BestOfBoth,
    /// An arbitrary set of streams picked by the user.
    Custom,
}

impl DownloadFormat {
    /// All formats in menu order.
    pub const ALL: [Self; 5] = [
        Self::Video,
        Self::VideoOnly,
        Self::AudioOnly,
        Self::BestOfBoth,
        Self::Custom,
    ];

    /// Returns the stable label used on the command line and in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::VideoOnly => "video-only",
            Self::AudioOnly => "audio-only",
            Self::BestOfBoth => "best-of-both",
            Self::Custom => "custom",
        }
    }

    /// Name of the configuration setting holding this format's target extension.
    #[must_use]
    pub fn target_extension_setting(self) -> &'static str {
        match self {
            Self::Video => "behavior.video_target_extension",
            Self::VideoOnly => "behavior.video_only_target_extension",
            Self::AudioOnly => "behavior.audio_only_target_extension",
            Self::BestOfBoth => "behavior.merged_target_extension",
            Self::Custom => "behavior.custom_target_extension",
        }
    }

    /// Name of the configuration setting holding this format's location override.
    #[must_use]
    pub fn location_override_setting(self) -> &'static str {
        match self {
            Self::Video => "locations.video",
            Self::VideoOnly => "locations.video_only",
            Self::AudioOnly => "locations.audio_only",
            Self::BestOfBoth => "locations.best_of_both",
            Self::Custom => "locations.custom",
        }
    }

    /// Directory name used under the downloads root when no override is set.
    #[must_use]
    pub fn default_directory_name(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::VideoOnly => "video_only",
            Self::AudioOnly => "audio_only",
            Self::BestOfBoth => "best_of_both",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for DownloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a format label is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown download format '{0}' (expected one of: video, video-only, audio-only, best-of-both, custom)")]
pub struct UnknownFormat(pub String);

impl FromStr for DownloadFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == normalized)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}
