//! Constants for the download module (staging prefixes, fallback names).

/// Prefix of the video-only leg of a best-of-both download.
pub const VIDEO_PREFIX: &str = "Video-";

/// Prefix of the audio-only leg of a best-of-both download.
pub const AUDIO_PREFIX: &str = "Audio-";

/// Name used for an item whose title sanitizes to nothing.
#[must_use]
pub fn fallback_video_name(stable_id: &str) -> String {
    format!("Video ({stable_id})")
}

/// Folder name for a custom selection whose title sanitizes to nothing.
#[must_use]
pub fn fallback_streams_folder_name(stable_id: &str) -> String {
    format!("Video ({stable_id}) Streams")
}

/// Prefix of one leg of a custom selection.
#[must_use]
pub fn stream_prefix(stream_id: &str) -> String {
    format!("{stream_id}-")
}
