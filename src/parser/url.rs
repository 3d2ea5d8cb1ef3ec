//! YouTube URL validation and classification.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;
use url::Url;

use super::error::{MAX_URL_LENGTH, ParseError};

/// YouTube video ids are 11 URL-safe base64 characters.
#[allow(clippy::expect_used)]
static VIDEO_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("video id regex is valid")
});

/// `/shorts/<id>`, `/live/<id>` and `/embed/<id>` paths.
#[allow(clippy::expect_used)]
static VIDEO_PATH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(?:shorts|live|embed)/([A-Za-z0-9_-]{11})/?$")
        .expect("video path regex is valid")
});

/// `/@handle`, `/channel/<id>`, `/c/<name>` and `/user/<name>`, optionally followed by a tab.
#[allow(clippy::expect_used)]
static CHANNEL_PATH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(?:@[^/]+|channel/[A-Za-z0-9_-]+|c/[^/]+|user/[^/]+)(?:/[^/]*)?/?$")
        .expect("channel path regex is valid")
});

const YOUTUBE_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
];
const SHORT_HOST: &str = "youtu.be";

/// What a YouTube URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Playlist,
    Channel,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Playlist => write!(f, "playlist"),
            Self::Channel => write!(f, "channel"),
        }
    }
}

/// Classifies a YouTube URL.
///
/// A watch URL that also carries a `list` parameter is treated as a video.
///
/// # Errors
///
/// Returns [`ParseError`] when the URL is invalid or not a recognized YouTube
/// video, playlist or channel URL.
///
/// # Examples
///
/// ```
/// use cadmium_core::parser::{MediaKind, classify_url};
///
/// assert_eq!(
///     classify_url("https://youtu.be/dQw4w9WgXcQ").unwrap(),
///     MediaKind::Video
/// );
/// assert_eq!(
///     classify_url("https://www.youtube.com/playlist?list=PL590L5WQmH8fJ54F369BLDSqIwcs-TCfs").unwrap(),
///     MediaKind::Playlist
/// );
/// ```
pub fn classify_url(raw: &str) -> Result<MediaKind, ParseError> {
    let url = validate_url(raw)?;
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let path = url.path();

    let kind = if host == SHORT_HOST {
        let id = path.trim_matches('/');
        VIDEO_ID_PATTERN.is_match(id).then_some(MediaKind::Video)
    } else if YOUTUBE_HOSTS.contains(&host.as_str()) {
        classify_youtube_path(&url)
    } else {
        None
    };

    trace!(url = %raw, kind = ?kind, "classified URL");
    kind.ok_or_else(|| ParseError::not_youtube(raw))
}

fn classify_youtube_path(url: &Url) -> Option<MediaKind> {
    let path = url.path();
    let query = |name: &str| {
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };

    match path.trim_end_matches('/') {
        "/watch" => query("v")
            .filter(|id| VIDEO_ID_PATTERN.is_match(id))
            .map(|_| MediaKind::Video),
        "/playlist" => query("list")
            .filter(|list| !list.is_empty())
            .map(|_| MediaKind::Playlist),
        _ if VIDEO_PATH_PATTERN.is_match(path) => Some(MediaKind::Video),
        _ if CHANNEL_PATH_PATTERN.is_match(path) => Some(MediaKind::Channel),
        _ => None,
    }
}

/// Validates a URL string.
///
/// # Validation rules:
/// - Must not exceed `MAX_URL_LENGTH` (2000 chars)
/// - Must be parseable by the `url` crate
/// - Must use http or https scheme (no ftp, file, etc.)
fn validate_url(raw: &str) -> Result<Url, ParseError> {
    // Check URL length first (prevents memory issues with very long URLs)
    if raw.len() > MAX_URL_LENGTH {
        return Err(ParseError::too_long(raw));
    }

    let parsed = Url::parse(raw).map_err(|e| ParseError::malformed(raw, &e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(ParseError::unsupported_scheme(raw, scheme)),
    }
}
