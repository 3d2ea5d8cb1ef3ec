//! Errors for lines of URL input that cannot be downloaded.

use thiserror::Error;

/// Longest URL accepted on an input line.
pub const MAX_URL_LENGTH: usize = 2000;

/// Characters of an over-long URL echoed back in the message.
const PREVIEW_CHARS: usize = 50;

/// Why an input line was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("'{url}' is not a URL ({reason})")]
    Malformed { url: String, reason: String },

    #[error("'{url}' uses the {scheme}: scheme; only http and https links can be downloaded")]
    UnsupportedScheme { url: String, scheme: String },

    /// A web URL that names no YouTube video, playlist or channel.
    #[error(
        "'{url}' is not a YouTube link. Accepted forms: youtube.com/watch?v=ID, youtu.be/ID, youtube.com/playlist?list=ID, youtube.com/@handle"
    )]
    NotYouTube { url: String },

    #[error("URL of {length} characters exceeds the {max} character limit: {url_preview}...")]
    UrlTooLong {
        url_preview: String,
        length: usize,
        max: usize,
    },
}

impl ParseError {
    #[must_use]
    pub fn unsupported_scheme(url: &str, scheme: &str) -> Self {
        Self::UnsupportedScheme {
            url: url.to_string(),
            scheme: scheme.to_string(),
        }
    }

    #[must_use]
    pub fn malformed(url: &str, reason: &str) -> Self {
        Self::Malformed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn not_youtube(url: &str) -> Self {
        Self::NotYouTube {
            url: url.to_string(),
        }
    }

    #[must_use]
    pub fn too_long(url: &str) -> Self {
        Self::UrlTooLong {
            url_preview: url.chars().take(PREVIEW_CHARS).collect(),
            length: url.len(),
            max: MAX_URL_LENGTH,
        }
    }
}
