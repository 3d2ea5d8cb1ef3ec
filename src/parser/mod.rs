//! Input parsing: YouTube URL classification and URL-list files.
//!
//! # Example
//!
//! ```
//! use cadmium_core::parser::{MediaKind, parse_input};
//!
//! let result = parse_input("# favourites\nhttps://youtu.be/dQw4w9WgXcQ\n\nnot a url\n");
//! assert_eq!(result.len(), 1);
//! assert_eq!(result.items[0].kind, MediaKind::Video);
//! assert_eq!(result.skipped_count(), 1);
//! ```

mod error;
mod input;
mod url;

pub use error::{MAX_URL_LENGTH, ParseError};
pub use input::{ParseResult, ParsedItem, SkippedLine};
pub use url::{MediaKind, classify_url};

use tracing::debug;

/// Parses one URL per line.
///
/// Blank lines and lines starting with `#` are ignored. Every other line is
/// trimmed and classified; lines that fail are reported in
/// [`ParseResult::skipped`] without stopping the parse.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
#[must_use]
pub fn parse_input(input: &str) -> ParseResult {
    let mut result = ParseResult::new();

    for (index, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match classify_url(line) {
            Ok(kind) => result.items.push(ParsedItem {
                line: index + 1,
                url: line.to_string(),
                kind,
            }),
            Err(error) => {
                debug!(line = index + 1, error = %error, "skipping unrecognized input");
                result.skipped.push(SkippedLine {
                    line: index + 1,
                    raw: line.to_string(),
                    error,
                });
            }
        }
    }

    debug!(%result, "input parsed");
    result
}
