//! Outcome of reading a block of URL input.

use std::fmt;

use super::error::ParseError;
use super::url::MediaKind;

/// A classified URL and the input line it came from (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItem {
    pub line: usize,
    pub url: String,
    pub kind: MediaKind,
}

impl fmt::Display for ParsedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} (line {})", self.kind, self.url, self.line)
    }
}

/// A non-blank, non-comment line that was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line: usize,
    pub raw: String,
    pub error: ParseError,
}

/// Accepted URLs in input order, plus the lines that were rejected.
#[derive(Debug, Default)]
pub struct ParseResult {
    pub items: Vec<ParsedItem>,
    pub skipped: Vec<SkippedLine>,
}

impl ParseResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// No downloadable URL was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Accepted URLs of one kind.
    pub fn of_kind(&self, kind: MediaKind) -> impl Iterator<Item = &ParsedItem> {
        self.items.iter().filter(move |item| item.kind == kind)
    }
}

impl fmt::Display for ParseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} URL(s) accepted, {} line(s) rejected",
            self.len(),
            self.skipped_count()
        )
    }
}
