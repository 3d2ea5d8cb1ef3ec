//! Filename sanitization and path-length budgeting for downloads.
//!
//! Every name that ends up on disk (stream files, per-item folders, collection
//! folders, staged files) goes through this module. Rules are table-driven per
//! target operating system so the same input produces predictable output on
//! every platform, and tests can exercise Windows rules from a Linux host.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Longest single path component accepted by the supported filesystems.
const MAX_FILENAME_LENGTH: usize = 255;

/// Windows `MAX_PATH` (260) minus the terminating NUL.
const WINDOWS_MAX_PATH: usize = 259;

/// Linux `PATH_MAX` (4096) minus the terminating NUL.
const LINUX_MAX_PATH: usize = 4095;

/// macOS `PATH_MAX` (1024) minus the terminating NUL.
const MACOS_MAX_PATH: usize = 1023;

const WINDOWS_RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

const MACOS_RESERVED_NAMES: &[&str] = &[
    ".DS_Store",
    ".Trashes",
    ".VolumeIcon",
    ".Spotlight",
    ".fseventsd",
    ".TemporaryItems",
    ".DocumentRevisions",
    ".AppleDouble",
];

/// Target operating system whose filename rules are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsKind {
    Windows,
    Linux,
    MacOs,
    /// Any other system: only path separators and NUL are rejected.
    Other,
}

impl OsKind {
    /// Returns the rules for the host the binary was compiled for.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Other
        }
    }

    /// Maximum length, in characters, of a full path.
    #[must_use]
    pub fn max_path_length(self) -> usize {
        match self {
            Self::Windows => WINDOWS_MAX_PATH,
            Self::Linux => LINUX_MAX_PATH,
            Self::MacOs | Self::Other => MACOS_MAX_PATH,
        }
    }

    /// Maximum length, in characters, of a single path component.
    #[must_use]
    pub fn max_filename_length(self) -> usize {
        MAX_FILENAME_LENGTH
    }

    fn is_illegal_char(self, c: char) -> bool {
        match self {
            Self::Windows => {
                c.is_control()
                    || matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' | '%')
            }
            Self::Linux => matches!(
                c,
                '\0' | '/' | '\\' | '*' | '?' | '|' | '&' | ';' | '<' | '>' | '#' | '!'
            ),
            Self::MacOs => matches!(c, '\0' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|'),
            Self::Other => matches!(c, '\0' | '/'),
        }
    }

    fn strips_edge_dots(self) -> bool {
        matches!(self, Self::Windows | Self::Linux)
    }

    fn reserved_names(self) -> &'static [&'static str] {
        match self {
            Self::Windows => WINDOWS_RESERVED_NAMES,
            Self::MacOs => MACOS_RESERVED_NAMES,
            Self::Linux | Self::Other => &[],
        }
    }

    fn is_reserved_name(self, name: &str) -> bool {
        self.reserved_names()
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(name))
    }

    fn trim_edges(self, name: &str) -> &str {
        let strip_dots = self.strips_edge_dots();
        name.trim_matches(|c: char| c.is_whitespace() || (strip_dots && c == '.'))
    }
}

/// The directory leaves no room for a filename of the requested shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "no room for a filename: {reserved} characters are reserved for prefix and extension out of {max_total_length}"
)]
pub struct PathBudgetExhausted {
    /// Total characters available for the filename.
    pub max_total_length: usize,
    /// Characters taken by prefix, dot and extension.
    pub reserved: usize,
}

/// Removes characters that are illegal on `os` and guards against reserved names.
///
/// Falls back to `fallback_name` when nothing usable is left or when the name
/// is reserved (compared case-insensitively). The result never exceeds
/// `max_length` characters; this is a hard cut, so callers must subtract any
/// prefix or extension from the budget beforehand.
///
/// Already-safe names pass through unchanged, so applying this twice with the
/// same `os` and `max_length` gives the same result as applying it once.
#[must_use]
pub fn sanitize_name(name: &str, fallback_name: &str, os: OsKind, max_length: usize) -> String {
    let filtered: String = name.chars().filter(|&c| !os.is_illegal_char(c)).collect();
    let trimmed = os.trim_edges(&filtered);

    let candidate = if trimmed.is_empty() || os.is_reserved_name(trimmed) {
        fallback_name
    } else {
        trimmed
    };

    // Truncation can expose a trailing space or dot.
    let truncated = os.trim_edges(truncate_chars(candidate, max_length));
    if truncated.is_empty() || os.is_reserved_name(truncated) {
        return os
            .trim_edges(truncate_chars(fallback_name, max_length))
            .to_string();
    }
    truncated.to_string()
}

/// Builds `prefix + stem + "." + extension` within `max_total_length` characters.
///
/// `base_name` is split at its last dot. `extension_override` replaces the
/// original extension (a leading dot is ignored). The stem is sanitized with
/// whatever budget remains after the prefix, dot and extension; a name with
/// no extension at all reserves no dot.
///
/// # Errors
///
/// Returns [`PathBudgetExhausted`] when the prefix and extension alone use up
/// the whole budget.
pub fn compose_safe_filename(
    base_name: &str,
    fallback_name: &str,
    prefix: Option<&str>,
    extension_override: Option<&str>,
    max_total_length: usize,
    os: OsKind,
) -> Result<String, PathBudgetExhausted> {
    let (stem, original_extension) = split_extension(base_name);
    let raw_extension = extension_override
        .map(|ext| ext.trim().trim_start_matches('.'))
        .or(original_extension)
        .unwrap_or("");
    let extension: String = raw_extension
        .chars()
        .filter(|&c| !os.is_illegal_char(c) && !c.is_whitespace())
        .collect();
    let prefix = prefix.unwrap_or("");

    let reserved = prefix.chars().count()
        + extension.chars().count()
        + usize::from(!extension.is_empty());
    if reserved >= max_total_length {
        return Err(PathBudgetExhausted {
            max_total_length,
            reserved,
        });
    }

    let safe_stem = sanitize_name(stem, fallback_name, os, max_total_length - reserved);
    if extension.is_empty() {
        Ok(format!("{prefix}{safe_stem}"))
    } else {
        Ok(format!("{prefix}{safe_stem}.{extension}"))
    }
}

/// Characters left for a single filename inside `directory` on `os`.
///
/// Accounts for the separator between directory and filename and is capped at
/// the per-component limit. Zero means nothing fits.
#[must_use]
pub fn filename_budget(directory: &Path, os: OsKind) -> usize {
    let directory_length = directory.as_os_str().to_string_lossy().chars().count();
    os.max_path_length()
        .saturating_sub(directory_length + 1)
        .min(os.max_filename_length())
}

/// Resolves a sanitized subdirectory of `parent` named after `name`.
///
/// # Errors
///
/// Returns [`PathBudgetExhausted`] when `parent` leaves no room for a name.
pub fn safe_subdirectory(
    parent: &Path,
    name: &str,
    fallback_name: &str,
    os: OsKind,
) -> Result<PathBuf, PathBudgetExhausted> {
    let budget = filename_budget(parent, os);
    if budget == 0 {
        return Err(PathBudgetExhausted {
            max_total_length: 0,
            reserved: 0,
        });
    }
    Ok(parent.join(sanitize_name(name, fallback_name, os, budget)))
}

fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, extension)) => (stem, Some(extension)),
        None => (name, None),
    }
}

fn truncate_chars(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &value[..byte_index],
        None => value,
    }
}
