//! CLI output formatting and display helpers.

use std::collections::BTreeMap;
use std::path::Path;

use cadmium_core::parser::MediaKind;
use cadmium_core::{CollectionResult, MediaItemResult, ParseResult};
use tracing::{info, warn};

/// Message when no input was provided at all.
pub const NO_INPUT_GUIDANCE: &str =
    "No input provided. Pass YouTube URLs as arguments, with --input, or via stdin.";

/// Message when stdin was piped but empty.
pub const EMPTY_STDIN_GUIDANCE: &str =
    "Received empty stdin input. Pipe YouTube URLs, or pass them as arguments.";

/// Example for passing URLs as arguments.
pub const INPUT_ARG_EXAMPLE: &str = "Example: cadmium --format audio-only https://youtu.be/dQw4w9WgXcQ";

/// Example for reading a URL list.
pub const INPUT_FILE_EXAMPLE: &str = "Example: cadmium --input urls.txt";

/// Returns terminal width from COLUMNS, or 80 if unset/invalid.
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 20)
        .unwrap_or(80)
}

/// Truncates text to at most `width` chars, appending ellipsis if truncated.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    match width {
        0 => String::new(),
        1 => "…".to_string(),
        _ => {
            let mut output: String = text.chars().take(width - 1).collect();
            output.push('…');
            output
        }
    }
}

/// Returns lines for quick-start guidance (headline + examples), truncated to width.
pub fn quick_start_guidance_lines(empty_stdin: bool, width: usize) -> Vec<String> {
    let headline = if empty_stdin {
        EMPTY_STDIN_GUIDANCE
    } else {
        NO_INPUT_GUIDANCE
    };
    [headline, INPUT_ARG_EXAMPLE, INPUT_FILE_EXAMPLE]
        .into_iter()
        .map(|line| truncate_to_width(line, width))
        .collect()
}

/// Prints quick-start guidance to stdout.
pub fn print_quick_start_guidance(empty_stdin: bool) {
    let width = terminal_width().min(80);
    for line in quick_start_guidance_lines(empty_stdin, width) {
        println!("{line}");
    }
}

pub(crate) fn build_parse_feedback_summary(parse_result: &ParseResult) -> String {
    let count = |kind: MediaKind| parse_result.of_kind(kind).count();
    let mut summary = format!(
        "Parsed {} URLs: {} videos, {} playlists, {} channels",
        parse_result.len(),
        count(MediaKind::Video),
        count(MediaKind::Playlist),
        count(MediaKind::Channel)
    );
    if parse_result.skipped_count() > 0 {
        summary.push_str(&format!(" ({} lines skipped)", parse_result.skipped_count()));
    }
    summary
}

pub(crate) fn log_parse_feedback(parse_result: &ParseResult) {
    for skipped in &parse_result.skipped {
        warn!(line = skipped.line, input = %skipped.raw, "{}", skipped.error);
    }
    let summary = build_parse_feedback_summary(parse_result);
    info!("{}", truncate_to_width(&summary, terminal_width()));
}

/// One failed item in the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FailureLine {
    pub(crate) title: String,
    pub(crate) source_url: String,
    pub(crate) message: String,
    pub(crate) category: &'static str,
}

/// Outcome counts across every URL of a run.
#[derive(Debug, Default)]
pub(crate) struct RunTally {
    pub(crate) completed: usize,
    pub(crate) skipped: usize,
    pub(crate) failures: Vec<FailureLine>,
}

impl RunTally {
    pub(crate) fn failed(&self) -> usize {
        self.failures.len()
    }

    pub(crate) fn record_item(&mut self, source_url: &str, result: &MediaItemResult) {
        if result.success() {
            self.completed += 1;
        } else if result.is_skipped() {
            self.skipped += 1;
        } else {
            self.failures.push(FailureLine {
                title: result.title().to_string(),
                source_url: source_url.to_string(),
                message: result.error_message().unwrap_or_default().to_string(),
                category: result.failure_kind().map_or("other", |kind| kind.as_str()),
            });
        }
    }

    pub(crate) fn record_collection(&mut self, result: &CollectionResult) {
        self.completed += result.completed();
        for item in result.failed_items() {
            if item.kind.is_some_and(|kind| kind.is_skip()) {
                self.skipped += 1;
                continue;
            }
            self.failures.push(FailureLine {
                title: item.title.clone(),
                source_url: item.source_url.clone(),
                message: item.error_message.clone(),
                category: item.kind.map_or("other", |kind| kind.as_str()),
            });
        }
    }
}

pub(crate) fn render_failure_summary_lines(failures: &[FailureLine], width: usize) -> Vec<String> {
    if failures.is_empty() {
        return Vec::new();
    }

    let mut grouped: BTreeMap<&'static str, Vec<&FailureLine>> = BTreeMap::new();
    for failure in failures {
        grouped.entry(failure.category).or_default().push(failure);
    }

    let mut lines = vec![truncate_to_width("Failure summary by category:", width)];
    for (category, entries) in &grouped {
        lines.push(truncate_to_width(
            &format!("- {category}: {}", entries.len()),
            width,
        ));
        for entry in entries {
            lines.push(truncate_to_width(
                &format!("  {} <{}>: {}", entry.title, entry.source_url, entry.message),
                width,
            ));
        }
    }
    lines
}

pub(crate) fn print_completion_summary(tally: &RunTally, downloads_root: &Path) {
    info!(
        completed = tally.completed,
        skipped = tally.skipped,
        failed = tally.failed(),
        downloads_root = %downloads_root.display(),
        "Download Summary"
    );
    for line in render_failure_summary_lines(&tally.failures, terminal_width()) {
        println!("{line}");
    }
}
