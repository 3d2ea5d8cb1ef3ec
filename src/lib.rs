//! Cadmium Core Library
//!
//! This library provides the core functionality for the cadmium tool, which
//! downloads YouTube videos, playlists and channels in a chosen format and
//! optionally converts or merges them with FFmpeg.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Configuration file, FFmpeg discovery, per-run settings
//! - [`convert`] - External conversion jobs (FFmpeg)
//! - [`download`] - Item and collection orchestration, path safety, stream selection
//! - [`parser`] - YouTube URL classification and URL-list input
//! - [`progress`] - Progress observer and terminal rendering
//! - [`provider`] - Metadata and stream transfer (yt-dlp, HTTP)

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod convert;
pub mod download;
pub mod parser;
pub mod progress;
pub mod provider;
mod user_agent;

// Re-export commonly used types
pub use config::{ConfigError, DownloadSettings, EffectiveDownloadConfig, FileConfig};
pub use convert::{ConversionError, Converter, FfmpegConverter};
pub use download::{
    CollectionDownloadOrchestrator, CollectionResult, DownloadError, DownloadFormat,
    FixedStreamPicker, ItemDownloadOrchestrator, MediaItemResult, StagingArea, StreamPicker,
};
pub use parser::{MediaKind, ParseResult, classify_url, parse_input};
pub use progress::{NullProgressSink, ProgressSink, TerminalProgressSink};
pub use provider::{HttpClient, MetadataProvider, ProviderError, StreamDescriptor, YtDlpProvider};
