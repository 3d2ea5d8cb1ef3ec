//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use cadmium_core::DownloadFormat;

/// Download YouTube videos, playlists and channels.
///
/// Each URL is downloaded in the chosen format into
/// `<output dir>/<format folder>`, optionally converted or merged with FFmpeg.
#[derive(Parser, Debug)]
#[command(name = "cadmium")]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub download: DownloadArgs,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file (defaults to $XDG_CONFIG_HOME/cadmium/config.json)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Remove leftover files from the staging directory
    Clean,
}

#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    /// YouTube video, playlist or channel URLs
    pub urls: Vec<String>,

    /// Read URLs from a file, one per line ('#' starts a comment)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output format: video, video-only, audio-only, best-of-both, custom
    #[arg(short, long, default_value_t = DownloadFormat::Video)]
    pub format: DownloadFormat,

    /// Root directory for downloads (overrides locations.root)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Stream ids to download with --format custom (prompted when omitted)
    #[arg(short, long, value_delimiter = ',', value_name = "IDS")]
    pub streams: Vec<String>,
}
