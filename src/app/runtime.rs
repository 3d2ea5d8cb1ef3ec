//! Run composition: configuration, collaborators, the download loop and the summary.

use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use cadmium_core::config::{load_file_config, resolve_default_config_path};
use cadmium_core::parser::{MediaKind, ParsedItem};
use cadmium_core::{
    CollectionDownloadOrchestrator, DownloadFormat, DownloadSettings, FfmpegConverter, FileConfig,
    FixedStreamPicker, ItemDownloadOrchestrator, NullProgressSink, ProgressSink, StagingArea,
    StreamPicker, TerminalProgressSink, YtDlpProvider, parse_input,
};
use clap::Parser;
use tracing::{debug, info, warn};

use crate::ProcessExit;
use crate::app::output::{self, RunTally};
use crate::app::terminal::{self, TerminalProfile};
use crate::app::{exit_handler, input, picker};
use crate::cli::{Cli, Command};

pub(crate) async fn run_cadmium() -> Result<ProcessExit> {
    let cli = Cli::parse();

    let profile = TerminalProfile::detect(&cli);
    terminal::init_tracing(&cli, profile);
    debug!(?cli, "CLI arguments parsed");

    let settings = load_settings(&cli)?;
    let staging = StagingArea::new(&settings.staging_directory);
    let progress: Arc<dyn ProgressSink> = if profile.progress_bars {
        Arc::new(TerminalProgressSink::new())
    } else {
        Arc::new(NullProgressSink)
    };

    if cli.command == Some(Command::Clean) {
        let removed = staging
            .clear(&progress)
            .await
            .context("failed to clear the staging directory")?;
        info!(removed, directory = %staging.directory().display(), "Staging directory cleared");
        return Ok(ProcessExit::Success);
    }

    let (input_text, piped_stdin_was_empty) = input::collect_input(&cli.download)?;
    let Some(input_text) = input_text else {
        output::print_quick_start_guidance(piped_stdin_was_empty);
        return Ok(ProcessExit::Success);
    };
    let parsed = parse_input(&input_text);
    output::log_parse_feedback(&parsed);
    if parsed.is_empty() {
        warn!("No YouTube URLs found in input");
        return Ok(ProcessExit::Failure);
    }

    let format = cli.download.format;
    let directory = settings
        .effective(format)
        .download_directory()
        .context("invalid download location")?;
    staging
        .prepare(settings.warnings.silence_staging_residue)
        .await
        .context("failed to prepare the staging directory")?;

    let downloads_root = settings.downloads_root.clone();
    let clear_staging_on_exit = settings.clear_staging_on_exit;
    let items = Arc::new(build_orchestrator(&cli, settings, Arc::clone(&progress)));
    let collections = CollectionDownloadOrchestrator::new(Arc::clone(&items));

    info!(
        urls = parsed.len(),
        format = %format,
        directory = %directory.display(),
        "Cadmium starting"
    );

    let tally = tokio::select! {
        tally = download_all(&items, &collections, &parsed.items, format, &directory) => tally?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted; stopping after cleanup");
            return Ok(ProcessExit::Failure);
        }
    };

    if clear_staging_on_exit {
        staging
            .clear(&progress)
            .await
            .context("failed to clear the staging directory")?;
    }

    output::print_completion_summary(&tally, &downloads_root);
    Ok(exit_handler::determine_exit_outcome(&tally))
}

fn load_settings(cli: &Cli) -> Result<DownloadSettings> {
    let config_path = cli.config.clone().or_else(resolve_default_config_path);
    let file = match &config_path {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            load_file_config(path)?
        }
        None => FileConfig::default(),
    };
    Ok(DownloadSettings::resolve(
        file,
        cli.download.output_dir.clone(),
    )?)
}

fn build_orchestrator(
    cli: &Cli,
    settings: DownloadSettings,
    progress: Arc<dyn ProgressSink>,
) -> ItemDownloadOrchestrator {
    let converter = settings.converter_path.clone();
    let picker: Arc<dyn StreamPicker> = if !cli.download.streams.is_empty() {
        Arc::new(FixedStreamPicker::new(cli.download.streams.clone()))
    } else if io::stdin().is_terminal() {
        Arc::new(picker::StdinStreamPicker)
    } else {
        Arc::new(FixedStreamPicker::all())
    };

    let mut orchestrator =
        ItemDownloadOrchestrator::new(Arc::new(YtDlpProvider::default()), progress, settings)
            .with_picker(picker);
    if let Some(program) = converter {
        debug!(ffmpeg = %program.display(), "converter available");
        orchestrator = orchestrator.with_converter(Arc::new(FfmpegConverter::new(program)));
    }
    orchestrator
}

async fn download_all(
    items: &ItemDownloadOrchestrator,
    collections: &CollectionDownloadOrchestrator,
    parsed: &[ParsedItem],
    format: DownloadFormat,
    directory: &Path,
) -> Result<RunTally> {
    let mut tally = RunTally::default();
    for item in parsed {
        match item.kind {
            MediaKind::Video => {
                let result = items
                    .download_single_item(&item.url, format, directory)
                    .await?;
                tally.record_item(&item.url, &result);
            }
            MediaKind::Playlist | MediaKind::Channel => {
                let result = collections
                    .download_collection(&item.url, format, directory)
                    .await?;
                tally.record_collection(&result);
            }
        }
    }
    Ok(tally)
}
