//! Configuration file loading and the per-run settings snapshot.
//!
//! The JSON file is read once per run into [`FileConfig`]. [`DownloadSettings`]
//! resolves it against the environment (FFmpeg discovery, directories, target
//! OS) and hands each download an immutable [`EffectiveDownloadConfig`] for
//! the chosen format. Nothing in this module writes configuration back.

mod error;

use std::env;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

pub use error::ConfigError;

use crate::download::{DownloadFormat, OsKind};
use crate::provider::CollectionKind;

/// Directory name under the config home and the system temp directory.
pub const APP_DIR_NAME: &str = "cadmium";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Downloads root used when neither the CLI nor the file sets one.
pub const DEFAULT_DOWNLOADS_ROOT: &str = "downloads";

/// Contents of `config.json`. Every field is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub behavior: BehaviorConfig,
    pub locations: LocationOverrides,
    pub folders: FolderConfig,
    pub ffmpeg: FfmpegConfig,
    pub staging: StagingConfig,
    pub warnings: WarningConfig,
    pub display: DisplayConfig,
}

/// Skip, convert and merge behavior.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BehaviorConfig {
    pub skip_existing: bool,
    pub convert_video: bool,
    pub convert_video_only: bool,
    pub convert_audio_only: bool,
    pub convert_custom: bool,
    /// Merge best-of-both downloads into one file instead of two siblings.
    pub merge_best_of_both: bool,
    pub video_target_extension: String,
    pub video_only_target_extension: String,
    pub audio_only_target_extension: String,
    pub merged_target_extension: String,
    pub custom_target_extension: String,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            skip_existing: true,
            convert_video: false,
            convert_video_only: false,
            convert_audio_only: false,
            convert_custom: false,
            merge_best_of_both: false,
            video_target_extension: "mp4".to_string(),
            video_only_target_extension: "mp4".to_string(),
            audio_only_target_extension: "mp3".to_string(),
            merged_target_extension: "mp4".to_string(),
            custom_target_extension: "mp4".to_string(),
        }
    }
}

/// Download directories. Unset formats use `<root>/<format directory>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocationOverrides {
    pub root: Option<PathBuf>,
    pub video: Option<PathBuf>,
    pub video_only: Option<PathBuf>,
    pub audio_only: Option<PathBuf>,
    pub best_of_both: Option<PathBuf>,
    pub custom: Option<PathBuf>,
}

impl LocationOverrides {
    fn for_format(&self, format: DownloadFormat) -> Option<&Path> {
        let path = match format {
            DownloadFormat::Video => self.video.as_deref(),
            DownloadFormat::VideoOnly => self.video_only.as_deref(),
            DownloadFormat::AudioOnly => self.audio_only.as_deref(),
            DownloadFormat::BestOfBoth => self.best_of_both.as_deref(),
            DownloadFormat::Custom => self.custom.as_deref(),
        };
        path.filter(|p| !p.as_os_str().is_empty())
    }
}

/// Subfolder grouping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FolderConfig {
    pub group_playlists: bool,
    pub group_channels: bool,
    pub group_custom_streams: bool,
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            group_playlists: true,
            group_channels: true,
            group_custom_streams: false,
        }
    }
}

/// FFmpeg discovery.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FfmpegConfig {
    /// Search `PATH` when no explicit path is set.
    pub auto_discover: bool,
    pub path: Option<PathBuf>,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            auto_discover: true,
            path: None,
        }
    }
}

/// Temporary staging area for downloads awaiting conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StagingConfig {
    pub directory: Option<PathBuf>,
    pub clear_on_exit: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WarningConfig {
    /// Do not warn about files left in the staging area by earlier runs.
    pub silence_staging_residue: bool,
    /// Do not log skipped-existing items at warn level.
    pub silence_already_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Log a summary of the chosen stream before each transfer.
    pub announce_chosen_stream: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            announce_chosen_stream: true,
        }
    }
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/cadmium/config.json`
/// 2. `$HOME/.config/cadmium/config.json`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join(APP_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads `path`, falling back to defaults when the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] when the file exists but cannot be read and
/// [`ConfigError::Parse`] when it is not valid configuration JSON.
pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(FileConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Finds the FFmpeg executable according to `config`.
///
/// An explicit path wins and must exist. Otherwise `PATH` is searched when
/// auto-discovery is enabled. `Ok(None)` means no converter is available.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidConfiguration`] when the explicit path does
/// not exist.
pub fn locate_ffmpeg(config: &FfmpegConfig) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = config.path.as_ref().filter(|p| !p.as_os_str().is_empty()) {
        if !path.exists() {
            return Err(ConfigError::invalid(
                "ffmpeg.path",
                format!("{} does not exist", path.display()),
            ));
        }
        return Ok(Some(path.clone()));
    }

    if !config.auto_discover {
        return Ok(None);
    }

    let found = env::var_os("PATH").and_then(|path_var| find_on_path(ffmpeg_file_name(), &path_var));
    debug!(ffmpeg = ?found, "FFmpeg discovery finished");
    Ok(found)
}

fn ffmpeg_file_name() -> &'static str {
    if cfg!(windows) { "ffmpeg.exe" } else { "ffmpeg" }
}

/// Returns the first `program` file found in the directories of `path_var`.
#[must_use]
pub fn find_on_path(program: &str, path_var: &OsStr) -> Option<PathBuf> {
    env::split_paths(path_var)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// Per-run settings, resolved once and shared read-only by every download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    pub behavior: BehaviorConfig,
    pub locations: LocationOverrides,
    pub folders: FolderConfig,
    pub warnings: WarningConfig,
    pub display: DisplayConfig,
    /// FFmpeg executable, if one was found.
    pub converter_path: Option<PathBuf>,
    /// Parent of the per-format default directories.
    pub downloads_root: PathBuf,
    pub staging_directory: PathBuf,
    pub clear_staging_on_exit: bool,
    /// Filename rules applied to every destination.
    pub os: OsKind,
}

impl DownloadSettings {
    /// Default settings rooted at `downloads_root`, staging in `staging_directory`,
    /// with no converter.
    #[must_use]
    pub fn new(downloads_root: impl Into<PathBuf>, staging_directory: impl Into<PathBuf>) -> Self {
        let file = FileConfig::default();
        Self {
            behavior: file.behavior,
            locations: file.locations,
            folders: file.folders,
            warnings: file.warnings,
            display: file.display,
            converter_path: None,
            downloads_root: downloads_root.into(),
            staging_directory: staging_directory.into(),
            clear_staging_on_exit: file.staging.clear_on_exit,
            os: OsKind::current(),
        }
    }

    /// Resolves a loaded file against the environment.
    ///
    /// `downloads_root` (from the command line) wins over `locations.root`.
    ///
    /// # Errors
    ///
    /// Propagates FFmpeg discovery errors from [`locate_ffmpeg`].
    pub fn resolve(file: FileConfig, downloads_root: Option<PathBuf>) -> Result<Self, ConfigError> {
        let converter_path = locate_ffmpeg(&file.ffmpeg)?;
        let downloads_root = downloads_root
            .or_else(|| file.locations.root.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOADS_ROOT));
        let staging_directory = file
            .staging
            .directory
            .clone()
            .unwrap_or_else(|| env::temp_dir().join(APP_DIR_NAME));

        Ok(Self {
            behavior: file.behavior,
            locations: file.locations,
            folders: file.folders,
            warnings: file.warnings,
            display: file.display,
            converter_path,
            downloads_root,
            staging_directory,
            clear_staging_on_exit: file.staging.clear_on_exit,
            os: OsKind::current(),
        })
    }

    /// Snapshot of the settings that apply to `format`.
    #[must_use]
    pub fn effective(&self, format: DownloadFormat) -> EffectiveDownloadConfig {
        let behavior = &self.behavior;
        let (should_convert, target_extension) = match format {
            DownloadFormat::Video => (behavior.convert_video, &behavior.video_target_extension),
            DownloadFormat::VideoOnly => (
                behavior.convert_video_only,
                &behavior.video_only_target_extension,
            ),
            DownloadFormat::AudioOnly => (
                behavior.convert_audio_only,
                &behavior.audio_only_target_extension,
            ),
            DownloadFormat::BestOfBoth => (
                behavior.merge_best_of_both,
                &behavior.merged_target_extension,
            ),
            DownloadFormat::Custom => (behavior.convert_custom, &behavior.custom_target_extension),
        };
        let override_directory = self.locations.for_format(format).map(Path::to_path_buf);

        EffectiveDownloadConfig {
            format,
            use_location_override: override_directory.is_some(),
            override_directory,
            default_directory: self.downloads_root.join(format.default_directory_name()),
            skip_existing: behavior.skip_existing,
            should_convert,
            target_extension: target_extension.clone(),
            merge_into_one_file: behavior.merge_best_of_both,
            group_into_subfolder: format == DownloadFormat::Custom
                && self.folders.group_custom_streams,
            converter_path: self.converter_path.clone(),
            os: self.os,
            announce_chosen_stream: self.display.announce_chosen_stream,
            silence_already_exists: self.warnings.silence_already_exists,
        }
    }

    /// Whether members of a collection of `kind` go into their own subfolder.
    #[must_use]
    pub fn group_collection(&self, kind: CollectionKind) -> bool {
        match kind {
            CollectionKind::Playlist => self.folders.group_playlists,
            CollectionKind::Channel => self.folders.group_channels,
        }
    }
}

/// Immutable per-format view of [`DownloadSettings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveDownloadConfig {
    pub format: DownloadFormat,
    pub use_location_override: bool,
    pub override_directory: Option<PathBuf>,
    /// `<downloads root>/<format directory>`.
    pub default_directory: PathBuf,
    pub skip_existing: bool,
    /// Convert flag for single-stream formats, merge flag for best-of-both.
    pub should_convert: bool,
    pub target_extension: String,
    pub merge_into_one_file: bool,
    /// Put custom stream selections into a per-item folder.
    pub group_into_subfolder: bool,
    pub converter_path: Option<PathBuf>,
    pub os: OsKind,
    pub announce_chosen_stream: bool,
    pub silence_already_exists: bool,
}

impl EffectiveDownloadConfig {
    /// Directory downloads of this format go to.
    ///
    /// A location override must already exist; the default directory is
    /// created by the caller when missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PathDoesNotExist`] or
    /// [`ConfigError::DirectoryIsAFile`] for an unusable override.
    pub fn download_directory(&self) -> Result<PathBuf, ConfigError> {
        let Some(directory) = self.override_directory.as_ref().filter(|_| self.use_location_override)
        else {
            return Ok(self.default_directory.clone());
        };

        let setting = self.format.location_override_setting().to_string();
        if !directory.exists() {
            return Err(ConfigError::PathDoesNotExist {
                setting,
                path: directory.clone(),
            });
        }
        if !directory.is_dir() {
            return Err(ConfigError::DirectoryIsAFile {
                setting,
                path: directory.clone(),
            });
        }
        Ok(directory.clone())
    }
}
