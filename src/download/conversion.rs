//! Decides whether a download needs the external converter.

use super::format::DownloadFormat;
use crate::config::{ConfigError, EffectiveDownloadConfig};

/// Setting name reported when conversion is requested without a converter.
pub(crate) const CONVERTER_SETTING: &str = "ffmpeg";

/// Outcome of the conversion policy for one format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionDecision {
    /// A conversion or merge step runs after the transfer.
    pub required: bool,
    /// Extension of the converted file. Set only when `required`.
    pub target_extension: Option<String>,
}

impl ConversionDecision {
    /// Direct download, no converter involved.
    #[must_use]
    pub fn direct() -> Self {
        Self {
            required: false,
            target_extension: None,
        }
    }
}

/// Resolves the conversion decision for `format` under `config`.
///
/// For `BestOfBoth` the step is a merge and runs only when
/// `merge_into_one_file` is set; otherwise the convert flag of the format
/// decides. Checked once per run, before any item is touched.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidConfiguration`] when a conversion is required
/// but no converter is available, or when the target extension is blank.
pub fn resolve(
    format: DownloadFormat,
    config: &EffectiveDownloadConfig,
) -> Result<ConversionDecision, ConfigError> {
    let required = match format {
        DownloadFormat::BestOfBoth => config.merge_into_one_file,
        DownloadFormat::Video
        | DownloadFormat::VideoOnly
        | DownloadFormat::AudioOnly
        | DownloadFormat::Custom => config.should_convert,
    };
    if !required {
        return Ok(ConversionDecision::direct());
    }

    if config.converter_path.is_none() {
        return Err(ConfigError::invalid(
            CONVERTER_SETTING,
            "cannot convert downloads without FFmpeg; enable ffmpeg.auto_discover or set ffmpeg.path to the executable",
        ));
    }

    let extension = config.target_extension.trim().trim_start_matches('.');
    if extension.is_empty() {
        return Err(ConfigError::invalid(
            format.target_extension_setting(),
            "is empty",
        ));
    }

    Ok(ConversionDecision {
        required: true,
        target_extension: Some(extension.to_string()),
    })
}
