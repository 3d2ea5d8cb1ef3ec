//! Download orchestration.
//!
//! [`ItemDownloadOrchestrator`] turns one URL into a file (or a folder of
//! files) on disk; [`CollectionDownloadOrchestrator`] fans a playlist or
//! channel out over it. The pure building blocks live in their own modules:
//! [`filename`] for path safety, [`selector`] for stream choice and
//! [`conversion`] for the convert/merge decision.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use cadmium_core::config::DownloadSettings;
//! use cadmium_core::download::{DownloadFormat, ItemDownloadOrchestrator};
//! use cadmium_core::progress::NullProgressSink;
//! use cadmium_core::provider::YtDlpProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = DownloadSettings::new("./downloads", std::env::temp_dir().join("cadmium"));
//! let orchestrator = ItemDownloadOrchestrator::new(
//!     Arc::new(YtDlpProvider::default()),
//!     Arc::new(NullProgressSink),
//!     settings,
//! );
//! let result = orchestrator
//!     .download_single_item(
//!         "https://youtu.be/dQw4w9WgXcQ",
//!         DownloadFormat::Video,
//!         Path::new("./downloads/video"),
//!     )
//!     .await?;
//! println!("success: {}", result.success());
//! # Ok(())
//! # }
//! ```

mod collection;
mod constants;
pub mod conversion;
mod error;
pub mod filename;
mod format;
mod orchestrator;
mod picker;
mod result;
pub mod selector;
mod staging;

pub use collection::CollectionDownloadOrchestrator;
pub use constants::{AUDIO_PREFIX, VIDEO_PREFIX};
pub use conversion::ConversionDecision;
pub use error::{DownloadError, FailureKind};
pub use filename::{OsKind, PathBudgetExhausted, compose_safe_filename, sanitize_name};
pub use format::{DownloadFormat, UnknownFormat};
pub use orchestrator::ItemDownloadOrchestrator;
pub use picker::{FixedStreamPicker, StreamPicker};
pub use result::{CollectionResult, CollectionResultBuilder, FailedItem, MediaItemResult};
pub use selector::{NoMatchingStream, StreamSelection, select_streams};
pub use staging::{StagedFiles, StagingArea};
