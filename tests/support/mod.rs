//! Shared fakes for orchestrator integration tests.
//!
//! `FakeProvider` serves canned metadata and writes stream bytes to disk,
//! `FakeConverter` concatenates its inputs, and `RecordingSink` records every
//! progress event so tests can check that handles are closed.

#![allow(dead_code)]

pub mod socket_guard;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cadmium_core::config::DownloadSettings;
use cadmium_core::convert::{ConversionCallback, ConversionError, ConversionJob, Converter};
use cadmium_core::download::OsKind;
use cadmium_core::progress::{ProgressHandle, ProgressSink, ProgressUnit};
use cadmium_core::provider::{
    CollectionKind, CollectionListing, CollectionMember, MetadataProvider, ProviderError,
    ResolvedMedia, StreamDescriptor, TransferCallback,
};
use futures_util::StreamExt;
use futures_util::stream;
use tempfile::TempDir;

// ==================== Stream fixtures ====================

pub fn progressive(id: &str, height: u32, title: &str) -> StreamDescriptor {
    StreamDescriptor {
        id: id.to_string(),
        default_filename: format!("{title}.mp4"),
        filesize: Some(1_000),
        has_video: true,
        has_audio: true,
        subtype: "mp4".to_string(),
        resolution: Some(height),
        fps: Some(30),
        ..StreamDescriptor::default()
    }
}

pub fn video_only(id: &str, height: u32, title: &str) -> StreamDescriptor {
    StreamDescriptor {
        id: id.to_string(),
        default_filename: format!("{title}.webm"),
        filesize: Some(2_000),
        has_video: true,
        subtype: "webm".to_string(),
        resolution: Some(height),
        fps: Some(30),
        ..StreamDescriptor::default()
    }
}

pub fn audio_only(id: &str, kbps: u64, title: &str) -> StreamDescriptor {
    StreamDescriptor {
        id: id.to_string(),
        default_filename: format!("{title}.m4a"),
        filesize: Some(500),
        has_audio: true,
        subtype: "m4a".to_string(),
        bitrate: Some(kbps * 1000),
        ..StreamDescriptor::default()
    }
}

pub fn media(title: &str, id: &str, streams: Vec<StreamDescriptor>) -> ResolvedMedia {
    ResolvedMedia {
        title: title.to_string(),
        stable_id: id.to_string(),
        duration: Some(Duration::from_secs(90)),
        streams,
    }
}

/// A typical item: two progressive, two video-only and two audio-only streams.
pub fn full_media(title: &str, id: &str) -> ResolvedMedia {
    media(
        title,
        id,
        vec![
            progressive("18", 360, title),
            progressive("22", 720, title),
            video_only("137", 1080, title),
            video_only("136", 720, title),
            audio_only("139", 48, title),
            audio_only("140", 128, title),
        ],
    )
}

// ==================== FakeProvider ====================

struct FakeListing {
    title: String,
    stable_id: String,
    kind: CollectionKind,
    members: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub stream_id: String,
    pub path: PathBuf,
    pub skip_existing: bool,
}

#[derive(Default)]
pub struct FakeProvider {
    media: HashMap<String, ResolvedMedia>,
    listings: HashMap<String, FakeListing>,
    failing_streams: HashSet<String>,
    abandoned_streams: HashSet<String>,
    transfers: Mutex<Vec<Transfer>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_media(mut self, url: &str, media: ResolvedMedia) -> Self {
        self.media.insert(url.to_string(), media);
        self
    }

    /// Registers a collection; a `None` member is an entry that fails to list.
    pub fn with_listing(
        mut self,
        url: &str,
        title: &str,
        stable_id: &str,
        kind: CollectionKind,
        members: Vec<Option<&str>>,
    ) -> Self {
        self.listings.insert(
            url.to_string(),
            FakeListing {
                title: title.to_string(),
                stable_id: stable_id.to_string(),
                kind,
                members: members.into_iter().map(|m| m.map(str::to_string)).collect(),
            },
        );
        self
    }

    /// Transfers of this stream id fail with HTTP 500.
    pub fn failing_stream(mut self, stream_id: &str) -> Self {
        self.failing_streams.insert(stream_id.to_string());
        self
    }

    /// Transfers of this stream id return no file and no error.
    pub fn abandoned_stream(mut self, stream_id: &str) -> Self {
        self.abandoned_streams.insert(stream_id.to_string());
        self
    }

    pub fn transfers(&self) -> Vec<Transfer> {
        self.transfers.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataProvider for FakeProvider {
    async fn resolve(&self, url: &str) -> Result<ResolvedMedia, ProviderError> {
        self.media
            .get(url)
            .cloned()
            .ok_or_else(|| ProviderError::http_status(url, 404))
    }

    async fn download_stream(
        &self,
        stream: &StreamDescriptor,
        output_directory: &Path,
        filename: &str,
        skip_existing: bool,
        on_progress: TransferCallback,
    ) -> Result<Option<PathBuf>, ProviderError> {
        let path = output_directory.join(filename);
        self.transfers.lock().unwrap().push(Transfer {
            stream_id: stream.id.clone(),
            path: path.clone(),
            skip_existing,
        });

        if self.failing_streams.contains(&stream.id) {
            return Err(ProviderError::http_status(format!("fake://{}", stream.id), 500));
        }
        if self.abandoned_streams.contains(&stream.id) {
            return Ok(None);
        }
        if skip_existing && path.exists() {
            return Ok(None);
        }

        let body = format!("[{}]", stream.id);
        std::fs::write(&path, &body).map_err(|e| ProviderError::io(&path, e))?;
        on_progress(body.len() as u64, 0);
        Ok(Some(path))
    }

    async fn list_collection(&self, url: &str) -> Result<CollectionListing, ProviderError> {
        let listing = self
            .listings
            .get(url)
            .ok_or_else(|| ProviderError::http_status(url, 404))?;
        let members: Vec<Result<CollectionMember, ProviderError>> = listing
            .members
            .iter()
            .map(|member| match member {
                Some(url) => Ok(CollectionMember {
                    url: url.clone(),
                    title: None,
                }),
                None => Err(ProviderError::invalid_url("entry")),
            })
            .collect();
        Ok(CollectionListing {
            title: listing.title.clone(),
            stable_id: listing.stable_id.clone(),
            kind: listing.kind,
            members: stream::iter(members).boxed(),
        })
    }
}

// ==================== FakeConverter ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRecord {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    /// Whether every input existed when the job ran.
    pub inputs_present: bool,
}

/// How a fake conversion job ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum JobOutcome {
    #[default]
    Succeed,
    /// Writes a truncated output, then fails.
    FailAfterWriting,
    /// Fails before the output is opened.
    FailBeforeOutput,
}

#[derive(Default)]
pub struct FakeConverter {
    outcome: JobOutcome,
    records: Arc<Mutex<Vec<ConversionRecord>>>,
    terminated: Arc<AtomicBool>,
}

impl FakeConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            outcome: JobOutcome::FailAfterWriting,
            ..Self::default()
        }
    }

    pub fn failing_before_output() -> Self {
        Self {
            outcome: JobOutcome::FailBeforeOutput,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<ConversionRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn was_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }
}

impl Converter for FakeConverter {
    fn build_job(
        &self,
        inputs: &[PathBuf],
        output: &Path,
    ) -> Result<Box<dyn ConversionJob>, ConversionError> {
        if inputs.is_empty() {
            return Err(ConversionError::NoInputs);
        }
        Ok(Box::new(FakeJob {
            inputs: inputs.to_vec(),
            output: output.to_path_buf(),
            outcome: self.outcome,
            callback: None,
            records: Arc::clone(&self.records),
            terminated: Arc::clone(&self.terminated),
        }))
    }
}

struct FakeJob {
    inputs: Vec<PathBuf>,
    output: PathBuf,
    outcome: JobOutcome,
    callback: Option<ConversionCallback>,
    records: Arc<Mutex<Vec<ConversionRecord>>>,
    terminated: Arc<AtomicBool>,
}

#[async_trait]
impl ConversionJob for FakeJob {
    fn on_progress(&mut self, callback: ConversionCallback) {
        self.callback = Some(callback);
    }

    async fn execute(&mut self) -> Result<(), ConversionError> {
        self.records.lock().unwrap().push(ConversionRecord {
            inputs: self.inputs.clone(),
            output: self.output.clone(),
            inputs_present: self.inputs.iter().all(|p| p.exists()),
        });
        if let Some(callback) = &self.callback {
            callback(45.0);
        }
        match self.outcome {
            JobOutcome::Succeed => {}
            JobOutcome::FailAfterWriting => {
                std::fs::write(&self.output, b"partial").unwrap();
                return Err(ConversionError::Failed {
                    code: Some(1),
                    stderr: "Invalid data found when processing input".to_string(),
                });
            }
            JobOutcome::FailBeforeOutput => {
                return Err(ConversionError::Failed {
                    code: None,
                    stderr: "could not start".to_string(),
                });
            }
        }

        let mut merged = Vec::new();
        for input in &self.inputs {
            merged.extend(std::fs::read(input).unwrap());
        }
        std::fs::write(&self.output, merged).unwrap();
        Ok(())
    }

    async fn terminate(&mut self) {
        self.terminated.store(true, Ordering::SeqCst);
    }
}

// ==================== RecordingSink ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Create {
        handle: u64,
        description: String,
        total: u64,
        unit: ProgressUnit,
    },
    Update {
        handle: u64,
        current: u64,
    },
    Close {
        handle: u64,
    },
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
    next: Mutex<u64>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Create { description, .. } => Some(description),
                _ => None,
            })
            .collect()
    }

    /// Handles created but never closed.
    pub fn open_handles(&self) -> Vec<u64> {
        let events = self.events();
        events
            .iter()
            .filter_map(|event| match event {
                ProgressEvent::Create { handle, .. } => Some(*handle),
                _ => None,
            })
            .filter(|handle| {
                !events
                    .iter()
                    .any(|event| *event == ProgressEvent::Close { handle: *handle })
            })
            .collect()
    }

    /// Whether the last update of `handle` reached its total.
    pub fn completed(&self, handle: u64) -> bool {
        let events = self.events();
        let total = events.iter().find_map(|event| match event {
            ProgressEvent::Create { handle: h, total, .. } if *h == handle => Some(*total),
            _ => None,
        });
        let last = events.iter().rev().find_map(|event| match event {
            ProgressEvent::Update { handle: h, current } if *h == handle => Some(*current),
            _ => None,
        });
        total.is_some() && total == last
    }
}

impl ProgressSink for RecordingSink {
    fn create(&self, description: &str, total: u64, unit: ProgressUnit) -> ProgressHandle {
        let mut next = self.next.lock().unwrap();
        *next += 1;
        let handle = *next;
        self.events.lock().unwrap().push(ProgressEvent::Create {
            handle,
            description: description.to_string(),
            total,
            unit,
        });
        ProgressHandle::new(handle)
    }

    fn update(&self, handle: ProgressHandle, current: u64) {
        self.events.lock().unwrap().push(ProgressEvent::Update {
            handle: handle.id(),
            current,
        });
    }

    fn close(&self, handle: ProgressHandle) {
        self.events
            .lock()
            .unwrap()
            .push(ProgressEvent::Close { handle: handle.id() });
    }
}

// ==================== Settings ====================

/// Settings rooted in a temp dir, Linux filename rules, no converter.
pub struct TestEnv {
    pub root: TempDir,
    pub settings: DownloadSettings,
}

impl TestEnv {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let mut settings =
            DownloadSettings::new(root.path().join("downloads"), root.path().join("staging"));
        settings.os = OsKind::Linux;
        Self { root, settings }
    }

    /// Enables conversion with a (never executed) converter path.
    pub fn with_converter_path(mut self) -> Self {
        self.settings.converter_path = Some(PathBuf::from("/usr/bin/ffmpeg"));
        self
    }

    pub fn downloads(&self) -> PathBuf {
        self.root.path().join("downloads")
    }

    pub fn staging(&self) -> PathBuf {
        self.root.path().join("staging")
    }

    /// Regular files left in the staging directory.
    pub fn staged_files(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(self.staging()) {
            Ok(entries) => entries
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| path.is_file())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}
