//! `indicatif` progress bars on stderr.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use super::{ProgressHandle, ProgressSink, ProgressUnit};

const BYTES_TEMPLATE: &str =
    "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const SECONDS_TEMPLATE: &str = "{msg} [{bar:40.green/white}] {pos}/{len}s ({eta})";
const FILES_TEMPLATE: &str = "{msg} [{bar:40.yellow/white}] {pos}/{len} files";
const PROGRESS_CHARS: &str = "=> ";

/// Renders one bar per open handle.
#[derive(Debug, Default)]
pub struct TerminalProgressSink {
    multi: MultiProgress,
    bars: Mutex<HashMap<u64, ProgressBar>>,
    next_id: AtomicU64,
}

impl TerminalProgressSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn bars(&self) -> MutexGuard<'_, HashMap<u64, ProgressBar>> {
        self.bars.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn style_for(unit: ProgressUnit) -> ProgressStyle {
    let template = match unit {
        ProgressUnit::Bytes => BYTES_TEMPLATE,
        ProgressUnit::Seconds => SECONDS_TEMPLATE,
        ProgressUnit::Files => FILES_TEMPLATE,
    };
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(PROGRESS_CHARS)
}

impl ProgressSink for TerminalProgressSink {
    fn create(&self, description: &str, total: u64, unit: ProgressUnit) -> ProgressHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let bar = self.multi.add(ProgressBar::new(total));
        bar.set_style(style_for(unit));
        bar.set_message(description.to_string());
        self.bars().insert(id, bar);
        ProgressHandle::new(id)
    }

    fn update(&self, handle: ProgressHandle, current: u64) {
        if let Some(bar) = self.bars().get(&handle.id()) {
            bar.set_position(current);
        }
    }

    fn close(&self, handle: ProgressHandle) {
        if let Some(bar) = self.bars().remove(&handle.id()) {
            bar.finish();
        }
    }
}
