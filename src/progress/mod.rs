//! Progress reporting for transfers, conversions and cleanup.
//!
//! Orchestrators report through [`ProgressSink`] and never render anything
//! themselves. Each tracked operation is opened with a [`ProgressScope`], which
//! closes its handle on every exit path.

mod terminal;

use std::sync::Arc;

pub use terminal::TerminalProgressSink;

/// Opaque id of one progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgressHandle(u64);

impl ProgressHandle {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn id(self) -> u64 {
        self.0
    }
}

/// What a progress total counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressUnit {
    Bytes,
    Seconds,
    Files,
}

/// Observer for long-running operations.
pub trait ProgressSink: Send + Sync {
    /// Opens an indicator counting up to `total` in `unit`.
    fn create(&self, description: &str, total: u64, unit: ProgressUnit) -> ProgressHandle;

    /// Sets the absolute position of `handle`.
    fn update(&self, handle: ProgressHandle, current: u64);

    /// Closes `handle`. Called exactly once per handle.
    fn close(&self, handle: ProgressHandle);
}

/// Discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn create(&self, _description: &str, _total: u64, _unit: ProgressUnit) -> ProgressHandle {
        ProgressHandle(0)
    }

    fn update(&self, _handle: ProgressHandle, _current: u64) {}

    fn close(&self, _handle: ProgressHandle) {}
}

/// An open indicator that is closed when dropped.
///
/// [`complete`](Self::complete) forces the position to the total first.
pub struct ProgressScope {
    sink: Arc<dyn ProgressSink>,
    handle: ProgressHandle,
    total: u64,
}

impl ProgressScope {
    #[must_use]
    pub fn open(
        sink: &Arc<dyn ProgressSink>,
        description: &str,
        total: u64,
        unit: ProgressUnit,
    ) -> Self {
        let handle = sink.create(description, total, unit);
        Self {
            sink: Arc::clone(sink),
            handle,
            total,
        }
    }

    #[must_use]
    pub fn handle(&self) -> ProgressHandle {
        self.handle
    }

    /// Shared sink, for callbacks that outlive a borrow of the scope.
    #[must_use]
    pub fn sink(&self) -> Arc<dyn ProgressSink> {
        Arc::clone(&self.sink)
    }

    pub fn update(&self, current: u64) {
        self.sink.update(self.handle, current);
    }

    /// Marks the operation done and closes the indicator.
    pub fn complete(self) {
        self.sink.update(self.handle, self.total);
    }
}

impl Drop for ProgressScope {
    fn drop(&mut self) {
        self.sink.close(self.handle);
    }
}
