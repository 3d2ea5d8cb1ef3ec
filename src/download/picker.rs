//! Stream choice for custom downloads.

use crate::provider::StreamDescriptor;

/// Chooses which candidate streams of a custom download to fetch.
///
/// Returned ids that match no candidate are ignored; an empty choice cancels
/// the item.
pub trait StreamPicker: Send + Sync {
    fn pick(&self, title: &str, candidates: &[StreamDescriptor]) -> Vec<String>;
}

/// Picks a fixed list of stream ids, or every candidate when the list is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedStreamPicker {
    ids: Vec<String>,
}

impl FixedStreamPicker {
    #[must_use]
    pub fn new(ids: Vec<String>) -> Self {
        Self { ids }
    }

    /// Picks every candidate.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }
}

impl StreamPicker for FixedStreamPicker {
    fn pick(&self, _title: &str, candidates: &[StreamDescriptor]) -> Vec<String> {
        if self.ids.is_empty() {
            return candidates.iter().map(|s| s.id.clone()).collect();
        }
        self.ids
            .iter()
            .filter(|id| candidates.iter().any(|s| &s.id == *id))
            .cloned()
            .collect()
    }
}
