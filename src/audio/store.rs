use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::clip::ClipData;
use crate::timeline::Timeline;

/// Source of encoded clips keyed by segment id.
///
/// `None` means "not synthesized yet" or "synthesis failed"; both are silence.
/// Must be safe to call again after a failure.
pub trait ClipProvider {
    fn clip(&self, segment_id: &str) -> Option<ClipData>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisStatus {
    Pending,
    Generating,
    Complete,
    Failed(String),
}

#[derive(Debug, Clone)]
struct ClipEntry {
    status: SynthesisStatus,
    clip: Option<ClipData>,
}

/// Clip set plus per-segment synthesis status.
///
/// Entries are never mutated in place: completing or regenerating a segment
/// swaps in a new `ClipData` with a higher revision.
#[derive(Debug, Clone, Default)]
pub struct ClipStore {
    entries: HashMap<String, ClipEntry>,
    next_revision: u64,
}

impl ClipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `<dir>/<segment-id>.wav` for every segment. Missing files stay pending.
    pub fn load_dir(dir: impl AsRef<Path>, timeline: &Timeline) -> Self {
        let dir = dir.as_ref();
        let mut store = Self::new();
        for seg in timeline.segments() {
            let path = dir.join(format!("{}.wav", seg.id));
            match fs::read(&path) {
                Ok(bytes) => {
                    store.complete(&seg.id, bytes);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("No clip for segment {} at {}", seg.id, path.display());
                    store.mark_pending(&seg.id);
                }
                Err(e) => {
                    warn!("Failed to read clip {}: {}", path.display(), e);
                    store.fail(&seg.id, e.to_string());
                }
            }
        }
        info!("Loaded {} clips from {}", store.ready_count(), dir.display());
        store
    }

    pub fn mark_pending(&mut self, segment_id: &str) {
        self.entries.insert(
            segment_id.to_string(),
            ClipEntry { status: SynthesisStatus::Pending, clip: None },
        );
    }

    /// Starts (re)generation. Clears a previous failure but keeps the previous clip
    /// audible until the replacement lands.
    pub fn mark_generating(&mut self, segment_id: &str) {
        let entry = self
            .entries
            .entry(segment_id.to_string())
            .or_insert(ClipEntry { status: SynthesisStatus::Pending, clip: None });
        entry.status = SynthesisStatus::Generating;
    }

    /// Stores a freshly synthesized clip and returns its revision.
    pub fn complete(&mut self, segment_id: &str, bytes: impl Into<Arc<[u8]>>) -> u64 {
        self.next_revision += 1;
        let revision = self.next_revision;
        self.entries.insert(
            segment_id.to_string(),
            ClipEntry {
                status: SynthesisStatus::Complete,
                clip: Some(ClipData { revision, bytes: bytes.into() }),
            },
        );
        revision
    }

    pub fn fail(&mut self, segment_id: &str, reason: impl Into<String>) {
        self.entries.insert(
            segment_id.to_string(),
            ClipEntry { status: SynthesisStatus::Failed(reason.into()), clip: None },
        );
    }

    pub fn remove(&mut self, segment_id: &str) {
        self.entries.remove(segment_id);
    }

    pub fn status(&self, segment_id: &str) -> Option<&SynthesisStatus> {
        self.entries.get(segment_id).map(|e| &e.status)
    }

    /// Segments whose synthesis failed, sorted for stable retry order.
    pub fn failed_segments(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| matches!(e.status, SynthesisStatus::Failed(_)))
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn ready_count(&self) -> usize {
        self.entries.values().filter(|e| e.clip.is_some()).count()
    }

    pub fn current_revision(&self, segment_id: &str) -> Option<u64> {
        self.entries
            .get(segment_id)
            .and_then(|e| e.clip.as_ref())
            .map(|c| c.revision)
    }
}

impl ClipProvider for ClipStore {
    fn clip(&self, segment_id: &str) -> Option<ClipData> {
        self.entries.get(segment_id).and_then(|e| e.clip.clone())
    }
}

impl ClipProvider for HashMap<String, ClipData> {
    fn clip(&self, segment_id: &str) -> Option<ClipData> {
        self.get(segment_id).cloned()
    }
}
