use super::sources::SourceRegistry;
use super::time::ClockReading;
use crate::timeline::SegmentCursor;

/// Live playback state. Owned by one engine, never shared, never persisted.
#[derive(Debug)]
pub struct PlaybackState {
    pub cursor: SegmentCursor,
    pub active_segment_id: Option<String>,
    pub active_sources: SourceRegistry,
    pub duck_level: f32,
    pub playing: bool,
    /// Segment whose entry was last handled by the scheduler. Cleared on stop-all so
    /// the segment under the playhead is picked up again on resume.
    pub last_scheduled_id: Option<String>,
    /// Manual stop. Holds until the transport plays again.
    pub stopped: bool,
    /// Set once by teardown, never cleared.
    pub torn_down: bool,
    /// Previous tick's clock sample, for detecting clock jumps.
    pub last_reading: Option<ClockReading>,
}

impl PlaybackState {
    pub fn new(seek_epsilon: f64, base_volume: f32) -> Self {
        Self {
            cursor: SegmentCursor::new(seek_epsilon),
            active_segment_id: None,
            active_sources: SourceRegistry::new(),
            duck_level: base_volume,
            playing: false,
            last_scheduled_id: None,
            stopped: false,
            torn_down: false,
            last_reading: None,
        }
    }

    pub fn cursor_index(&self) -> usize {
        self.cursor.index()
    }

    /// Whether new sources may be scheduled: playing, not stopped, not torn down.
    pub fn accepts_sources(&self) -> bool {
        self.playing && !self.stopped && !self.torn_down
    }

    pub fn active_source_count(&self) -> usize {
        self.active_sources.len()
    }
}
