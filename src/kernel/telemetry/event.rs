use crate::kernel::sources::SourceHandle;

// Allowed: IDs, Handles, Durations, Counts, Rates
// Forbidden: Text, Samples

#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryEvent {
    SegmentEntered {
        segment_id: String,
    },

    DecodeRequested {
        segment_id: String,
    },

    /// The decode came back after a seek/pause/stop or a clip replacement.
    StaleDecodeDiscarded {
        segment_id: String,
    },

    DecodeFailed {
        segment_id: String,
    },

    /// Playhead was already past the end of the (rate-corrected) clip.
    ScheduleAbandoned {
        segment_id: String,
    },

    SourceStarted {
        handle: SourceHandle,
        rate: f64,
        clamped: bool,
    },

    SourceFinished {
        handle: SourceHandle,
    },

    AllStopped {
        stopped: usize,
    },

    Seek {
        position: f64,
    },
}
