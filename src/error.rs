use thiserror::Error;

/// Engine error taxonomy.
///
/// A missing clip and a stale decode are not errors: the former is `None` from the
/// clip provider, the latter is discarded silently by the scheduler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Clip bytes could not be decoded. Treated as silence for that segment.
    #[error("failed to decode clip for segment {segment_id}: {reason}")]
    DecodeFailure { segment_id: String, reason: String },

    #[error("invalid timeline: {0}")]
    InvalidTimeline(String),

    #[error("unknown segment: {0}")]
    UnknownSegment(String),

    #[error("invalid split of segment {segment_id}: {reason}")]
    InvalidSplit { segment_id: String, reason: String },

    /// Terminal failure of one export attempt. The live engine is unaffected.
    #[error("export failed: {0}")]
    ExportFailure(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
