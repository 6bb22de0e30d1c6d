use std::sync::Arc;

use super::cancel::Generation;
use super::sources::SourceHandle;
use crate::audio::AudioClip;
use crate::error::EngineError;
use crate::timeline::Timeline;

/// Identifies one decode request. Carried through the async decode and checked
/// against engine state when the result comes back.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecodeTicket {
    pub generation: Generation,
    pub segment_id: String,
    pub clip_revision: u64,
}

pub type DecodeOutcome = Result<Arc<AudioClip>, EngineError>;

#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Play,
    Pause,
    Seek(f64),
    Stop,
}

#[derive(Debug, Clone)]
pub enum Event {
    /// Play/pause/seek/stop notifications from the media clock.
    Transport(TransportEvent),
    /// Upstream translation replaced the timeline wholesale.
    TimelineReplaced(Timeline),
    /// Synthesis collaborator produced (or regenerated) a clip.
    ClipReady { segment_id: String, bytes: Arc<[u8]> },
    ClipFailed { segment_id: String, reason: String },
    ClipGenerating { segment_id: String },
    BaseVolumeChanged(f32),
    /// Host reports a source finished before its planned stop time.
    SourceEnded(SourceHandle),
    DecodeResolved(DecodeTicket, DecodeOutcome),
    Teardown,
}
