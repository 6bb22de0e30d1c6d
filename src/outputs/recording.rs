use std::sync::Arc;

use super::sink::PlaybackSink;
use crate::audio::AudioClip;
use crate::kernel::plan::PlaybackPlan;
use crate::kernel::sources::SourceHandle;

#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    ActiveSegment(Option<String>),
    Start { handle: SourceHandle, segment_id: String, plan: PlaybackPlan },
    Stop(SourceHandle),
    OriginalGain(f32),
}

/// Sink that keeps every call, for harnesses that assert on what the host saw.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SinkCall::Start { segment_id, .. } => Some(segment_id.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last_gain(&self) -> Option<f32> {
        self.calls.iter().rev().find_map(|c| match c {
            SinkCall::OriginalGain(g) => Some(*g),
            _ => None,
        })
    }
}

impl PlaybackSink for RecordingSink {
    fn active_segment_changed(&mut self, segment_id: Option<&str>) {
        self.calls.push(SinkCall::ActiveSegment(segment_id.map(str::to_string)));
    }

    fn start_source(&mut self, handle: SourceHandle, segment_id: &str, _clip: Arc<AudioClip>, plan: &PlaybackPlan) {
        self.calls.push(SinkCall::Start { handle, segment_id: segment_id.to_string(), plan: *plan });
    }

    fn stop_source(&mut self, handle: SourceHandle) {
        self.calls.push(SinkCall::Stop(handle));
    }

    fn set_original_gain(&mut self, gain: f32) {
        self.calls.push(SinkCall::OriginalGain(gain));
    }
}
