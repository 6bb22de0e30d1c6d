use std::sync::Arc;

use tracing::info;

use crate::audio::AudioClip;
use crate::kernel::plan::PlaybackPlan;
use crate::kernel::sources::SourceHandle;

/// Host side of live playback: the audio graph and the subtitle/UI layer.
pub trait PlaybackSink {
    fn active_segment_changed(&mut self, segment_id: Option<&str>);
    fn start_source(&mut self, handle: SourceHandle, segment_id: &str, clip: Arc<AudioClip>, plan: &PlaybackPlan);
    fn stop_source(&mut self, handle: SourceHandle);
    fn set_original_gain(&mut self, gain: f32);
}

/// Headless sink that only reports what a real audio graph would do.
#[derive(Debug, Default)]
pub struct TracingSink;

impl PlaybackSink for TracingSink {
    fn active_segment_changed(&mut self, segment_id: Option<&str>) {
        info!("[SUBTITLE] {}", segment_id.unwrap_or("-"));
    }

    fn start_source(&mut self, handle: SourceHandle, segment_id: &str, clip: Arc<AudioClip>, plan: &PlaybackPlan) {
        info!(
            "[AUDIO-{}] {} at x{:.3} from {:.3}s, {:.3}s of {:.3}s clip",
            handle.index,
            segment_id,
            plan.rate,
            plan.offset,
            plan.remaining,
            clip.duration()
        );
    }

    fn stop_source(&mut self, handle: SourceHandle) {
        info!("[AUDIO-{}] stopped", handle.index);
    }

    fn set_original_gain(&mut self, gain: f32) {
        info!("[ORIGINAL] gain {:.3}", gain);
    }
}
