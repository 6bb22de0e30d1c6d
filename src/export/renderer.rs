use std::path::PathBuf;

use tracing::{debug, info, warn};

use super::wav::{write_wav, MAX_SAMPLES};
use crate::audio::{decode_wav, AudioClip, ClipProvider};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::kernel::plan::{plan_playback, PlaybackPlan, TimeBase};
use crate::timeline::Timeline;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExportRequest {
    /// Total length in seconds. Falls back to the timeline end plus the tail.
    pub duration: Option<f64>,
}

/// Finished dub layer, mono f32.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMix {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Segments that actually contributed audio.
    pub placed: usize,
}

impl RenderedMix {
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Renders the dub layer without a clock.
///
/// Uses the same [`plan_playback`] as live playback, anchored at each segment's
/// literal start time. No ducking: the original track is not part of the export.
#[derive(Debug, Clone, Copy)]
pub struct OfflineRenderer {
    sample_rate: u32,
    tail_secs: f64,
}

impl OfflineRenderer {
    pub fn new(sample_rate: u32, tail_secs: f64) -> Self {
        Self { sample_rate, tail_secs }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.export_sample_rate, config.export_tail_secs)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn resolve_duration(&self, timeline: &Timeline, request: ExportRequest) -> Result<f64> {
        let explicit = request.duration.filter(|d| d.is_finite() && *d > 0.0);
        explicit
            .or_else(|| timeline.end_time().map(|end| end + self.tail_secs))
            .ok_or_else(|| EngineError::ExportFailure("empty timeline and no export duration".into()))
    }

    pub fn render<P: ClipProvider>(
        &self,
        timeline: &Timeline,
        clips: &P,
        request: ExportRequest,
    ) -> Result<RenderedMix> {
        if self.sample_rate == 0 {
            return Err(EngineError::ExportFailure("sample rate must be > 0".into()));
        }
        let duration = self.resolve_duration(timeline, request)?;
        let total = (duration * self.sample_rate as f64).ceil();
        if total > MAX_SAMPLES as f64 {
            return Err(EngineError::ExportFailure(format!(
                "{duration}s at {}Hz exceeds the WAV size limit",
                self.sample_rate
            )));
        }
        let total = total as usize;
        let mut out = Vec::new();
        out.try_reserve_exact(total)
            .map_err(|e| EngineError::ExportFailure(format!("cannot allocate {total} samples: {e}")))?;
        out.resize(total, 0.0f32);
        let mut placed = 0;

        for seg in timeline.segments() {
            let Some(data) = clips.clip(&seg.id) else {
                continue;
            };
            let clip = match decode_wav(&seg.id, &data.bytes) {
                Ok(clip) => clip,
                Err(e) => {
                    warn!("Skipping segment {} in export: {}", seg.id, e);
                    continue;
                }
            };
            let Some(plan) = plan_playback(seg, clip.duration(), TimeBase::Literal) else {
                continue;
            };
            debug!("Export: {} at {:.3}s, rate {:.3}", seg.id, plan.start_at, plan.rate);
            mix_source(&mut out, self.sample_rate, &clip, &plan);
            placed += 1;
        }

        info!(
            "Rendered {:.2}s at {}Hz with {}/{} segments",
            duration,
            self.sample_rate,
            placed,
            timeline.len()
        );

        Ok(RenderedMix { samples: out, sample_rate: self.sample_rate, placed })
    }
}

/// Adds one planned source into `out`, starting at `plan.start_at` media time.
pub fn mix_source(out: &mut [f32], sample_rate: u32, clip: &AudioClip, plan: &PlaybackPlan) {
    let sr = sample_rate as f64;
    let first = (plan.start_at * sr).ceil().max(0.0) as usize;
    let last = (((plan.start_at + plan.remaining) * sr).ceil() as usize).min(out.len());

    for (i, slot) in out.iter_mut().enumerate().take(last).skip(first) {
        let t = i as f64 / sr - plan.start_at;
        let gain = plan.envelope.gain_at(t) as f32;
        if gain == 0.0 {
            continue;
        }
        *slot += clip.sample_at(plan.clip_position(t)) * gain;
    }
}

/// Renders on the blocking pool and writes the WAV. Isolated from live playback.
pub async fn export_wav<P>(
    renderer: OfflineRenderer,
    timeline: Timeline,
    clips: P,
    request: ExportRequest,
    path: PathBuf,
) -> Result<RenderedMix>
where
    P: ClipProvider + Send + 'static,
{
    tokio::task::spawn_blocking(move || -> Result<RenderedMix> {
        let mix = renderer.render(&timeline, &clips, request)?;
        write_wav(&path, &mix)?;
        info!("Exported {:.2}s to {}", mix.duration(), path.display());
        Ok(mix)
    })
    .await
    .map_err(|e| EngineError::ExportFailure(e.to_string()))?
}
