use std::sync::Arc;

use tracing::{debug, warn};

use super::cancel::GenerationCounter;
use super::ducking::DuckingController;
use super::event::{DecodeOutcome, DecodeTicket};
use super::plan::{corrected_rate, plan_playback, PlaybackPlan, TimeBase};
use super::sources::{ScheduledSource, SourceHandle};
use super::state::PlaybackState;
use super::telemetry::event::TelemetryEvent;
use super::telemetry::recorder::TelemetryRecorder;
use super::time::ClockReading;
use crate::audio::{AudioClip, ClipProvider};
use crate::timeline::Timeline;

/// Work the driver performs on the engine's behalf after a tick.
#[derive(Debug, Clone)]
pub enum SideEffect {
    ActiveSegmentChanged(Option<String>),
    /// Fire-and-forget decode. The result comes back as `Event::DecodeResolved`.
    RequestDecode { ticket: DecodeTicket, bytes: Arc<[u8]> },
    StartSource {
        handle: SourceHandle,
        segment_id: String,
        clip: Arc<AudioClip>,
        plan: PlaybackPlan,
    },
    StopSource(SourceHandle),
    SetOriginalGain(f32),
}

/// Everything that touches the active source set goes through here, so the duck
/// level is re-derived on every add and every removal.
pub struct Scheduler {
    ducking: DuckingController,
}

impl Scheduler {
    pub fn new(ducking: DuckingController) -> Self {
        Self { ducking }
    }

    pub fn ducking(&self) -> &DuckingController {
        &self.ducking
    }

    /// Transition check. Issues a decode when the playhead enters a segment the
    /// scheduler has not handled yet. Never stops earlier sources.
    pub fn on_tick<P: ClipProvider>(
        &self,
        state: &mut PlaybackState,
        clips: &P,
        generation: &GenerationCounter,
        telemetry: &mut TelemetryRecorder,
    ) -> Option<SideEffect> {
        if !state.accepts_sources() {
            return None;
        }
        let active_id = state.active_segment_id.clone()?;
        if state.last_scheduled_id.as_deref() == Some(active_id.as_str()) {
            return None;
        }

        state.last_scheduled_id = Some(active_id.clone());
        telemetry.record(TelemetryEvent::SegmentEntered { segment_id: active_id.clone() });

        let Some(data) = clips.clip(&active_id) else {
            debug!("Segment {} has no clip yet, staying silent", active_id);
            return None;
        };

        telemetry.record(TelemetryEvent::DecodeRequested { segment_id: active_id.clone() });
        Some(SideEffect::RequestDecode {
            ticket: DecodeTicket {
                generation: generation.current(),
                segment_id: active_id,
                clip_revision: data.revision,
            },
            bytes: data.bytes,
        })
    }

    /// Continuation of a decode. Re-validates everything that may have changed
    /// while it was in flight before anything is scheduled.
    pub fn resolve_decode<P: ClipProvider>(
        &self,
        state: &mut PlaybackState,
        ticket: DecodeTicket,
        outcome: DecodeOutcome,
        timeline: &Timeline,
        clips: &P,
        generation: &GenerationCounter,
        reading: ClockReading,
        telemetry: &mut TelemetryRecorder,
    ) -> Vec<SideEffect> {
        let segment_id = ticket.segment_id.clone();

        // === 1. STALENESS (seek / pause / stop / teardown / clip replaced) ===
        let current_revision = clips.clip(&segment_id).map(|c| c.revision);
        let segment = match timeline.get(&segment_id) {
            Some(seg)
                if generation.is_current(ticket.generation)
                    && state.accepts_sources()
                    && current_revision == Some(ticket.clip_revision) =>
            {
                seg
            }
            _ => {
                debug!("Discarded stale decode for segment {} ({:?})", segment_id, ticket.generation);
                telemetry.record(TelemetryEvent::StaleDecodeDiscarded { segment_id });
                return Vec::new();
            }
        };

        // === 2. DECODE FAILURE -> silence ===
        let clip = match outcome {
            Ok(clip) => clip,
            Err(e) => {
                warn!("{}", e);
                telemetry.record(TelemetryEvent::DecodeFailed { segment_id });
                return self.refresh_duck(state).into_iter().collect();
            }
        };

        // === 3. PLAN against the position at resolution time ===
        let Some(plan) = plan_playback(segment, clip.duration(), TimeBase::Live { position: reading.media_time })
        else {
            debug!(
                "Nothing left to play for segment {} at {:.3}s",
                segment_id, reading.media_time
            );
            telemetry.record(TelemetryEvent::ScheduleAbandoned { segment_id });
            return Vec::new();
        };

        // === 4. REGISTER ===
        let handle = state.active_sources.insert(ScheduledSource {
            segment_id: segment_id.clone(),
            started_at_clock_time: reading.context_time,
            rate: plan.rate,
            offset: plan.offset,
            planned_stop_time: reading.context_time + plan.remaining,
        });
        let raw_rate = clip.duration() / segment.slot_duration();
        telemetry.record(TelemetryEvent::SourceStarted {
            handle,
            rate: plan.rate,
            clamped: raw_rate != corrected_rate(clip.duration(), segment.slot_duration()),
        });
        debug!(
            "Source {:?} for segment {}: rate {:.3}, offset {:.3}s, {:.3}s to play",
            handle, segment_id, plan.rate, plan.offset, plan.remaining
        );

        let mut effects = vec![SideEffect::StartSource { handle, segment_id, clip, plan }];
        effects.extend(self.refresh_duck(state));
        effects
    }

    /// Completion handler. Idempotent: unknown or already-removed handles do nothing.
    pub fn finish_source(
        &self,
        state: &mut PlaybackState,
        handle: SourceHandle,
        telemetry: &mut TelemetryRecorder,
    ) -> Option<SideEffect> {
        state.active_sources.remove(handle)?;
        telemetry.record(TelemetryEvent::SourceFinished { handle });
        self.refresh_duck(state)
    }

    /// Halts every sounding source and puts the original track back to its base gain.
    /// With nothing sounding this emits nothing.
    pub fn stop_all(&self, state: &mut PlaybackState, telemetry: &mut TelemetryRecorder) -> Vec<SideEffect> {
        state.last_scheduled_id = None;

        let drained = state.active_sources.drain();
        let mut effects: Vec<SideEffect> = drained
            .iter()
            .map(|(handle, _)| SideEffect::StopSource(*handle))
            .collect();
        if !drained.is_empty() {
            telemetry.record(TelemetryEvent::AllStopped { stopped: drained.len() });
        }

        effects.extend(self.refresh_duck(state));
        effects
    }

    pub fn set_base_volume(&mut self, volume: f32, state: &mut PlaybackState) -> Option<SideEffect> {
        self.ducking.set_base_volume(volume);
        self.refresh_duck(state)
    }

    fn refresh_duck(&self, state: &mut PlaybackState) -> Option<SideEffect> {
        let gain = self.ducking.gain_for(state.active_sources.len());
        if gain == state.duck_level {
            return None;
        }
        state.duck_level = gain;
        Some(SideEffect::SetOriginalGain(gain))
    }
}
