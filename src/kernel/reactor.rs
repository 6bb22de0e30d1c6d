use std::time::Instant;

use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::cancel::GenerationCounter;
use super::ducking::DuckingController;
use super::event::{Event, TransportEvent};
use super::scheduler::{Scheduler, SideEffect};
use super::state::PlaybackState;
use super::telemetry::event::TelemetryEvent;
use super::telemetry::recorder::TelemetryRecorder;
use super::time::{ClockReading, ClockSource, Tick};
use crate::audio::ClipStore;
use crate::config::EngineConfig;
use crate::decoder::AsyncDecoder;
use crate::error::Result;
use crate::outputs::PlaybackSink;
use crate::timeline::{self, SplitOutcome, Timeline};

/// Result of one tick: what the UI should highlight and what the driver must do.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub active_segment_id: Option<String>,
    pub effects: Vec<SideEffect>,
}

/// The dubbing playback engine.
///
/// All state mutation happens inside `tick_step` and the edit methods, on one
/// logical executor. Asynchronous work (decoding) only ever reports back through
/// the event channel.
pub struct Reactor {
    pub receiver: mpsc::Receiver<Event>,
    pub config: EngineConfig,
    pub timeline: Timeline,
    pub clips: ClipStore,
    pub state: PlaybackState,
    pub scheduler: Scheduler,
    pub generation: GenerationCounter,
    pub telemetry: TelemetryRecorder,
    pub tick: Tick,
    decoder: AsyncDecoder,
}

impl Reactor {
    pub fn new(receiver: mpsc::Receiver<Event>, tx: mpsc::Sender<Event>, config: EngineConfig) -> Self {
        Self {
            receiver,
            state: PlaybackState::new(config.seek_epsilon_secs, config.base_volume),
            scheduler: Scheduler::new(DuckingController::new(config.base_volume, config.duck_factor)),
            config,
            timeline: Timeline::empty(),
            clips: ClipStore::new(),
            generation: GenerationCounter::new(),
            telemetry: TelemetryRecorder::new(),
            tick: Tick::new(),
            decoder: AsyncDecoder::new(tx),
        }
    }

    /// Pure Tick Step: reads one clock sample, applies pending events, returns the
    /// side effects for the driver. MUST NOT await I/O or timers.
    pub fn tick_step(&mut self, reading: ClockReading, events: Vec<Event>) -> TickOutcome {
        self.tick = self.tick.next();
        let mut effects = Vec::new();
        let mut resolved = Vec::new();
        let seek_announced = events
            .iter()
            .any(|e| matches!(e, Event::Transport(TransportEvent::Seek(_))));

        // === 1. EVENTS ===
        for event in events {
            match event {
                Event::DecodeResolved(ticket, outcome) => resolved.push((ticket, outcome)),
                other => effects.extend(self.apply(other)),
            }
        }

        // === 2. PLAY STATE (the clock is the source of truth) ===
        if reading.playing != self.state.playing {
            if reading.playing {
                self.state.stopped = false;
            } else {
                effects.extend(self.halt());
            }
            debug!("Playing: {} at {:.3}s", reading.playing, reading.media_time);
            self.state.playing = reading.playing;
        } else if reading.playing && !seek_announced && self.is_clock_jump(reading) {
            // The clock moved without announcing a seek.
            effects.extend(self.seek(reading.media_time));
        }
        self.state.last_reading = Some(reading);

        // === 3. NATURAL COMPLETION ===
        for handle in self.state.active_sources.expired(reading.context_time) {
            effects.extend(self.scheduler.finish_source(&mut self.state, handle, &mut self.telemetry));
        }

        // === 4. DECODE CONTINUATIONS ===
        for (ticket, outcome) in resolved {
            effects.extend(self.scheduler.resolve_decode(
                &mut self.state,
                ticket,
                outcome,
                &self.timeline,
                &self.clips,
                &self.generation,
                reading,
                &mut self.telemetry,
            ));
        }

        // === 5. CURSOR (always, paused or not) ===
        let segments = self.timeline.segments();
        let next_active = self
            .state
            .cursor
            .locate(segments, reading.media_time)
            .map(|i| segments[i].id.clone());
        if next_active != self.state.active_segment_id {
            self.state.active_segment_id = next_active.clone();
            effects.push(SideEffect::ActiveSegmentChanged(next_active));
        }

        // === 6. SCHEDULE (playing only) ===
        effects.extend(self.scheduler.on_tick(
            &mut self.state,
            &self.clips,
            &self.generation,
            &mut self.telemetry,
        ));

        TickOutcome {
            active_segment_id: self.state.active_segment_id.clone(),
            effects,
        }
    }

    fn apply(&mut self, event: Event) -> Vec<SideEffect> {
        match event {
            Event::Transport(TransportEvent::Seek(position)) => self.seek(position),
            Event::Transport(TransportEvent::Stop) => {
                self.state.stopped = true;
                self.halt()
            }
            Event::Transport(TransportEvent::Play) => {
                debug!("Transport Play");
                self.state.stopped = false;
                Vec::new()
            }
            Event::Transport(TransportEvent::Pause) => {
                debug!("Transport Pause");
                Vec::new()
            }
            Event::TimelineReplaced(timeline) => {
                self.replace_timeline(timeline);
                Vec::new()
            }
            Event::ClipReady { segment_id, bytes } => {
                let revision = self.clips.complete(&segment_id, bytes);
                debug!("Clip for segment {} ready (revision {})", segment_id, revision);
                Vec::new()
            }
            Event::ClipFailed { segment_id, reason } => {
                info!("Synthesis failed for segment {}: {}", segment_id, reason);
                self.clips.fail(&segment_id, reason);
                Vec::new()
            }
            Event::ClipGenerating { segment_id } => {
                self.clips.mark_generating(&segment_id);
                Vec::new()
            }
            Event::BaseVolumeChanged(volume) => self
                .scheduler
                .set_base_volume(volume, &mut self.state)
                .into_iter()
                .collect(),
            Event::SourceEnded(handle) => self
                .scheduler
                .finish_source(&mut self.state, handle, &mut self.telemetry)
                .into_iter()
                .collect(),
            Event::Teardown => self.teardown(),
            Event::DecodeResolved(..) => Vec::new(),
        }
    }

    /// Seek: invalidates in-flight decodes and silences everything.
    pub fn seek(&mut self, position: f64) -> Vec<SideEffect> {
        self.telemetry.record(TelemetryEvent::Seek { position });
        self.halt()
    }

    /// Stop-all behind a generation bump. Used by seek, pause, stop and teardown.
    pub fn halt(&mut self) -> Vec<SideEffect> {
        self.generation.bump();
        self.scheduler.stop_all(&mut self.state, &mut self.telemetry)
    }

    /// Final stop. Nothing is scheduled afterwards, whatever the clock does.
    pub fn teardown(&mut self) -> Vec<SideEffect> {
        info!("Tearing down playback at tick {}", self.tick.frame);
        self.state.torn_down = true;
        self.halt()
    }

    /// Media time drifting from the context clock by more than the seek tolerance
    /// between two playing ticks.
    fn is_clock_jump(&self, reading: ClockReading) -> bool {
        let Some(last) = self.state.last_reading.filter(|r| r.playing) else {
            return false;
        };
        let media_delta = reading.media_time - last.media_time;
        let context_delta = reading.context_time - last.context_time;
        (media_delta - context_delta).abs() > self.config.seek_epsilon_secs
    }

    pub fn replace_timeline(&mut self, timeline: Timeline) {
        info!("Timeline replaced: {} segments", timeline.len());
        self.timeline = timeline;
        self.state.cursor.reset();
    }

    /// Splits a segment. The old clip is dropped; both halves wait for synthesis.
    pub fn split_segment(&mut self, segment_id: &str, left_text: &str, right_text: &str) -> Result<SplitOutcome> {
        let outcome = timeline::split_segment(&self.timeline, segment_id, left_text, right_text)?;
        self.clips.remove(&outcome.removed_id);
        self.clips.mark_pending(&outcome.left_id);
        self.clips.mark_pending(&outcome.right_id);
        self.replace_timeline(outcome.timeline.clone());
        Ok(outcome)
    }

    pub fn retime_segment(&mut self, segment_id: &str, start: f64, end: f64) -> Result<()> {
        let timeline = timeline::retime_segment(&self.timeline, segment_id, start, end)?;
        self.replace_timeline(timeline);
        Ok(())
    }

    /// Current gain of the original track.
    pub fn original_gain(&self) -> f32 {
        self.state.duck_level
    }

    /// Async Driver Loop. Ticks every `tick_ms` until `shutdown` fires, then tears down.
    pub async fn run<C, S>(&mut self, clock: &C, sink: &mut S, shutdown: CancellationToken)
    where
        C: ClockSource,
        S: PlaybackSink,
    {
        info!("Playback driver started. Tick: {}ms", self.config.tick_ms);

        let started = Instant::now();
        let mut cadence = interval(Duration::from_millis(self.config.tick_ms));
        cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = cadence.tick() => {}
            }

            // Driver: Drain Events (Transport + Clips + Decodes)
            let mut events = Vec::new();
            while let Ok(event) = self.receiver.try_recv() {
                events.push(event);
            }

            let reading = ClockReading {
                media_time: clock.current_time(),
                context_time: started.elapsed().as_secs_f64(),
                playing: clock.is_playing(),
            };

            let outcome = self.tick_step(reading, events);
            self.execute(outcome.effects, sink);
        }

        let effects = self.teardown();
        self.execute(effects, sink);
        info!("Playback driver stopped after {} ticks", self.tick.frame);
    }

    /// Driver: Execute Side Effects
    pub fn execute<S: PlaybackSink>(&self, effects: Vec<SideEffect>, sink: &mut S) {
        for effect in effects {
            match effect {
                SideEffect::ActiveSegmentChanged(id) => sink.active_segment_changed(id.as_deref()),
                SideEffect::RequestDecode { ticket, bytes } => self.decoder.dispatch(ticket, bytes),
                SideEffect::StartSource { handle, segment_id, clip, plan } => {
                    sink.start_source(handle, &segment_id, clip, &plan)
                }
                SideEffect::StopSource(handle) => sink.stop_source(handle),
                SideEffect::SetOriginalGain(gain) => sink.set_original_gain(gain),
            }
        }
    }
}
