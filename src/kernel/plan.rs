//! Rate, offset and envelope math shared by live playback and offline export.
//!
//! Both paths call [`plan_playback`]; they differ only in the [`TimeBase`].

use crate::timeline::Segment;

pub const MIN_RATE: f64 = 0.9;
pub const MAX_RATE: f64 = 1.1;
pub const FADE_SECS: f64 = 0.05;

/// Where the playback decision is anchored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeBase {
    /// Live clock: the media position observed when the decode resolved.
    Live { position: f64 },
    /// Offline: the segment's own `start_time`.
    Literal,
}

/// Linear 50ms fade-in from 0, hold at 1, linear 50ms fade-out ending at `end`.
/// Times are seconds since the source started sounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub fade_in_end: f64,
    pub fade_out_start: f64,
    pub end: f64,
}

impl Envelope {
    pub fn new(end: f64) -> Self {
        Self {
            fade_in_end: FADE_SECS,
            fade_out_start: end - FADE_SECS,
            end,
        }
    }

    pub fn gain_at(&self, t: f64) -> f64 {
        if t < 0.0 || t >= self.end {
            return 0.0;
        }
        let fade_in = t / FADE_SECS;
        let fade_out = (self.end - t) / FADE_SECS;
        fade_in.min(fade_out).min(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackPlan {
    pub rate: f64,
    /// Seconds into the clip where playback begins.
    pub offset: f64,
    /// Seconds of output the source sounds for: `(clip - offset) / rate`.
    pub remaining: f64,
    /// Media time at which the source starts.
    pub start_at: f64,
    pub envelope: Envelope,
}

impl PlaybackPlan {
    /// Clip position (seconds) heard `t` seconds after the source started.
    pub fn clip_position(&self, t: f64) -> f64 {
        self.offset + t * self.rate
    }
}

/// Clip duration over slot duration, clamped so the voice never drifts more than
/// 10% in tempo. Overrunning the slot is accepted instead.
pub fn corrected_rate(clip_duration: f64, slot_duration: f64) -> f64 {
    if slot_duration <= 0.0 || !clip_duration.is_finite() {
        return 1.0;
    }
    (clip_duration / slot_duration).clamp(MIN_RATE, MAX_RATE)
}

/// Plans one source for `segment`. `None` means nothing is left to play.
pub fn plan_playback(segment: &Segment, clip_duration: f64, time_base: TimeBase) -> Option<PlaybackPlan> {
    if clip_duration.is_nan() || clip_duration <= 0.0 {
        return None;
    }

    let rate = corrected_rate(clip_duration, segment.slot_duration());
    let (start_at, elapsed) = match time_base {
        TimeBase::Live { position } => (position, (position - segment.start_time).max(0.0)),
        TimeBase::Literal => (segment.start_time, 0.0),
    };

    let offset = elapsed * rate;
    if offset >= clip_duration {
        return None;
    }

    let remaining = (clip_duration - offset) / rate;
    Some(PlaybackPlan {
        rate,
        offset,
        remaining,
        start_at,
        envelope: Envelope::new(remaining),
    })
}
