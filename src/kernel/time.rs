use std::sync::Mutex;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tick {
    pub frame: u64,
}

impl Tick {
    pub fn new() -> Self {
        Tick { frame: 0 }
    }

    pub fn next(&self) -> Self {
        Tick { frame: self.frame + 1 }
    }
}

impl Default for Tick {
    fn default() -> Self {
        Self::new()
    }
}

/// One host clock sample, taken at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockReading {
    /// Media position in seconds (the video timeline).
    pub media_time: f64,
    /// Monotonic audio-context time in seconds. Only ever moves forward.
    pub context_time: f64,
    pub playing: bool,
}

impl ClockReading {
    pub fn playing(media_time: f64, context_time: f64) -> Self {
        Self { media_time, context_time, playing: true }
    }

    pub fn paused(media_time: f64, context_time: f64) -> Self {
        Self { media_time, context_time, playing: false }
    }
}

/// External media clock the engine follows.
pub trait ClockSource {
    fn current_time(&self) -> f64;
    fn is_playing(&self) -> bool;
}

#[derive(Debug)]
struct ClockInner {
    anchor_position: f64,
    anchor_instant: Instant,
    playing: bool,
}

/// Wall-clock driven media clock for headless playback.
#[derive(Debug)]
pub struct SimulatedClock {
    inner: Mutex<ClockInner>,
    duration: Option<f64>,
}

impl SimulatedClock {
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            inner: Mutex::new(ClockInner {
                anchor_position: 0.0,
                anchor_instant: Instant::now(),
                playing: false,
            }),
            duration,
        }
    }

    pub fn play(&self) {
        let mut inner = self.lock();
        if !inner.playing {
            inner.anchor_instant = Instant::now();
            inner.playing = true;
        }
    }

    pub fn pause(&self) {
        let position = self.current_time();
        let mut inner = self.lock();
        inner.anchor_position = position;
        inner.playing = false;
    }

    /// Jumps to `position`, clamped to `[0, duration]`. Returns the clamped position.
    pub fn seek(&self, position: f64) -> f64 {
        let clamped = self.clamp(position);
        let mut inner = self.lock();
        inner.anchor_position = clamped;
        inner.anchor_instant = Instant::now();
        clamped
    }

    pub fn seek_relative(&self, delta: f64) -> f64 {
        self.seek(self.current_time() + delta)
    }

    fn clamp(&self, position: f64) -> f64 {
        let upper = self.duration.unwrap_or(f64::INFINITY);
        position.max(0.0).min(upper)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ClockInner> {
        // A poisoned clock only ever held plain numbers, so keep going with them.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ClockSource for SimulatedClock {
    fn current_time(&self) -> f64 {
        let inner = self.lock();
        let position = if inner.playing {
            inner.anchor_position + inner.anchor_instant.elapsed().as_secs_f64()
        } else {
            inner.anchor_position
        };
        drop(inner);
        self.clamp(position)
    }

    fn is_playing(&self) -> bool {
        let playing = self.lock().playing;
        match self.duration {
            Some(d) if playing => self.current_time() < d,
            _ => playing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seek_clamps_to_media_bounds() {
        let clock = SimulatedClock::new(Some(10.0));
        assert_eq!(clock.seek(-5.0), 0.0);
        assert_eq!(clock.seek(42.0), 10.0);
        assert_eq!(clock.current_time(), 10.0);
        assert!(!clock.is_playing());
    }

    #[test]
    fn paused_clock_holds_position() {
        let clock = SimulatedClock::new(None);
        clock.seek(3.0);
        clock.play();
        clock.pause();
        let held = clock.current_time();
        assert!(held >= 3.0);
        assert_eq!(clock.current_time(), held);
    }

    #[test]
    fn relative_seek_is_clamped() {
        let clock = SimulatedClock::new(Some(10.0));
        clock.seek(4.0);
        assert_eq!(clock.seek_relative(-5.0), 0.0);
        assert_eq!(clock.seek_relative(2.5), 2.5);
        assert_eq!(clock.seek_relative(100.0), 10.0);
    }
}
