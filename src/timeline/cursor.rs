use super::segment::Segment;

/// Tracks which segment is current as the playback position moves.
///
/// Monotonic playback only ever walks the index forward. Anything that looks
/// like a jump (out of range, a segment that starts too far ahead, or a previous
/// segment that still reaches `t`) falls back to a scan from the start.
#[derive(Debug, Clone, Default)]
pub struct SegmentCursor {
    index: usize,
    epsilon: f64,
}

impl SegmentCursor {
    pub fn new(epsilon: f64) -> Self {
        Self { index: 0, epsilon }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Returns the index of the segment active at `t`, if any.
    pub fn locate(&mut self, segments: &[Segment], t: f64) -> Option<usize> {
        if self.is_discontinuous(segments, t) {
            self.index = Self::scan(segments, t);
        }

        while self.index < segments.len() && segments[self.index].end_time < t {
            self.index += 1;
        }

        match segments.get(self.index) {
            Some(seg) if seg.contains(t) => Some(self.index),
            _ => None,
        }
    }

    fn is_discontinuous(&self, segments: &[Segment], t: f64) -> bool {
        let Some(current) = segments.get(self.index) else {
            return true;
        };
        if current.start_time > t + self.epsilon {
            return true;
        }
        // Every update leaves segments[index - 1].end < t, so reaching it again means we moved back.
        self.index > 0 && segments[self.index - 1].end_time >= t
    }

    fn scan(segments: &[Segment], t: f64) -> usize {
        for (i, seg) in segments.iter().enumerate() {
            if seg.contains(t) || seg.start_time > t {
                return i;
            }
        }
        0
    }
}
