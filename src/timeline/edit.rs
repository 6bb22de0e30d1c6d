use tracing::info;

use super::segment::{Segment, Timeline};
use crate::error::{EngineError, Result};

/// Result of splitting one segment into two.
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    pub timeline: Timeline,
    pub removed_id: String,
    pub left_id: String,
    pub right_id: String,
}

/// Splits `segment_id` at a boundary proportional to the character lengths of the
/// two replacement texts. Both halves need fresh clip synthesis.
pub fn split_segment(
    timeline: &Timeline,
    segment_id: &str,
    left_text: &str,
    right_text: &str,
) -> Result<SplitOutcome> {
    let original = timeline
        .get(segment_id)
        .ok_or_else(|| EngineError::UnknownSegment(segment_id.to_string()))?;

    let left_len = left_text.chars().count();
    let right_len = right_text.chars().count();
    if left_len == 0 || right_len == 0 {
        return Err(EngineError::InvalidSplit {
            segment_id: segment_id.to_string(),
            reason: "both halves need text".into(),
        });
    }

    let ratio = left_len as f64 / (left_len + right_len) as f64;
    let mid = original.start_time + original.slot_duration() * ratio;
    if mid <= original.start_time || mid >= original.end_time {
        return Err(EngineError::InvalidSplit {
            segment_id: segment_id.to_string(),
            reason: format!("boundary {mid} collapses a half"),
        });
    }

    let left_id = fresh_id(timeline, segment_id, "a", None);
    let right_id = fresh_id(timeline, segment_id, "b", Some(&left_id));

    let left = Segment {
        id: left_id.clone(),
        end_time: mid,
        original_text: left_text.to_string(),
        translated_text: left_text.to_string(),
        ..original.clone()
    };
    let right = Segment {
        id: right_id.clone(),
        start_time: mid,
        original_text: right_text.to_string(),
        translated_text: right_text.to_string(),
        ..original.clone()
    };

    let segments = timeline
        .segments()
        .iter()
        .flat_map(|s| {
            if s.id == segment_id {
                vec![left.clone(), right.clone()]
            } else {
                vec![s.clone()]
            }
        })
        .collect();

    info!("Split segment {} at {:.3}s into {} / {}", segment_id, mid, left_id, right_id);

    Ok(SplitOutcome {
        timeline: Timeline::new(segments)?,
        removed_id: segment_id.to_string(),
        left_id,
        right_id,
    })
}

/// Moves a segment to new boundaries and re-sorts the timeline.
pub fn retime_segment(timeline: &Timeline, segment_id: &str, start: f64, end: f64) -> Result<Timeline> {
    if !timeline.contains_id(segment_id) {
        return Err(EngineError::UnknownSegment(segment_id.to_string()));
    }

    let segments = timeline
        .segments()
        .iter()
        .map(|s| {
            if s.id == segment_id {
                Segment { start_time: start, end_time: end, ..s.clone() }
            } else {
                s.clone()
            }
        })
        .collect();

    Timeline::new(segments)
}

fn fresh_id(timeline: &Timeline, base: &str, suffix: &str, taken: Option<&str>) -> String {
    let is_free = |id: &str| !timeline.contains_id(id) && taken != Some(id);

    let candidate = format!("{base}{suffix}");
    if is_free(&candidate) {
        return candidate;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}{suffix}{n}");
        if is_free(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_id_skips_existing() {
        let timeline = Timeline::new(vec![
            Segment::new("s1", 0.0, 4.0),
            Segment::new("s1a", 5.0, 6.0),
        ])
        .unwrap();
        assert_eq!(fresh_id(&timeline, "s1", "a", None), "s1a2");
        assert_eq!(fresh_id(&timeline, "s1", "b", Some("s1a2")), "s1b");
    }

    #[test]
    fn retime_resorts() {
        let timeline = Timeline::new(vec![
            Segment::new("a", 0.0, 1.0),
            Segment::new("b", 2.0, 3.0),
        ])
        .unwrap();
        let moved = retime_segment(&timeline, "a", 4.0, 5.0).unwrap();
        assert_eq!(moved.segments()[1].id, "a");
        assert!(retime_segment(&timeline, "a", 5.0, 4.0).is_err());
    }
}
