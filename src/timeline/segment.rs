use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A time-boxed unit of dialogue. Times are seconds on the media timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: String,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub speaker_id: String,
    #[serde(default)]
    pub original_text: String,
    #[serde(default)]
    pub translated_text: String,
}

impl Segment {
    pub fn new(id: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            id: id.into(),
            start_time,
            end_time,
            speaker_id: String::new(),
            original_text: String::new(),
            translated_text: String::new(),
        }
    }

    pub fn with_text(mut self, original: impl Into<String>, translated: impl Into<String>) -> Self {
        self.original_text = original.into();
        self.translated_text = translated.into();
        self
    }

    pub fn with_speaker(mut self, speaker_id: impl Into<String>) -> Self {
        self.speaker_id = speaker_id.into();
        self
    }

    /// The time budget the clip must fit into.
    pub fn slot_duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Closed interval check: both boundaries belong to the segment.
    pub fn contains(&self, t: f64) -> bool {
        self.start_time <= t && t <= self.end_time
    }
}

/// Upstream analysis results wrap the segments in an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum TimelineDocument {
    Bare(Vec<Segment>),
    Analysis { segments: Vec<Segment> },
}

/// Ordered segment list.
///
/// Invariants held at all times: sorted ascending by `start_time`, `start < end`,
/// ids unique. Edits go through [`Timeline::new`] again and produce a new value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    segments: Vec<Segment>,
}

impl Timeline {
    pub fn new(mut segments: Vec<Segment>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(segments.len());
        for seg in &segments {
            if !seg.start_time.is_finite() || !seg.end_time.is_finite() {
                return Err(EngineError::InvalidTimeline(format!(
                    "segment {} has non-finite times",
                    seg.id
                )));
            }
            if seg.start_time >= seg.end_time {
                return Err(EngineError::InvalidTimeline(format!(
                    "segment {} starts at {} but ends at {}",
                    seg.id, seg.start_time, seg.end_time
                )));
            }
            if !seen.insert(seg.id.as_str()) {
                return Err(EngineError::InvalidTimeline(format!(
                    "duplicate segment id {}",
                    seg.id
                )));
            }
        }

        // Stable sort keeps upstream order for equal start times.
        segments.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        Ok(Self { segments })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let doc: TimelineDocument = serde_json::from_str(text)
            .map_err(|e| EngineError::InvalidTimeline(e.to_string()))?;
        match doc {
            TimelineDocument::Bare(segments) | TimelineDocument::Analysis { segments } => {
                Self::new(segments)
            }
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| EngineError::InvalidTimeline(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.segments.iter().position(|s| s.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    /// Latest end time across all segments. This is the last-starting segment's end
    /// unless an earlier segment overlaps past it, in which case the export tail is
    /// measured from the overlapping end so no segment is cut short.
    pub fn end_time(&self) -> Option<f64> {
        self.segments
            .iter()
            .map(|s| s.end_time)
            .max_by(|a, b| a.total_cmp(b))
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_on_construction() {
        let timeline = Timeline::new(vec![
            Segment::new("b", 5.0, 6.0),
            Segment::new("a", 1.0, 2.0),
        ])
        .unwrap();
        assert_eq!(timeline.segments()[0].id, "a");
        assert_eq!(timeline.index_of("b"), Some(1));
    }

    #[test]
    fn rejects_inverted_and_duplicate_segments() {
        assert!(Timeline::new(vec![Segment::new("a", 2.0, 2.0)]).is_err());
        assert!(Timeline::new(vec![
            Segment::new("a", 0.0, 1.0),
            Segment::new("a", 2.0, 3.0),
        ])
        .is_err());
    }

    #[test]
    fn parses_analysis_document() {
        let json = r#"{
            "segments": [
                { "id": "s2", "startTime": 4.0, "endTime": 6.5, "speakerId": "spk_1",
                  "originalText": "Hi", "translatedText": "Selam" },
                { "id": "s1", "startTime": 0.5, "endTime": 3.0 }
            ],
            "detectedLanguage": "en"
        }"#;
        let timeline = Timeline::from_json(json).unwrap();
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.segments()[0].id, "s1");
        assert_eq!(timeline.get("s2").unwrap().translated_text, "Selam");
        assert_eq!(timeline.end_time(), Some(6.5));
    }

    #[test]
    fn end_time_covers_overlapping_earlier_segment() {
        let timeline = Timeline::new(vec![
            Segment::new("long", 0.0, 9.0),
            Segment::new("short", 2.0, 3.0),
        ])
        .unwrap();
        assert_eq!(timeline.segments()[1].end_time, 3.0);
        assert_eq!(timeline.end_time(), Some(9.0));
        assert_eq!(Timeline::empty().end_time(), None);
    }
}
