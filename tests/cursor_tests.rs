use dubsync::timeline::{Segment, SegmentCursor, Timeline};

fn timeline(spans: &[(f64, f64)]) -> Timeline {
    Timeline::new(
        spans
            .iter()
            .enumerate()
            .map(|(i, (s, e))| Segment::new(format!("s{i}"), *s, *e))
            .collect(),
    )
    .unwrap()
}

fn brute_force(segments: &[Segment], t: f64) -> Option<usize> {
    segments.iter().position(|s| s.contains(t))
}

/// Small deterministic LCG so the seek pattern is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self, max: f64) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 11) as f64 / (1u64 << 53) as f64) * max
    }
}

#[test]
fn test_monotonic_playback_matches_brute_force() {
    let tl = timeline(&[(0.0, 1.0), (1.0, 2.5), (3.0, 4.0), (4.2, 4.3), (6.0, 9.0)]);
    let mut cursor = SegmentCursor::new(0.5);

    // 1. Walk at 60Hz-ish steps through the whole timeline and past its end
    let mut t = 0.0;
    while t < 10.0 {
        assert_eq!(
            cursor.locate(tl.segments(), t),
            brute_force(tl.segments(), t),
            "mismatch at t={t}"
        );
        t += 0.016;
    }
}

#[test]
fn test_random_seeks_match_brute_force() {
    let layouts: [&[(f64, f64)]; 3] = [
        // adjacent
        &[(0.0, 2.0), (2.0, 4.0), (4.0, 6.0), (6.0, 8.0)],
        // gapped
        &[(0.5, 1.0), (1.4, 1.6), (3.0, 3.2), (7.0, 9.5)],
        // mixed, with gaps shorter than the seek tolerance
        &[(0.0, 0.3), (0.4, 0.8), (0.9, 5.0), (5.1, 5.2), (8.0, 8.1)],
    ];

    for (n, spans) in layouts.iter().enumerate() {
        let tl = timeline(spans);
        let mut cursor = SegmentCursor::new(0.5);
        let mut rng = Lcg(42 + n as u64);

        for _ in 0..2_000 {
            let t = rng.next_f64(11.0) - 0.5;
            assert_eq!(
                cursor.locate(tl.segments(), t),
                brute_force(tl.segments(), t),
                "layout {n} mismatch at t={t}"
            );
        }
    }
}

#[test]
fn test_short_jumps_both_directions() {
    let tl = timeline(&[(0.0, 1.0), (1.2, 2.0), (2.1, 3.0)]);
    let mut cursor = SegmentCursor::new(0.5);

    // 1. Settle in the last segment
    assert_eq!(cursor.locate(tl.segments(), 2.5), Some(2));

    // 2. Jump back by less than the tolerance, into the gap
    assert_eq!(cursor.locate(tl.segments(), 2.05), None);

    // 3. Jump back into the previous segment
    assert_eq!(cursor.locate(tl.segments(), 1.9), Some(1));

    // 4. And forward again over a gap
    assert_eq!(cursor.locate(tl.segments(), 2.2), Some(2));
}

#[test]
fn test_shared_boundary_belongs_to_earlier_segment() {
    let tl = timeline(&[(0.0, 1.0), (1.0, 2.0)]);
    let mut cursor = SegmentCursor::new(0.5);

    assert_eq!(cursor.locate(tl.segments(), 1.5), Some(1));
    assert_eq!(cursor.locate(tl.segments(), 1.0), Some(0));
}

#[test]
fn test_overlap_keeps_earlier_segment_until_it_ends() {
    let tl = timeline(&[(0.0, 5.0), (4.0, 8.0)]);
    let mut cursor = SegmentCursor::new(0.5);

    assert_eq!(cursor.locate(tl.segments(), 3.0), Some(0));
    assert_eq!(cursor.locate(tl.segments(), 4.5), Some(0));
    assert_eq!(cursor.locate(tl.segments(), 5.5), Some(1));
}

#[test]
fn test_unsorted_input_is_located_by_start_order() {
    let tl = Timeline::new(vec![
        Segment::new("late", 5.0, 6.0),
        Segment::new("early", 1.0, 2.0),
    ])
    .unwrap();
    let mut cursor = SegmentCursor::new(0.5);

    let idx = cursor.locate(tl.segments(), 1.5).unwrap();
    assert_eq!(tl.segments()[idx].id, "early");
    let idx = cursor.locate(tl.segments(), 5.5).unwrap();
    assert_eq!(tl.segments()[idx].id, "late");
}
