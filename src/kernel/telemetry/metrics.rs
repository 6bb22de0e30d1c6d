use std::collections::VecDeque;

use super::event::TelemetryEvent;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetrySnapshot {
    pub source_stats: SourceStats,
    pub decode_stats: DecodeStats,
    pub transport_stats: TransportStats,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceStats {
    pub started: u64,
    pub finished: u64,
    /// Sources halted by stop-all rather than completing.
    pub force_stopped: u64,
    pub clamped: u64,
    pub avg_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeStats {
    pub requested: u64,
    pub failed: u64,
    pub stale_discarded: u64,
    pub abandoned: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportStats {
    pub segments_entered: u64,
    pub seeks: u64,
    pub stop_alls: u64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();
    let mut rate_sum = 0.0;

    for event in events {
        match event {
            TelemetryEvent::SegmentEntered { .. } => snap.transport_stats.segments_entered += 1,
            TelemetryEvent::DecodeRequested { .. } => snap.decode_stats.requested += 1,
            TelemetryEvent::StaleDecodeDiscarded { .. } => snap.decode_stats.stale_discarded += 1,
            TelemetryEvent::DecodeFailed { .. } => snap.decode_stats.failed += 1,
            TelemetryEvent::ScheduleAbandoned { .. } => snap.decode_stats.abandoned += 1,
            TelemetryEvent::SourceStarted { rate, clamped, .. } => {
                snap.source_stats.started += 1;
                rate_sum += rate;
                if *clamped {
                    snap.source_stats.clamped += 1;
                }
            }
            TelemetryEvent::SourceFinished { .. } => snap.source_stats.finished += 1,
            TelemetryEvent::AllStopped { stopped } => {
                snap.transport_stats.stop_alls += 1;
                snap.source_stats.force_stopped += *stopped as u64;
            }
            TelemetryEvent::Seek { .. } => snap.transport_stats.seeks += 1,
        }
    }

    if snap.source_stats.started > 0 {
        snap.source_stats.avg_rate = rate_sum / snap.source_stats.started as f64;
    }

    snap
}
