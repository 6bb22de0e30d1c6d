mod common;

use std::sync::Arc;

use common::{decode_requests, gains, playing, reactor_with, started, wav_bytes};
use dubsync::audio::decode_wav;
use dubsync::kernel::event::{Event, TransportEvent};
use dubsync::kernel::scheduler::SideEffect;

const BASE: f32 = 0.2;
const DUCKED: f32 = 0.2 * 0.05;

/// Enters the segment at `media`, resolves its decode, returns the started handle.
fn start(reactor: &mut dubsync::Reactor, media: f64, ctx: f64) -> dubsync::kernel::sources::SourceHandle {
    let out = reactor.tick_step(playing(media, ctx), vec![]);
    let (ticket, bytes) = decode_requests(&out.effects)[0].clone();
    let outcome = decode_wav(&ticket.segment_id, &bytes).map(Arc::new);
    let out = reactor.tick_step(
        playing(media + 0.01, ctx + 0.01),
        vec![Event::DecodeResolved(ticket, outcome)],
    );
    started(&out.effects)[0].0
}

#[tokio::test]
async fn test_ducks_while_source_sounds_and_restores_on_completion() {
    let (mut reactor, _tx) = reactor_with(&[("s1", 0.0, 1.0)]);
    reactor.clips.complete("s1", wav_bytes(1.0, 0.5));
    assert_eq!(reactor.original_gain(), BASE);

    // 1. Source starts: duck
    start(&mut reactor, 0.0, 0.0);
    assert_eq!(reactor.original_gain(), DUCKED);

    // 2. Mid-clip: unchanged, and no redundant gain effect
    let out = reactor.tick_step(playing(0.5, 0.5), vec![]);
    assert!(gains(&out.effects).is_empty());
    assert_eq!(reactor.original_gain(), DUCKED);

    // 3. Natural end reached on the context clock: restore
    let out = reactor.tick_step(playing(1.02, 1.02), vec![]);
    assert_eq!(gains(&out.effects), vec![BASE]);
    assert_eq!(reactor.state.active_source_count(), 0);
    assert_eq!(reactor.telemetry.snapshot().source_stats.finished, 1);
}

#[tokio::test]
async fn test_two_sources_duck_until_both_end() {
    let (mut reactor, _tx) = reactor_with(&[("s1", 0.0, 1.0), ("s2", 1.0, 2.0)]);
    reactor.clips.complete("s1", wav_bytes(1.3, 0.5));
    reactor.clips.complete("s2", wav_bytes(1.0, 0.5));

    start(&mut reactor, 0.0, 0.0);
    let second = start(&mut reactor, 1.05, 1.05);
    assert_eq!(reactor.state.active_source_count(), 2);

    // 1. s1 ends (~1.19s) while s2 is still sounding: stay ducked
    let out = reactor.tick_step(playing(1.25, 1.25), vec![]);
    assert_eq!(reactor.state.active_source_count(), 1);
    assert!(gains(&out.effects).is_empty());
    assert_eq!(reactor.original_gain(), DUCKED);

    // 2. Host reports s2 ended early: restore
    let out = reactor.tick_step(playing(1.3, 1.3), vec![Event::SourceEnded(second)]);
    assert_eq!(gains(&out.effects), vec![BASE]);

    // 3. A duplicate end report is harmless
    let out = reactor.tick_step(playing(1.35, 1.35), vec![Event::SourceEnded(second)]);
    assert!(out.effects.is_empty());
    assert_eq!(reactor.telemetry.snapshot().source_stats.finished, 2);
}

#[tokio::test]
async fn test_stop_all_restores_and_is_idempotent() {
    let (mut reactor, _tx) = reactor_with(&[("s1", 0.0, 4.0)]);
    reactor.clips.complete("s1", wav_bytes(4.0, 0.5));
    start(&mut reactor, 0.0, 0.0);

    // 1. Stop: one StopSource, gain back to base
    let out = reactor.tick_step(playing(0.5, 0.5), vec![Event::Transport(TransportEvent::Stop)]);
    let stops = out.effects.iter().filter(|e| matches!(e, SideEffect::StopSource(_))).count();
    assert_eq!(stops, 1);
    assert_eq!(reactor.original_gain(), BASE);

    // 2. Nothing sounding: stop-all again emits nothing
    let effects = reactor.halt();
    assert!(effects.is_empty());
    assert_eq!(reactor.original_gain(), BASE);

    let snap = reactor.telemetry.snapshot();
    assert_eq!(snap.transport_stats.stop_alls, 1);
    assert_eq!(snap.source_stats.force_stopped, 1);
}

#[tokio::test]
async fn test_base_volume_change_applies_immediately() {
    let (mut reactor, _tx) = reactor_with(&[("s1", 0.0, 4.0)]);
    reactor.clips.complete("s1", wav_bytes(4.0, 0.5));

    // 1. Idle: the new base is the gain
    let out = reactor.tick_step(playing(5.0, 0.0), vec![Event::BaseVolumeChanged(0.6)]);
    assert_eq!(gains(&out.effects), vec![0.6]);

    // 2. While ducked: the ducked level follows the new base
    let out = reactor.tick_step(playing(0.0, 0.2), vec![Event::Transport(TransportEvent::Seek(0.0))]);
    let (ticket, bytes) = decode_requests(&out.effects)[0].clone();
    let outcome = decode_wav(&ticket.segment_id, &bytes).map(Arc::new);
    reactor.tick_step(playing(0.01, 0.21), vec![Event::DecodeResolved(ticket, outcome)]);
    assert_eq!(reactor.original_gain(), 0.6 * 0.05);

    let out = reactor.tick_step(playing(0.1, 0.3), vec![Event::BaseVolumeChanged(0.4)]);
    assert_eq!(gains(&out.effects), vec![0.4 * 0.05]);

    // 3. Out-of-range input is clamped
    reactor.tick_step(playing(0.2, 0.4), vec![Event::BaseVolumeChanged(3.0)]);
    assert_eq!(reactor.scheduler.ducking().base_volume(), 1.0);
}

#[tokio::test]
async fn test_teardown_silences_everything() {
    let (mut reactor, _tx) = reactor_with(&[("s1", 0.0, 4.0)]);
    reactor.clips.complete("s1", wav_bytes(4.0, 0.5));
    start(&mut reactor, 0.0, 0.0);

    let out = reactor.tick_step(playing(0.5, 0.5), vec![Event::Teardown]);
    assert!(out.effects.iter().any(|e| matches!(e, SideEffect::StopSource(_))));
    assert_eq!(reactor.original_gain(), BASE);
    assert_eq!(reactor.state.active_source_count(), 0);
}
