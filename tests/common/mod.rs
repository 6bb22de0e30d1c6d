#![allow(dead_code)]

use std::io::Cursor;

use dubsync::kernel::scheduler::SideEffect;
use dubsync::kernel::time::ClockReading;
use dubsync::timeline::{Segment, Timeline};
use dubsync::{EngineConfig, Reactor};
use hound::{SampleFormat, WavSpec, WavWriter};
use tokio::sync::mpsc;

pub const CLIP_RATE: u32 = 24_000;

/// Mono 16-bit WAV of constant `level` lasting `secs`.
pub fn wav_bytes(secs: f64, level: f32) -> Vec<u8> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: CLIP_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
        let n = (secs * CLIP_RATE as f64).round() as usize;
        for _ in 0..n {
            writer.write_sample((level * 32767.0) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

pub fn timeline(spans: &[(&str, f64, f64)]) -> Timeline {
    Timeline::new(
        spans
            .iter()
            .map(|(id, s, e)| Segment::new(*id, *s, *e).with_text("orig", "dub"))
            .collect(),
    )
    .unwrap()
}

pub fn reactor_with(spans: &[(&str, f64, f64)]) -> (Reactor, mpsc::Sender<dubsync::kernel::event::Event>) {
    let (tx, rx) = mpsc::channel(100);
    let mut reactor = Reactor::new(rx, tx.clone(), EngineConfig::default());
    reactor.replace_timeline(timeline(spans));
    (reactor, tx)
}

pub fn playing(media: f64, context: f64) -> ClockReading {
    ClockReading::playing(media, context)
}

pub fn paused(media: f64, context: f64) -> ClockReading {
    ClockReading::paused(media, context)
}

pub fn decode_requests(effects: &[SideEffect]) -> Vec<(dubsync::kernel::event::DecodeTicket, std::sync::Arc<[u8]>)> {
    effects
        .iter()
        .filter_map(|e| match e {
            SideEffect::RequestDecode { ticket, bytes } => Some((ticket.clone(), bytes.clone())),
            _ => None,
        })
        .collect()
}

pub fn started(effects: &[SideEffect]) -> Vec<(dubsync::kernel::sources::SourceHandle, String, dubsync::kernel::plan::PlaybackPlan)> {
    effects
        .iter()
        .filter_map(|e| match e {
            SideEffect::StartSource { handle, segment_id, plan, .. } => Some((*handle, segment_id.clone(), *plan)),
            _ => None,
        })
        .collect()
}

pub fn gains(effects: &[SideEffect]) -> Vec<f32> {
    effects
        .iter()
        .filter_map(|e| match e {
            SideEffect::SetOriginalGain(g) => Some(*g),
            _ => None,
        })
        .collect()
}
