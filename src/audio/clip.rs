use std::io::Cursor;
use std::sync::Arc;

use hound::{SampleFormat, WavReader};

use crate::error::{EngineError, Result};

/// Encoded clip as delivered by the synthesis collaborator.
///
/// `revision` increases every time the store replaces the entry, so a decode
/// started against an older revision can be recognised as stale.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipData {
    pub revision: u64,
    pub bytes: Arc<[u8]>,
}

/// Decoded mono PCM.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Linearly interpolated sample at `seconds` into the clip. Zero outside the clip.
    pub fn sample_at(&self, seconds: f64) -> f32 {
        if seconds < 0.0 || self.samples.is_empty() {
            return 0.0;
        }
        let pos = seconds * self.sample_rate as f64;
        let i = pos.floor() as usize;
        if i >= self.samples.len() {
            return 0.0;
        }
        let frac = (pos - i as f64) as f32;
        let a = self.samples[i];
        let b = self.samples.get(i + 1).copied().unwrap_or(0.0);
        a + (b - a) * frac
    }
}

/// Decodes a RIFF/WAVE clip into mono f32 samples, averaging channels.
pub fn decode_wav(segment_id: &str, bytes: &[u8]) -> Result<AudioClip> {
    let failure = |reason: String| EngineError::DecodeFailure {
        segment_id: segment_id.to_string(),
        reason,
    };

    let reader = WavReader::new(Cursor::new(bytes)).map_err(|e| failure(e.to_string()))?;
    let spec = reader.spec();
    if spec.channels == 0 || spec.sample_rate == 0 {
        return Err(failure(format!(
            "unsupported layout: {} channels at {}Hz",
            spec.channels, spec.sample_rate
        )));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| failure(e.to_string()))?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1) as u32)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| failure(e.to_string()))?
        }
    };

    let channels = spec.channels as usize;
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    Ok(AudioClip::new(samples, spec.sample_rate))
}
