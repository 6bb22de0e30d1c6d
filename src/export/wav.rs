use std::fs;
use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use super::renderer::RenderedMix;
use crate::error::{EngineError, Result};

/// Standard 44-byte RIFF/WAVE header, mono 16-bit PCM, little-endian.
pub const HEADER_LEN: usize = 44;

/// Most 16-bit samples a RIFF size field (u32, excluding the first 8 bytes) can describe.
pub const MAX_SAMPLES: usize = ((u32::MAX as u64 - (HEADER_LEN as u64 - 8)) / 2) as usize;

pub fn spec_for(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

pub fn to_i16(sample: f32) -> i16 {
    (sample * 32767.0).clamp(-32768.0, 32767.0) as i16
}

pub fn encode_wav(mix: &RenderedMix) -> Result<Vec<u8>> {
    let failure = |e: hound::Error| EngineError::ExportFailure(format!("wav encoding: {e}"));

    let mut cursor = Cursor::new(Vec::with_capacity(HEADER_LEN + mix.samples.len() * 2));
    {
        let mut writer = WavWriter::new(&mut cursor, spec_for(mix.sample_rate)).map_err(failure)?;
        for &sample in &mix.samples {
            writer.write_sample(to_i16(sample)).map_err(failure)?;
        }
        writer.finalize().map_err(failure)?;
    }
    Ok(cursor.into_inner())
}

pub fn write_wav(path: impl AsRef<Path>, mix: &RenderedMix) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode_wav(mix)?;
    fs::write(path, bytes)
        .map_err(|e| EngineError::ExportFailure(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_saturates() {
        assert_eq!(to_i16(0.0), 0);
        assert_eq!(to_i16(1.0), 32767);
        assert_eq!(to_i16(2.0), 32767);
        assert_eq!(to_i16(-2.0), -32768);
    }
}
