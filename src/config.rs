use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, Result};

pub const CONFIG_ENV: &str = "DUBSYNC_CONFIG";

pub const DEFAULT_BASE_VOLUME: f32 = 0.2;
pub const DEFAULT_DUCK_FACTOR: f32 = 0.05;
pub const DEFAULT_SEEK_EPSILON_SECS: f64 = 0.5;
pub const DEFAULT_TICK_MS: u64 = 16;
pub const DEFAULT_EXPORT_SAMPLE_RATE: u32 = 24_000;
pub const DEFAULT_EXPORT_TAIL_SECS: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Gain of the original track while no dub source is sounding.
    pub base_volume: f32,
    /// Multiplier applied to `base_volume` while any dub source is sounding.
    pub duck_factor: f32,
    /// Tolerance before the cursor treats a later segment as a seek discontinuity.
    pub seek_epsilon_secs: f64,
    /// Driver cadence. One tick per display frame at 60Hz by default.
    pub tick_ms: u64,
    pub export_sample_rate: u32,
    /// Silence appended after the last segment when no export duration is given.
    pub export_tail_secs: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_volume: DEFAULT_BASE_VOLUME,
            duck_factor: DEFAULT_DUCK_FACTOR,
            seek_epsilon_secs: DEFAULT_SEEK_EPSILON_SECS,
            tick_ms: DEFAULT_TICK_MS,
            export_sample_rate: DEFAULT_EXPORT_SAMPLE_RATE,
            export_tail_secs: DEFAULT_EXPORT_TAIL_SECS,
        }
    }
}

impl EngineConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_json(&text)?;
        info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Reads the file named by `DUBSYNC_CONFIG`, or falls back to defaults.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.base_volume) {
            return Err(EngineError::Config(format!(
                "base_volume must be within [0, 1], got {}",
                self.base_volume
            )));
        }
        if !(0.0..=1.0).contains(&self.duck_factor) {
            return Err(EngineError::Config(format!(
                "duck_factor must be within [0, 1], got {}",
                self.duck_factor
            )));
        }
        if !self.seek_epsilon_secs.is_finite() || self.seek_epsilon_secs < 0.0 {
            return Err(EngineError::Config("seek_epsilon_secs must be >= 0".into()));
        }
        if self.tick_ms == 0 {
            return Err(EngineError::Config("tick_ms must be > 0".into()));
        }
        if self.export_sample_rate == 0 {
            return Err(EngineError::Config("export_sample_rate must be > 0".into()));
        }
        if !self.export_tail_secs.is_finite() || self.export_tail_secs < 0.0 {
            return Err(EngineError::Config("export_tail_secs must be >= 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "base_volume": 0.5 }"#).unwrap();
        assert_eq!(config.base_volume, 0.5);
        assert_eq!(config.export_sample_rate, DEFAULT_EXPORT_SAMPLE_RATE);
        assert_eq!(config.duck_factor, DEFAULT_DUCK_FACTOR);
    }

    #[test]
    fn rejects_zero_sample_rate() {
        let err = EngineConfig::from_json(r#"{ "export_sample_rate": 0 }"#).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }
}
