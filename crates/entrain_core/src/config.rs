//! Engine and Stream Configuration

use serde::{Deserialize, Serialize};

/// Audio stream configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Sample rate in Hz (e.g., 44100, 48000, 96000)
    pub sample_rate: u32,

    /// Number of audio channels (the engine renders stereo)
    pub channels: u16,

    /// Buffer size in frames (lower = less latency, higher = more stability)
    pub buffer_size: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channels: 2,
            buffer_size: 512,
        }
    }
}

impl StreamConfig {
    /// Calculate latency in milliseconds for this configuration
    pub fn latency_ms(&self) -> f32 {
        (self.buffer_size as f32 / self.sample_rate as f32) * 1000.0
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate < 8000 || self.sample_rate > 192_000 {
            return Err(format!("Invalid sample rate: {}", self.sample_rate));
        }
        if self.channels != 2 {
            return Err(format!(
                "Engine renders stereo only, got {} channels",
                self.channels
            ));
        }
        if self.buffer_size < 32 || self.buffer_size > 8192 {
            return Err(format!("Invalid buffer size: {}", self.buffer_size));
        }
        Ok(())
    }
}

/// Overall engine configuration
///
/// The tone and ducking constants are policy, not algorithmic truth; they
/// live here so deployments can tune them without touching synthesis code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Stream configuration
    pub stream: StreamConfig,

    /// Left-channel (carrier) tone frequency in Hz
    pub carrier_hz: f32,

    /// Default binaural output volume, 0.0 - 1.0
    pub binaural_volume: f32,

    /// Gain multiplier applied to the binaural tone while a clip plays
    pub ducking_factor: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stream: StreamConfig::default(),
            carrier_hz: 200.0,
            binaural_volume: 0.5,
            ducking_factor: 0.3,
        }
    }
}

impl EngineConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        self.stream.validate()?;
        let nyquist = self.stream.sample_rate as f32 / 2.0;
        if !self.carrier_hz.is_finite() || self.carrier_hz <= 0.0 || self.carrier_hz >= nyquist {
            return Err(format!("Invalid carrier frequency: {}", self.carrier_hz));
        }
        if !(0.0..=1.0).contains(&self.binaural_volume) {
            return Err(format!("Invalid binaural volume: {}", self.binaural_volume));
        }
        if !(0.0..=1.0).contains(&self.ducking_factor) {
            return Err(format!("Invalid ducking factor: {}", self.ducking_factor));
        }
        Ok(())
    }
}
