//! Decoded Audio Clips
//!
//! A clip is a fully decoded, interleaved-stereo f32 buffer. Decoding and
//! sample-rate conversion happen here, on the control plane, so the render
//! callback only ever walks an immutable slice.
//!
//! WAV is the supported container (lossy codecs are out of scope); mono
//! sources are upmixed by duplication, anything above two channels is
//! rejected.

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use crate::error::PlaybackError;

/// An immutable, decoded stereo clip
///
/// Cloning is cheap: the sample buffer is shared.
#[derive(Debug, Clone)]
pub struct AudioClip {
    samples: Arc<[f32]>,
    sample_rate: u32,
    frames: usize,
}

impl AudioClip {
    /// Decode a WAV file from disk
    pub fn from_wav_file(path: &Path) -> Result<Self, PlaybackError> {
        let reader = hound::WavReader::open(path).map_err(|err| PlaybackError::UnreadableSource {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        Self::from_reader(reader)
    }

    /// Decode WAV bytes already in memory
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self, PlaybackError> {
        let reader = hound::WavReader::new(Cursor::new(bytes))
            .map_err(|err| PlaybackError::DecodeFailed(err.to_string()))?;
        Self::from_reader(reader)
    }

    fn from_reader<R: std::io::Read>(mut reader: hound::WavReader<R>) -> Result<Self, PlaybackError> {
        let spec = reader.spec();
        if spec.channels == 0 || spec.channels > 2 {
            return Err(PlaybackError::UnsupportedFormat(format!(
                "{} channels (expected 1 or 2)",
                spec.channels
            )));
        }

        let raw: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|err| PlaybackError::DecodeFailed(err.to_string()))?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1_i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|value| value as f32 * scale))
                    .collect::<Result<_, _>>()
                    .map_err(|err| PlaybackError::DecodeFailed(err.to_string()))?
            }
        };

        let samples: Vec<f32> = if spec.channels == 1 {
            // Upmix mono by duplication
            raw.iter().flat_map(|&sample| [sample, sample]).collect()
        } else {
            raw
        };

        let frames = samples.len() / 2;
        Ok(Self {
            samples: samples.into(),
            sample_rate: spec.sample_rate,
            frames,
        })
    }

    /// Convert to the given rate with linear interpolation
    ///
    /// Returns a shared clone when the rate already matches. Quality is
    /// adequate for speech and tone clips; this is not a mastering
    /// resampler.
    pub fn resampled(&self, target_rate: u32) -> AudioClip {
        if target_rate == self.sample_rate || self.frames == 0 {
            return self.clone();
        }

        let ratio = self.sample_rate as f64 / target_rate as f64;
        let out_frames = (self.frames as f64 / ratio).round() as usize;
        let mut out = Vec::with_capacity(out_frames * 2);
        for i in 0..out_frames {
            let pos = i as f64 * ratio;
            let idx = (pos as usize).min(self.frames - 1);
            let next = (idx + 1).min(self.frames - 1);
            let frac = (pos - idx as f64) as f32;
            for ch in 0..2 {
                let a = self.samples[idx * 2 + ch];
                let b = self.samples[next * 2 + ch];
                out.push(a + (b - a) * frac);
            }
        }

        AudioClip {
            samples: out.into(),
            sample_rate: target_rate,
            frames: out_frames,
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / self.sample_rate as f64
    }

    /// Interleaved stereo samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub(crate) fn samples_arc(&self) -> Arc<[f32]> {
        Arc::clone(&self.samples)
    }
}
