//! Entrain DSP - Binaural Synthesis Module
//!
//! This crate provides the synthesis core for Entrain, including:
//! - Phase-continuous dual-tone (binaural beat) oscillator
//! - Shared render state behind a single fast mutex
//! - Beat preset catalog (focus/relax/sleep)
//! - Zero-allocation render path
//!
//! # Architecture
//!
//! The render path follows a strict "no allocation in audio callback" rule.
//! The state mutex is taken once per block, never per sample; parameter
//! changes land on the next block boundary. Preset and volume changes never
//! touch the phase accumulators, so the waveform stays continuous.

mod error;
mod oscillator;
mod presets;
mod state;

pub use error::DspError;
pub use oscillator::StereoOscillator;
pub use presets::{BeatPreset, BEAT_PRESETS};
pub use state::{OscillatorState, SharedRenderState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_exports() {
        // Verify all public types are accessible
        let state = SharedRenderState::new(200.0).unwrap();
        let _osc = StereoOscillator::new(48_000.0);
        let _ = state.snapshot();
        assert_eq!(BEAT_PRESETS.len(), 4);
    }
}
