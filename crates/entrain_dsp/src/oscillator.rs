//! Stereo Binaural Oscillator
//!
//! Pure synthesis: fills a block of stereo samples from `SharedRenderState`.
//! The left channel runs at the carrier frequency, the right at carrier +
//! beat; the listener perceives the difference as the beat.
//!
//! # Real-time Safety
//!
//! `render_*` is called from the audio callback. It takes the state mutex
//! exactly once per block, snapshots the parameters, and runs straight-line
//! arithmetic over the buffer - no allocation, no I/O, no per-sample locking.

use std::f32::consts::TAU;

use crate::state::{wrap_phase, SharedRenderState};

/// Block renderer for the dual-tone oscillator
///
/// Holds only the sample rate; all mutable state lives in
/// `SharedRenderState` so control-plane changes take effect on the next
/// block without restarting anything.
pub struct StereoOscillator {
    sample_rate: f32,
}

impl StereoOscillator {
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Render into separate left/right buffers
    ///
    /// Buffers must be the same length; the frame count is their length.
    /// Phases advance even while silent so an un-silenced oscillator
    /// continues mid-waveform instead of restarting.
    pub fn render_planar(&self, state: &SharedRenderState, left: &mut [f32], right: &mut [f32]) {
        debug_assert_eq!(left.len(), right.len());

        let mut guard = state.lock();
        let gain = guard.effective_volume();
        let left_inc = TAU * guard.carrier_hz / self.sample_rate;
        let right_inc = TAU * (guard.carrier_hz + guard.beat_hz) / self.sample_rate;
        let mut left_phase = guard.left_phase;
        let mut right_phase = guard.right_phase;

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            *l = left_phase.sin() * gain;
            *r = right_phase.sin() * gain;
            left_phase = wrap_phase(left_phase + left_inc);
            right_phase = wrap_phase(right_phase + right_inc);
        }

        guard.left_phase = left_phase;
        guard.right_phase = right_phase;
    }

    /// Render into an interleaved stereo buffer `[L0, R0, L1, R1, ...]`
    ///
    /// Overwrites the buffer. An odd trailing sample is left untouched.
    pub fn render_interleaved(&self, state: &SharedRenderState, buffer: &mut [f32]) {
        let mut guard = state.lock();
        let gain = guard.effective_volume();
        let left_inc = TAU * guard.carrier_hz / self.sample_rate;
        let right_inc = TAU * (guard.carrier_hz + guard.beat_hz) / self.sample_rate;
        let mut left_phase = guard.left_phase;
        let mut right_phase = guard.right_phase;

        for frame in buffer.chunks_exact_mut(2) {
            frame[0] = left_phase.sin() * gain;
            frame[1] = right_phase.sin() * gain;
            left_phase = wrap_phase(left_phase + left_inc);
            right_phase = wrap_phase(right_phase + right_inc);
        }

        guard.left_phase = left_phase;
        guard.right_phase = right_phase;
    }
}
