//! Shared Render State
//!
//! The single piece of state shared between the real-time render callback
//! and the control plane: tone frequencies, volume, per-channel phase
//! accumulators, and the playing flag.
//!
//! # Synchronization
//!
//! All access goes through one `parking_lot::Mutex`, acquired once per
//! render block by the oscillator and briefly by the control-plane setters.
//! No other access path to the fields exists. Setters validate before
//! storing so the render path never has to branch on bad input.

use std::f32::consts::TAU;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::error::DspError;

/// Oscillator parameters and phase accumulators
///
/// Phases are radians in `[0, 2π)`, advanced every render block and wrapped
/// on overflow. Only `stop()` on the owning handle may zero them.
#[derive(Debug, Clone, Copy)]
pub struct OscillatorState {
    pub(crate) carrier_hz: f32,
    pub(crate) beat_hz: f32,
    pub(crate) volume: f32,
    pub(crate) left_phase: f32,
    pub(crate) right_phase: f32,
    pub(crate) playing: bool,
}

impl OscillatorState {
    fn new(carrier_hz: f32) -> Self {
        Self {
            carrier_hz,
            beat_hz: 0.0,
            volume: 1.0,
            left_phase: 0.0,
            right_phase: 0.0,
            playing: false,
        }
    }

    /// Left channel frequency in Hz
    pub fn left_frequency(&self) -> f32 {
        self.carrier_hz
    }

    /// Right channel frequency in Hz (carrier + beat)
    pub fn right_frequency(&self) -> f32 {
        self.carrier_hz + self.beat_hz
    }

    /// Gain applied per sample: the stored volume while playing, else 0
    pub fn effective_volume(&self) -> f32 {
        if self.playing {
            self.volume
        } else {
            0.0
        }
    }

    pub fn left_phase(&self) -> f32 {
        self.left_phase
    }

    pub fn right_phase(&self) -> f32 {
        self.right_phase
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn beat_hz(&self) -> f32 {
        self.beat_hz
    }

    pub fn carrier_hz(&self) -> f32 {
        self.carrier_hz
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }
}

/// Wrap a phase accumulator back into `[0, 2π)`
///
/// Increments are normally far below 2π, so a single subtraction is the
/// common case; the modulo only runs for pathological frequency/rate ratios.
#[inline]
pub(crate) fn wrap_phase(phase: f32) -> f32 {
    if phase >= TAU {
        let wrapped = phase - TAU;
        if wrapped >= TAU {
            wrapped % TAU
        } else {
            wrapped
        }
    } else {
        phase
    }
}

/// Handle owning the oscillator state mutex
///
/// Cloning is cheap (`Arc`); the clone given to the render graph and the
/// clone held by the orchestrator refer to the same state block.
#[derive(Clone)]
pub struct SharedRenderState {
    inner: Arc<Mutex<OscillatorState>>,
}

impl SharedRenderState {
    /// Create state for the given carrier frequency
    ///
    /// # Errors
    /// Rejects non-finite or negative carriers before they can reach the
    /// render callback.
    pub fn new(carrier_hz: f32) -> Result<Self, DspError> {
        validate_frequency(carrier_hz)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(OscillatorState::new(carrier_hz))),
        })
    }

    /// Lock for a render block (crate-internal: only the oscillator renders)
    pub(crate) fn lock(&self) -> MutexGuard<'_, OscillatorState> {
        self.inner.lock()
    }

    /// Begin (or retune) playback with the given beat frequency
    ///
    /// Writes only `beat_hz` and `playing`; the phase accumulators continue
    /// from wherever the previous block left them, so the waveform bends
    /// instead of clicking.
    pub fn start(&self, beat_hz: f32) -> Result<(), DspError> {
        validate_frequency(beat_hz)?;
        let mut state = self.inner.lock();
        state.beat_hz = beat_hz;
        state.playing = true;
        Ok(())
    }

    /// Change the beat frequency without touching phase or playing state
    pub fn set_beat_hz(&self, beat_hz: f32) -> Result<(), DspError> {
        validate_frequency(beat_hz)?;
        self.inner.lock().beat_hz = beat_hz;
        Ok(())
    }

    /// Change the carrier frequency without touching phase
    pub fn set_carrier_hz(&self, carrier_hz: f32) -> Result<(), DspError> {
        validate_frequency(carrier_hz)?;
        self.inner.lock().carrier_hz = carrier_hz;
        Ok(())
    }

    /// Set output volume, clamped to `[0, 1]`
    ///
    /// # Errors
    /// Non-finite values are rejected rather than clamped.
    pub fn set_volume(&self, volume: f32) -> Result<(), DspError> {
        if !volume.is_finite() {
            return Err(DspError::InvalidVolume(volume));
        }
        self.inner.lock().volume = volume.clamp(0.0, 1.0);
        Ok(())
    }

    /// Silence output without resetting phase (interruption handling)
    pub fn set_playing(&self, playing: bool) {
        self.inner.lock().playing = playing;
    }

    /// Stop and reset: the only operation permitted to zero the phases
    pub fn stop(&self) {
        let mut state = self.inner.lock();
        state.playing = false;
        state.beat_hz = 0.0;
        state.left_phase = 0.0;
        state.right_phase = 0.0;
    }

    /// Copy of the current state (control-plane reads, tests)
    pub fn snapshot(&self) -> OscillatorState {
        *self.inner.lock()
    }

    pub fn volume(&self) -> f32 {
        self.inner.lock().volume
    }

    pub fn is_playing(&self) -> bool {
        self.inner.lock().playing
    }
}

fn validate_frequency(hz: f32) -> Result<(), DspError> {
    if !hz.is_finite() || hz < 0.0 {
        return Err(DspError::InvalidFrequency(hz));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let shared = SharedRenderState::new(200.0).unwrap();
        let state = shared.snapshot();
        assert_eq!(state.carrier_hz(), 200.0);
        assert_eq!(state.beat_hz(), 0.0);
        assert_eq!(state.volume(), 1.0);
        assert_eq!(state.left_phase(), 0.0);
        assert_eq!(state.right_phase(), 0.0);
        assert!(!state.is_playing());
    }

    #[test]
    fn test_volume_clamps_to_unit_range() {
        let shared = SharedRenderState::new(200.0).unwrap();

        shared.set_volume(-0.5).unwrap();
        assert_eq!(shared.volume(), 0.0);

        shared.set_volume(1.5).unwrap();
        assert_eq!(shared.volume(), 1.0);

        shared.set_volume(0.3).unwrap();
        assert_eq!(shared.volume(), 0.3);
    }

    #[test]
    fn test_non_finite_inputs_rejected() {
        let shared = SharedRenderState::new(200.0).unwrap();

        assert!(shared.set_volume(f32::NAN).is_err());
        assert!(shared.set_beat_hz(f32::INFINITY).is_err());
        assert!(shared.set_carrier_hz(f32::NAN).is_err());
        assert!(SharedRenderState::new(f32::NAN).is_err());
        assert!(SharedRenderState::new(-10.0).is_err());

        // Rejected values must not have leaked into the state
        assert_eq!(shared.volume(), 1.0);
        assert_eq!(shared.snapshot().beat_hz(), 0.0);
    }

    #[test]
    fn test_start_sets_only_beat_and_playing() {
        let shared = SharedRenderState::new(200.0).unwrap();

        shared.start(14.0).unwrap();
        let state = shared.snapshot();
        assert!(state.is_playing());
        assert_eq!(state.beat_hz(), 14.0);
        assert_eq!(state.left_phase(), 0.0);
        assert_eq!(state.right_phase(), 0.0);
    }

    #[test]
    fn test_right_frequency_is_carrier_plus_beat() {
        let shared = SharedRenderState::new(200.0).unwrap();

        shared.start(14.0).unwrap();
        assert_eq!(shared.snapshot().right_frequency(), 214.0);

        shared.set_beat_hz(6.0).unwrap();
        assert_eq!(shared.snapshot().right_frequency(), 206.0);
    }

    #[test]
    fn test_stop_zeroes_phase() {
        let shared = SharedRenderState::new(200.0).unwrap();
        shared.start(10.0).unwrap();

        // Simulate the render side having advanced phase
        {
            let mut guard = shared.lock();
            guard.left_phase = 1.0;
            guard.right_phase = 2.0;
        }

        shared.stop();
        let state = shared.snapshot();
        assert!(!state.is_playing());
        assert_eq!(state.beat_hz(), 0.0);
        assert_eq!(state.left_phase(), 0.0);
        assert_eq!(state.right_phase(), 0.0);
    }

    #[test]
    fn test_effective_volume_zero_when_silent() {
        let shared = SharedRenderState::new(200.0).unwrap();
        shared.set_volume(0.8).unwrap();

        assert_eq!(shared.snapshot().effective_volume(), 0.0);

        shared.start(10.0).unwrap();
        assert_eq!(shared.snapshot().effective_volume(), 0.8);

        shared.set_playing(false);
        assert_eq!(shared.snapshot().effective_volume(), 0.0);
    }

    #[test]
    fn test_wrap_phase() {
        assert_eq!(wrap_phase(1.0), 1.0);
        assert!(wrap_phase(TAU) < TAU);
        assert!(wrap_phase(TAU + 0.5) - 0.5 < 1e-6);
        // Pathological overshoot still lands in range
        let wrapped = wrap_phase(10.0 * TAU + 0.25);
        assert!((0.0..TAU).contains(&wrapped));
    }
}
