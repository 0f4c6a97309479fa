//! Render Graph
//!
//! The shared output graph: one oscillator node, one player node, one
//! master gain, mixed into an interleaved stereo block. This is the entire
//! body of the render callback.
//!
//! # Real-time Safety
//!
//! `render()` performs no allocation and no I/O. The oscillator takes its
//! state mutex once per block; the player `try_lock`s its slot; the master
//! gain is an atomic. Nothing here blocks.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use entrain_dsp::{SharedRenderState, StereoOscillator};

use crate::playback::PlayerNode;

/// Master output gain shared between the graph and the control plane
///
/// Stored as f32 bits (AtomicF32 doesn't exist, so bit-cast).
#[derive(Clone)]
pub struct MasterGain {
    bits: Arc<AtomicU32>,
}

impl MasterGain {
    pub fn new(initial: f32) -> Self {
        Self {
            bits: Arc::new(AtomicU32::new(initial.clamp(0.0, 1.0).to_bits())),
        }
    }

    /// Set the gain, clamped to `[0, 1]`; non-finite input mutes
    pub fn set(&self, gain: f32) {
        let clamped = if gain.is_finite() {
            gain.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.bits.store(clamped.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

impl Default for MasterGain {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// The mixed oscillator + player output graph
pub struct RenderGraph {
    oscillator: StereoOscillator,
    render_state: SharedRenderState,
    player: PlayerNode,
    master: MasterGain,
}

impl RenderGraph {
    pub fn new(
        sample_rate: f32,
        render_state: SharedRenderState,
        player: PlayerNode,
        master: MasterGain,
    ) -> Self {
        Self {
            oscillator: StereoOscillator::new(sample_rate),
            render_state,
            player,
            master,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.oscillator.sample_rate()
    }

    /// Fill one interleaved stereo block - the render callback body
    pub fn render(&mut self, buffer: &mut [f32]) {
        self.oscillator.render_interleaved(&self.render_state, buffer);
        self.player.mix_into(buffer);

        let gain = self.master.get();
        if (gain - 1.0).abs() > f32::EPSILON {
            for sample in buffer.iter_mut() {
                *sample *= gain;
            }
        }

        // Hard bound: the sum of tone and clip must never leave ±1.0
        for sample in buffer.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }
    }
}
