//! Entrain Core - Audio Engine
//!
//! This crate composes the Entrain audio engine:
//! - Top-level orchestration (start/stop, binaural control, ducking,
//!   interruption recovery)
//! - Single-session clip playback with async completion
//! - The render graph and output transport (via CPAL)
//! - WAV clip decoding and the on-disk clip store
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                     Control Plane (async)                  │
//! │  App ──calls──▶ AudioOrchestrator ◀──events── monitor task │
//! └────────────────────────────────────────────────────────────┘
//!                 │ mutex / atomics / oneshot
//!                 ▼
//! ┌────────────────────────────────────────────────────────────┐
//! │                      Audio Thread                          │
//! │   Oscillator ──▶ mix ◀── PlayerNode      (RenderGraph)     │
//! │              (Zero allocation in this path)                │
//! └────────────────────────────────────────────────────────────┘
//! ```

mod clip;
mod config;
mod error;
mod events;
mod graph;
mod orchestrator;
mod output;
mod playback;
mod store;

pub use clip::AudioClip;
pub use config::{EngineConfig, StreamConfig};
pub use error::{EngineError, EngineResult, PlaybackError};
pub use events::EngineEvent;
pub use graph::{MasterGain, RenderGraph};
pub use orchestrator::AudioOrchestrator;
pub use output::{CpalOutput, MockOutput, MockOutputHandle, NullOutput, OutputBackend};
pub use playback::{PlaybackCoordinator, PlaybackOutcome, PlayerNode};
pub use store::{ClipStore, DirStore};

// Re-export the synthesis and session types the public API speaks in
pub use entrain_dsp::{BeatPreset, SharedRenderState, StereoOscillator, BEAT_PRESETS};
pub use entrain_session::{
    InterruptionEvent, SessionCategory, SessionEvent, SessionManager, SessionState,
};
