//! Playback Coordinator
//!
//! Schedules one decoded clip at a time into the player node and suspends
//! the caller until the clip ends. Starting a new clip preempts the old
//! one; the preempted caller is released with `Cancelled`, never an error.
//!
//! # Completion handoff
//!
//! The render callback detects the end of a clip and fires a single-shot
//! `oneshot` sender - the only signal crossing from the render thread into
//! the async domain. Exactly one of `Completed` / `Cancelled` reaches each
//! waiter.
//!
//! # Real-time Safety
//!
//! `PlayerNode::mix_into` runs in the render callback: it `try_lock`s the
//! clip slot (a contended block mixes silence rather than stalling), walks
//! an immutable sample buffer, and touches atomics. The clip's memory is
//! freed on the control plane, never in the callback.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

use crate::clip::AudioClip;
use crate::error::PlaybackError;

/// How a playback session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// The clip played to its end
    Completed,
    /// Released by `stop()` or preempted by a newer clip
    Cancelled,
}

/// State shared between the coordinator and the render-side node
struct PlayerShared {
    /// Render cursor in frames, for progress reporting
    position_frames: AtomicUsize,
    /// Length of the active clip in frames (0 when idle)
    total_frames: AtomicUsize,
    /// Paused: the node holds position and mixes nothing
    paused: AtomicBool,
    /// A clip is scheduled and not yet finished/stopped
    active: AtomicBool,
    /// Output gain, f32 bits (AtomicF32 doesn't exist, so bit-cast)
    volume_bits: AtomicU32,
}

impl PlayerShared {
    fn new() -> Self {
        Self {
            position_frames: AtomicUsize::new(0),
            total_frames: AtomicUsize::new(0),
            paused: AtomicBool::new(false),
            active: AtomicBool::new(false),
            volume_bits: AtomicU32::new(1.0_f32.to_bits()),
        }
    }

    fn volume(&self) -> f32 {
        f32::from_bits(self.volume_bits.load(Ordering::Relaxed))
    }
}

/// The in-flight playback session
struct ActiveClip {
    samples: Arc<[f32]>,
    cursor: usize,
    finished: bool,
    done: Option<oneshot::Sender<PlaybackOutcome>>,
}

/// Control-plane handle for clip playback
///
/// Clones share the same player slot; the orchestrator keeps one clone and
/// gives another to its interruption monitor.
#[derive(Clone)]
pub struct PlaybackCoordinator {
    slot: Arc<Mutex<Option<ActiveClip>>>,
    shared: Arc<PlayerShared>,
    graph_rate: u32,
}

impl PlaybackCoordinator {
    /// Create a coordinator rendering at the given graph sample rate
    pub fn new(graph_rate: u32) -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            shared: Arc::new(PlayerShared::new()),
            graph_rate,
        }
    }

    /// Render-side handle for the output graph
    pub fn node(&self) -> PlayerNode {
        PlayerNode {
            slot: Arc::clone(&self.slot),
            shared: Arc::clone(&self.shared),
        }
    }

    /// Decode and play a WAV file, suspending until it ends
    pub async fn play_file(&self, path: &std::path::Path) -> Result<PlaybackOutcome, PlaybackError> {
        let clip = AudioClip::from_wav_file(path)?;
        self.play_clip(clip).await
    }

    /// Decode and play in-memory WAV bytes, suspending until they end
    pub async fn play_data(&self, bytes: &[u8]) -> Result<PlaybackOutcome, PlaybackError> {
        let clip = AudioClip::from_wav_bytes(bytes)?;
        self.play_clip(clip).await
    }

    /// Schedule a decoded clip, suspending until it ends
    ///
    /// Any in-flight session is stopped first; its waiter resolves with
    /// `Cancelled`.
    pub async fn play_clip(&self, clip: AudioClip) -> Result<PlaybackOutcome, PlaybackError> {
        self.stop();

        let clip = clip.resampled(self.graph_rate);
        let (done_tx, done_rx) = oneshot::channel();
        {
            let mut slot = self.slot.lock();
            self.shared.total_frames.store(clip.frames(), Ordering::SeqCst);
            self.shared.position_frames.store(0, Ordering::SeqCst);
            self.shared.paused.store(false, Ordering::SeqCst);
            self.shared.active.store(true, Ordering::SeqCst);
            *slot = Some(ActiveClip {
                samples: clip.samples_arc(),
                cursor: 0,
                finished: false,
                done: Some(done_tx),
            });
        }
        debug!(frames = clip.frames(), "clip scheduled");

        let outcome = match done_rx.await {
            Ok(outcome) => outcome,
            // Sender dropped without a signal; treat as cancelled
            Err(_) => PlaybackOutcome::Cancelled,
        };
        self.clear_finished();
        Ok(outcome)
    }

    /// Stop the current session, releasing its waiter with `Cancelled`
    ///
    /// No-op when idle. Never an error: cancellation is a normal exit.
    pub fn stop(&self) {
        let mut slot = self.slot.lock();
        if let Some(mut clip) = slot.take() {
            if let Some(done) = clip.done.take() {
                let _ = done.send(PlaybackOutcome::Cancelled);
            }
            debug!("playback stopped");
        }
        self.shared.active.store(false, Ordering::SeqCst);
        self.shared.paused.store(false, Ordering::SeqCst);
        self.shared.total_frames.store(0, Ordering::SeqCst);
        self.shared.position_frames.store(0, Ordering::SeqCst);
    }

    /// Pause the current session; no-op when idle or already paused
    pub fn pause(&self) {
        if self.shared.active.load(Ordering::SeqCst) {
            self.shared.paused.store(true, Ordering::SeqCst);
        }
    }

    /// Resume a paused session; no-op otherwise
    pub fn resume(&self) {
        if self.shared.active.load(Ordering::SeqCst) {
            self.shared.paused.store(false, Ordering::SeqCst);
        }
    }

    /// Set playback gain, clamped to `[0, 1]`
    pub fn set_volume(&self, volume: f32) {
        let clamped = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.shared
            .volume_bits
            .store(clamped.to_bits(), Ordering::Relaxed);
    }

    pub fn volume(&self) -> f32 {
        self.shared.volume()
    }

    /// Whether a clip is scheduled and not paused
    pub fn is_playing(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst) && !self.shared.paused.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst) && self.shared.paused.load(Ordering::SeqCst)
    }

    /// Elapsed time of the current clip in seconds
    pub fn position_seconds(&self) -> f64 {
        self.shared.position_frames.load(Ordering::Relaxed) as f64 / self.graph_rate as f64
    }

    /// Duration of the current clip in seconds (0 when idle)
    pub fn duration_seconds(&self) -> f64 {
        self.shared.total_frames.load(Ordering::Relaxed) as f64 / self.graph_rate as f64
    }

    /// Progress in `[0, 1]`; 0 when no clip is scheduled
    pub fn progress(&self) -> f64 {
        let total = self.shared.total_frames.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        let position = self.shared.position_frames.load(Ordering::Relaxed);
        (position as f64 / total as f64).min(1.0)
    }

    /// Drop a clip the render side already finished and report idle
    fn clear_finished(&self) {
        let mut slot = self.slot.lock();
        if slot.as_ref().is_some_and(|clip| clip.finished) {
            *slot = None;
            self.shared.paused.store(false, Ordering::SeqCst);
            self.shared.total_frames.store(0, Ordering::SeqCst);
            self.shared.position_frames.store(0, Ordering::SeqCst);
        }
    }
}

/// Render-side player node
///
/// Owned by the output graph; mixes the active clip into the output block.
pub struct PlayerNode {
    slot: Arc<Mutex<Option<ActiveClip>>>,
    shared: Arc<PlayerShared>,
}

impl PlayerNode {
    /// Mix the active clip into an interleaved stereo block
    ///
    /// Called from the render callback. Adds into the buffer (the
    /// oscillator has already written it). On the last frame, signals the
    /// waiter exactly once and marks the clip finished; the control plane
    /// frees it later.
    pub fn mix_into(&self, buffer: &mut [f32]) {
        let Some(mut slot) = self.slot.try_lock() else {
            // Control plane holds the slot; skip this block rather than wait
            return;
        };
        let Some(clip) = slot.as_mut() else {
            return;
        };
        if clip.finished || self.shared.paused.load(Ordering::Relaxed) {
            return;
        }

        let volume = self.shared.volume();
        let total_frames = clip.samples.len() / 2;
        for frame in buffer.chunks_exact_mut(2) {
            if clip.cursor >= total_frames {
                break;
            }
            let idx = clip.cursor * 2;
            frame[0] += clip.samples[idx] * volume;
            frame[1] += clip.samples[idx + 1] * volume;
            clip.cursor += 1;
        }
        self.shared
            .position_frames
            .store(clip.cursor, Ordering::Relaxed);

        if clip.cursor >= total_frames {
            clip.finished = true;
            self.shared.active.store(false, Ordering::SeqCst);
            if let Some(done) = clip.done.take() {
                let _ = done.send(PlaybackOutcome::Completed);
            }
        }
    }
}
