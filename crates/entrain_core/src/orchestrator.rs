//! Audio Orchestrator
//!
//! The composition root: owns the session lifecycle, the render graph, the
//! binaural oscillator state, and clip playback, and enforces the policies
//! that cut across them - auto-start, gain ducking around playback, and
//! interruption recovery.
//!
//! # Architecture
//!
//! ```text
//! Application ──calls──▶ AudioOrchestrator
//!                          │ configure/activate   SessionManager ──events──┐
//!                          │ attach graph         OutputBackend            │
//!                          │ schedule clips       PlaybackCoordinator      │
//!                          ▼                                               │
//!                    SharedRenderState ◀── monitor task ◀──────────────────┘
//! ```
//!
//! All methods take `&self`; the orchestrator is internally synchronized
//! and clones of its shared pieces are handed to the interruption monitor.
//! Control-plane calls are expected to be serialized by the caller (one
//! playback session at a time); the engine protects its invariants either
//! way.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use entrain_dsp::{BeatPreset, SharedRenderState};
use entrain_session::{InterruptionEvent, SessionCategory, SessionEvent, SessionManager};

use crate::clip::AudioClip;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult, PlaybackError};
use crate::events::EngineEvent;
use crate::graph::{MasterGain, RenderGraph};
use crate::output::{CpalOutput, OutputBackend};
use crate::playback::{PlaybackCoordinator, PlaybackOutcome};
use crate::store::{ClipStore, DirStore};

/// Capacity of the engine event channel
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Orchestrator-level state, separate from the render state
#[derive(Debug)]
struct EngineState {
    is_running: bool,
    current_preset: Option<BeatPreset>,
    /// Baseline binaural volume, retained across ducking so it can be
    /// restored exactly
    binaural_volume: f32,
    /// Whether a playback session currently holds the tone ducked
    ducked: bool,
}

/// Top-level audio engine controller
pub struct AudioOrchestrator {
    config: EngineConfig,
    session: Arc<Mutex<SessionManager>>,
    playback: PlaybackCoordinator,
    render_state: SharedRenderState,
    master: MasterGain,
    output: Mutex<Box<dyn OutputBackend>>,
    store: Box<dyn ClipStore>,
    state: Arc<Mutex<EngineState>>,
    events: broadcast::Sender<EngineEvent>,
    monitor: Mutex<Option<JoinHandle<()>>>,
}

impl AudioOrchestrator {
    /// Create an orchestrator from explicit collaborators
    pub fn new(
        config: EngineConfig,
        session: SessionManager,
        output: Box<dyn OutputBackend>,
        store: Box<dyn ClipStore>,
    ) -> EngineResult<Self> {
        config.validate().map_err(EngineError::Config)?;
        let render_state = SharedRenderState::new(config.carrier_hz)?;
        render_state.set_volume(config.binaural_volume)?;
        let playback = PlaybackCoordinator::new(config.stream.sample_rate);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            state: Arc::new(Mutex::new(EngineState {
                is_running: false,
                current_preset: None,
                binaural_volume: config.binaural_volume,
                ducked: false,
            })),
            session: Arc::new(Mutex::new(session)),
            playback,
            render_state,
            master: MasterGain::default(),
            output: Mutex::new(output),
            store,
            events,
            monitor: Mutex::new(None),
            config,
        })
    }

    /// Create an orchestrator on the host audio stack and user cache
    pub fn with_defaults() -> EngineResult<Self> {
        let config = EngineConfig::default();
        let session = SessionManager::with_system_backend();
        let output = Box::new(CpalOutput::new(config.stream.clone()));
        let store = Box::new(DirStore::in_user_cache()?);
        Self::new(config, session, output, store)
    }

    /// Subscribe to engine events
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Bring the engine up; no-op when already running
    ///
    /// Sequence: configure session, activate it, attach the render graph,
    /// start the output. Any failure unwinds (session deactivated
    /// best-effort) and leaves the engine not running - never half started.
    ///
    /// Must be called from within a Tokio runtime; the interruption monitor
    /// is spawned onto it.
    pub fn start(&self) -> EngineResult<()> {
        if self.state.lock().is_running {
            debug!("engine already running");
            return Ok(());
        }

        {
            let mut session = self.session.lock();
            session.configure(SessionCategory::Playback)?;
            session.activate()?;
        }

        let graph = RenderGraph::new(
            self.config.stream.sample_rate as f32,
            self.render_state.clone(),
            self.playback.node(),
            self.master.clone(),
        );
        if let Err(err) = self.output.lock().start(graph) {
            // No partial bring-up survives a failed start
            self.session.lock().deactivate(true);
            return Err(err);
        }

        self.state.lock().is_running = true;
        self.spawn_monitor();
        info!("audio engine started");
        let _ = self.events.send(EngineEvent::Started);
        Ok(())
    }

    /// Tear the engine down; no-op when not running
    ///
    /// Reverses unconditionally: oscillator reset, playback released
    /// (pending waiter resolves as cancelled, not an error), output
    /// detached, session deactivated best-effort, monitor cancelled.
    pub fn stop(&self) {
        {
            let mut state = self.state.lock();
            if !state.is_running {
                return;
            }
            state.is_running = false;
            state.current_preset = None;
            state.ducked = false;
        }

        if let Some(monitor) = self.monitor.lock().take() {
            monitor.abort();
        }
        self.render_state.stop();
        self.playback.stop();
        self.output.lock().stop();
        self.session.lock().deactivate(true);
        info!("audio engine stopped");
        let _ = self.events.send(EngineEvent::Stopped);
    }

    /// Start binaural beats with the given preset, auto-starting the engine
    ///
    /// `Off` routes to `stop_binaural()`.
    pub fn start_binaural(&self, preset: BeatPreset) -> EngineResult<()> {
        if preset.is_off() {
            self.stop_binaural();
            return Ok(());
        }
        self.start()?;

        let volume = {
            let state = self.state.lock();
            if state.ducked {
                state.binaural_volume * self.config.ducking_factor
            } else {
                state.binaural_volume
            }
        };
        self.render_state.set_volume(volume)?;
        self.render_state.start(preset.beat_hz())?;
        self.state.lock().current_preset = Some(preset);
        info!(preset = preset.name(), "binaural beats started");
        Ok(())
    }

    /// Retune the running oscillator without restarting it
    ///
    /// Only the beat frequency changes; the phase accumulators continue,
    /// so the tone bends rather than clicks. `Off` routes to
    /// `stop_binaural()`; with no preset active this behaves like
    /// `start_binaural`.
    pub fn change_preset(&self, preset: BeatPreset) -> EngineResult<()> {
        if preset.is_off() {
            self.stop_binaural();
            return Ok(());
        }
        if self.state.lock().current_preset.is_none() {
            return self.start_binaural(preset);
        }
        self.render_state.set_beat_hz(preset.beat_hz())?;
        self.state.lock().current_preset = Some(preset);
        debug!(preset = preset.name(), "binaural preset changed");
        Ok(())
    }

    /// Stop the binaural tone (the engine itself keeps running)
    pub fn stop_binaural(&self) {
        self.render_state.stop();
        self.state.lock().current_preset = None;
        debug!("binaural beats stopped");
    }

    /// Play a stored clip to completion, ducking any active binaural tone
    ///
    /// Suspends until the clip finishes or `stop_playback()`/`stop()`
    /// releases it. The tone volume is restored on every exit path.
    pub async fn play_file(&self, name: &str) -> EngineResult<()> {
        self.start()?;
        let path = self
            .store
            .resolve(name)
            .ok_or_else(|| PlaybackError::ClipNotFound(name.to_string()))?;
        debug!(name, path = %path.display(), "playing stored clip");
        self.play_with_ducking(move || AudioClip::from_wav_file(&path))
            .await
    }

    /// Persist WAV bytes to the store, then play them to completion
    ///
    /// Same ducking and completion contract as `play_file`.
    pub async fn play_data(&self, bytes: &[u8]) -> EngineResult<()> {
        self.start()?;
        let name = self.store.store(bytes)?;
        debug!(name = %name, bytes = bytes.len(), "playing in-memory clip");
        self.play_with_ducking(|| AudioClip::from_wav_bytes(bytes))
            .await
    }

    async fn play_with_ducking<F>(&self, load: F) -> EngineResult<()>
    where
        F: FnOnce() -> Result<AudioClip, PlaybackError>,
    {
        let duck = {
            let mut state = self.state.lock();
            if state.current_preset.is_some() && !state.ducked {
                state.ducked = true;
                Some(state.binaural_volume * self.config.ducking_factor)
            } else {
                None
            }
        };
        if let Some(ducked_volume) = duck {
            let _ = self.render_state.set_volume(ducked_volume);
            debug!(volume = ducked_volume, "binaural tone ducked for playback");
        }

        let result = match load() {
            Ok(clip) => self.playback.play_clip(clip).await,
            Err(err) => Err(err),
        };

        // Restore symmetrically on every exit path: success, failure, cancel.
        // The baseline is re-read here so a volume change made during the
        // session takes effect now.
        {
            let mut state = self.state.lock();
            if state.ducked {
                state.ducked = false;
                let _ = self.render_state.set_volume(state.binaural_volume);
                debug!(volume = state.binaural_volume, "binaural tone restored");
            }
        }

        let outcome = result.map_err(EngineError::Playback)?;
        let _ = self.events.send(EngineEvent::PlaybackFinished {
            cancelled: outcome == PlaybackOutcome::Cancelled,
        });
        Ok(())
    }

    /// Stop the current clip; its waiter resolves without error
    pub fn stop_playback(&self) {
        self.playback.stop();
    }

    /// Pause the current clip; no-op when idle
    pub fn pause_playback(&self) {
        self.playback.pause();
    }

    /// Resume a paused clip; no-op otherwise
    pub fn resume_playback(&self) {
        self.playback.resume();
    }

    /// Set master output gain, clamped to `[0, 1]`
    pub fn set_main_volume(&self, volume: f32) {
        self.master.set(volume);
    }

    pub fn main_volume(&self) -> f32 {
        self.master.get()
    }

    /// Set the binaural baseline volume, clamped to `[0, 1]`
    ///
    /// Applies to the oscillator immediately unless a playback session
    /// holds the tone ducked; then the new baseline lands when that
    /// session restores volume.
    pub fn set_binaural_volume(&self, volume: f32) -> EngineResult<()> {
        if !volume.is_finite() {
            return Err(entrain_dsp::DspError::InvalidVolume(volume).into());
        }
        let clamped = volume.clamp(0.0, 1.0);
        let mut state = self.state.lock();
        state.binaural_volume = clamped;
        if !state.ducked {
            self.render_state.set_volume(clamped)?;
        }
        Ok(())
    }

    pub fn binaural_volume(&self) -> f32 {
        self.state.lock().binaural_volume
    }

    /// Set clip playback gain, clamped to `[0, 1]`
    pub fn set_playback_volume(&self, volume: f32) {
        self.playback.set_volume(volume);
    }

    pub fn playback_volume(&self) -> f32 {
        self.playback.volume()
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().is_running
    }

    pub fn current_preset(&self) -> Option<BeatPreset> {
        self.state.lock().current_preset
    }

    /// Left/right tone frequencies while a preset is active
    pub fn binaural_frequencies(&self) -> Option<(f32, f32)> {
        self.state.lock().current_preset.map(|preset| {
            (
                self.config.carrier_hz,
                self.config.carrier_hz + preset.beat_hz(),
            )
        })
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn playback_progress(&self) -> f64 {
        self.playback.progress()
    }

    pub fn playback_position_seconds(&self) -> f64 {
        self.playback.position_seconds()
    }

    pub fn playback_duration_seconds(&self) -> f64 {
        self.playback.duration_seconds()
    }

    /// Spawn the long-lived interruption monitor
    ///
    /// On `Began`: pause playback and silence (never reset) the oscillator;
    /// the graph keeps running for fast resumption. On `Ended` with
    /// `should_resume`: reactivate the session, unsilence the oscillator
    /// (its beat frequency was never cleared, so the prior preset carries
    /// on) and resume playback. Otherwise stay paused until the caller
    /// restarts explicitly.
    fn spawn_monitor(&self) {
        let mut events_rx = self.session.lock().subscribe();
        let session = Arc::clone(&self.session);
        let state = Arc::clone(&self.state);
        let playback = self.playback.clone();
        let render_state = self.render_state.clone();
        let events = self.events.clone();

        let handle = tokio::spawn(async move {
            loop {
                match events_rx.recv().await {
                    Ok(SessionEvent::Interruption(InterruptionEvent::Began)) => {
                        debug!("interruption began; pausing engine");
                        session.lock().note_interruption_began();
                        playback.pause();
                        render_state.set_playing(false);
                        let _ = events.send(EngineEvent::InterruptionBegan);
                    }
                    Ok(SessionEvent::Interruption(InterruptionEvent::Ended { should_resume })) => {
                        if should_resume {
                            if let Err(err) = session.lock().activate() {
                                warn!(error = %err, "session reactivation after interruption failed");
                            }
                            if state.lock().current_preset.is_some() {
                                render_state.set_playing(true);
                            }
                            playback.resume();
                            debug!("interruption ended; engine resumed");
                        } else {
                            debug!("interruption ended; staying paused");
                        }
                        let _ = events.send(EngineEvent::InterruptionEnded {
                            resumed: should_resume,
                        });
                    }
                    Ok(event) => {
                        debug!(?event, "session route event");
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "session event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        *self.monitor.lock() = Some(handle);
    }
}

impl Drop for AudioOrchestrator {
    fn drop(&mut self) {
        if let Some(monitor) = self.monitor.lock().take() {
            monitor.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{MockOutput, MockOutputHandle};
    use entrain_session::{MockBackend, MockHandle};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

    struct TestRig {
        engine: Arc<AudioOrchestrator>,
        session: MockHandle,
        output: MockOutputHandle,
        store: DirStore,
    }

    fn rig() -> TestRig {
        build_rig(false)
    }

    fn failing_output_rig() -> TestRig {
        build_rig(true)
    }

    fn build_rig(fail_output: bool) -> TestRig {
        // Engine logs show up under RUST_LOG=debug when a test fails
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let (session_backend, session) = MockBackend::new();
        let (output, output_handle) = if fail_output {
            MockOutput::failing()
        } else {
            MockOutput::new()
        };
        let dir = std::env::temp_dir().join(format!(
            "entrain-engine-test-{}-{}",
            std::process::id(),
            DIR_COUNTER.fetch_add(1, Ordering::SeqCst)
        ));

        let engine = AudioOrchestrator::new(
            EngineConfig::default(),
            SessionManager::new(Box::new(session_backend)),
            Box::new(output),
            Box::new(DirStore::new(&dir).unwrap()),
        )
        .unwrap();

        TestRig {
            engine: Arc::new(engine),
            session,
            output: output_handle,
            // Second handle onto the same directory, for seeding clips
            store: DirStore::new(&dir).unwrap(),
        }
    }

    fn silent_wav(frames: usize) -> Vec<u8> {
        wav_with_amplitude(frames, 0.0)
    }

    fn wav_with_amplitude(frames: usize, amplitude: f32) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 48_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            let peak = (amplitude * i16::MAX as f32) as i16;
            for _ in 0..frames {
                writer.write_sample(peak).unwrap();
                writer.write_sample(peak).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    fn peak(samples: &[f32]) -> f32 {
        samples.iter().fold(0.0_f32, |m, &s| m.max(s.abs()))
    }

    /// Let the interruption monitor drain its queue
    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let rig = rig();
        let mut events = rig.engine.subscribe();

        rig.engine.start().unwrap();
        rig.engine.start().unwrap();

        assert!(rig.engine.is_running());
        assert_eq!(rig.session.activate_calls(), 1);
        assert_eq!(events.try_recv().unwrap(), EngineEvent::Started);
        assert!(events.try_recv().is_err(), "no duplicate Started event");
    }

    #[tokio::test]
    async fn test_activation_failure_leaves_not_running() {
        let rig = rig();
        rig.session.set_fail_activate(true);

        let err = rig.engine.start().unwrap_err();
        assert!(matches!(err, EngineError::Session(_)));
        assert!(!rig.engine.is_running());
    }

    #[tokio::test]
    async fn test_attachment_failure_unwinds_session() {
        let rig = failing_output_rig();

        let err = rig.engine.start().unwrap_err();
        assert!(matches!(err, EngineError::Attachment(_)));
        assert!(!rig.engine.is_running());
        // The already-activated session was released on the way out
        assert_eq!(rig.session.deactivate_calls(), 1);
    }

    #[tokio::test]
    async fn test_binaural_auto_starts_engine() {
        let rig = rig();

        rig.engine.start_binaural(BeatPreset::Focus).unwrap();
        assert!(rig.engine.is_running());
        assert_eq!(rig.engine.current_preset(), Some(BeatPreset::Focus));
        assert_eq!(rig.session.activate_calls(), 1);
    }

    #[tokio::test]
    async fn test_preset_frequencies() {
        let rig = rig();

        rig.engine.start_binaural(BeatPreset::Focus).unwrap();
        assert_eq!(rig.engine.binaural_frequencies(), Some((200.0, 214.0)));

        rig.engine.change_preset(BeatPreset::Sleep).unwrap();
        assert_eq!(rig.engine.binaural_frequencies(), Some((200.0, 206.0)));

        rig.engine.stop_binaural();
        assert_eq!(rig.engine.binaural_frequencies(), None);
    }

    #[tokio::test]
    async fn test_off_preset_stops_binaural() {
        let rig = rig();
        rig.engine.start_binaural(BeatPreset::Relax).unwrap();

        rig.engine.start_binaural(BeatPreset::Off).unwrap();
        assert_eq!(rig.engine.current_preset(), None);
        // Engine itself keeps running
        assert!(rig.engine.is_running());

        let samples = rig.output.render(4800);
        assert!(samples.iter().all(|&s| s == 0.0));
    }

    #[tokio::test]
    async fn test_ducking_round_trip_on_success() {
        let rig = rig();
        rig.engine.set_binaural_volume(0.3).unwrap();
        rig.engine.start_binaural(BeatPreset::Relax).unwrap();

        let name = rig.store.store(&silent_wav(9600)).unwrap();
        let mut events = rig.engine.subscribe();

        let play = rig.engine.play_file(&name);
        let probe = async {
            // During playback the tone runs at 0.3 * 0.3 = 0.09
            let during = peak(&rig.output.render(4800));
            // Finish the clip
            rig.output.render(9600);
            during
        };
        let (result, during) = tokio::join!(play, probe);
        result.unwrap();

        assert!((during - 0.09).abs() < 0.005, "ducked peak {during}");
        assert_eq!(rig.engine.binaural_volume(), 0.3);

        // Restored exactly after completion
        let after = peak(&rig.output.render(4800));
        assert!((after - 0.3).abs() < 0.005, "restored peak {after}");

        assert_eq!(
            events.try_recv().unwrap(),
            EngineEvent::PlaybackFinished { cancelled: false }
        );
        assert!(events.try_recv().is_err(), "completion fires exactly once");
    }

    #[tokio::test]
    async fn test_ducking_restored_on_playback_failure() {
        let rig = rig();
        rig.engine.set_binaural_volume(0.44).unwrap();
        rig.engine.start_binaural(BeatPreset::Relax).unwrap();

        let name = rig.store.store(b"garbage, not a wav").unwrap();
        let err = rig.engine.play_file(&name).await.unwrap_err();
        assert!(matches!(err, EngineError::Playback(_)));

        // Failure still restored the tone volume
        assert_eq!(rig.engine.binaural_volume(), 0.44);
        let restored = peak(&rig.output.render(4800));
        assert!((restored - 0.44).abs() < 0.005, "restored peak {restored}");
        assert!(!rig.engine.is_playing());
        // A failed clip does not take the engine down
        assert!(rig.engine.is_running());
    }

    #[tokio::test]
    async fn test_missing_clip_is_typed_error() {
        let rig = rig();
        let err = rig.engine.play_file("no-such-clip.wav").await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Playback(PlaybackError::ClipNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_play_data_persists_then_plays() {
        let rig = rig();
        let bytes = silent_wav(512);

        let play = rig.engine.play_data(&bytes);
        let pump = async {
            rig.output.render(1024);
        };
        let (result, _) = tokio::join!(play, pump);
        result.unwrap();

        // The bytes landed in the store under their content name
        let name = rig.store.store(&bytes).unwrap();
        assert!(rig.store.resolve(&name).is_some());
    }

    #[tokio::test]
    async fn test_binaural_volume_deferred_while_ducked() {
        let rig = rig();
        rig.engine.set_binaural_volume(0.3).unwrap();
        rig.engine.start_binaural(BeatPreset::Relax).unwrap();

        let name = rig.store.store(&silent_wav(9600)).unwrap();
        let play = rig.engine.play_file(&name);
        let adjust = async {
            // Mid-session baseline change: must not pierce the duck
            rig.engine.set_binaural_volume(0.8).unwrap();
            let during = peak(&rig.output.render(4800));
            rig.output.render(9600);
            during
        };
        let (result, during) = tokio::join!(play, adjust);
        result.unwrap();

        // Still ducked at the old baseline while playing
        assert!((during - 0.09).abs() < 0.005, "ducked peak {during}");
        // New baseline applies on restore
        let after = peak(&rig.output.render(4800));
        assert!((after - 0.8).abs() < 0.005, "restored peak {after}");
    }

    #[tokio::test]
    async fn test_stop_releases_pending_playback_waiter() {
        let rig = rig();
        rig.engine.start_binaural(BeatPreset::Focus).unwrap();
        let name = rig.store.store(&silent_wav(96_000)).unwrap();

        let waiter = {
            let engine = Arc::clone(&rig.engine);
            let name = name.clone();
            tokio::spawn(async move { engine.play_file(&name).await })
        };
        tokio::task::yield_now().await;
        while !rig.engine.is_playing() {
            tokio::task::yield_now().await;
        }

        rig.engine.stop();
        // Cancellation is a clean exit, not an error
        waiter.await.unwrap().unwrap();

        assert!(!rig.engine.is_running());
        assert!(!rig.engine.is_playing());
        assert_eq!(rig.engine.current_preset(), None);
        assert_eq!(rig.engine.playback_progress(), 0.0);
        assert_eq!(rig.session.deactivate_calls(), 1);
    }

    #[tokio::test]
    async fn test_stop_when_not_running_is_noop() {
        let rig = rig();
        rig.engine.stop();
        assert!(!rig.engine.is_running());
        assert_eq!(rig.session.deactivate_calls(), 0);
    }

    #[tokio::test]
    async fn test_interruption_silences_without_reset() {
        let rig = rig();
        rig.engine.set_binaural_volume(0.5).unwrap();
        rig.engine.start_binaural(BeatPreset::Focus).unwrap();

        rig.session.interrupt_began();
        settle().await;

        // Silent but not torn down: preset survives for resumption
        let silent = rig.output.render(4800);
        assert!(silent.iter().all(|&s| s == 0.0));
        assert_eq!(rig.engine.current_preset(), Some(BeatPreset::Focus));
        assert!(rig.engine.is_running());
    }

    #[tokio::test]
    async fn test_interruption_ended_without_resume_stays_paused() {
        let rig = rig();
        rig.engine.start_binaural(BeatPreset::Focus).unwrap();

        rig.session.interrupt_began();
        settle().await;
        rig.session.interrupt_ended(false);
        settle().await;

        let samples = rig.output.render(4800);
        assert!(samples.iter().all(|&s| s == 0.0));
    }

    #[tokio::test]
    async fn test_interruption_ended_with_resume_restores_tone() {
        let rig = rig();
        rig.engine.set_binaural_volume(0.5).unwrap();
        rig.engine.start_binaural(BeatPreset::Focus).unwrap();
        let mut events = rig.engine.subscribe();

        rig.session.interrupt_began();
        settle().await;
        rig.session.interrupt_ended(true);
        settle().await;

        // Prior preset resumed at its volume; session reactivated
        let samples = rig.output.render(4800);
        let p = peak(&samples);
        assert!((p - 0.5).abs() < 0.005, "resumed peak {p}");
        assert_eq!(rig.engine.current_preset(), Some(BeatPreset::Focus));
        assert_eq!(rig.session.activate_calls(), 2);

        assert_eq!(events.try_recv().unwrap(), EngineEvent::InterruptionBegan);
        assert_eq!(
            events.try_recv().unwrap(),
            EngineEvent::InterruptionEnded { resumed: true }
        );
    }

    #[tokio::test]
    async fn test_interruption_pauses_and_resumes_playback() {
        let rig = rig();
        let name = rig.store.store(&silent_wav(48_000)).unwrap();

        let waiter = {
            let engine = Arc::clone(&rig.engine);
            let name = name.clone();
            tokio::spawn(async move { engine.play_file(&name).await })
        };
        tokio::task::yield_now().await;
        while !rig.engine.is_playing() {
            tokio::task::yield_now().await;
        }

        rig.session.interrupt_began();
        settle().await;
        assert!(!rig.engine.is_playing());

        rig.session.interrupt_ended(true);
        settle().await;
        assert!(rig.engine.is_playing());

        // Let it play out
        rig.output.render(48_000);
        waiter.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_volume_setters_clamp() {
        let rig = rig();

        rig.engine.set_main_volume(2.0);
        assert_eq!(rig.engine.main_volume(), 1.0);

        rig.engine.set_binaural_volume(-0.5).unwrap();
        assert_eq!(rig.engine.binaural_volume(), 0.0);
        assert!(rig.engine.set_binaural_volume(f32::NAN).is_err());

        rig.engine.set_playback_volume(7.0);
        assert_eq!(rig.engine.playback_volume(), 1.0);
    }

    #[tokio::test]
    async fn test_progress_reporting() {
        let rig = rig();
        let name = rig.store.store(&silent_wav(9600)).unwrap();

        let play = rig.engine.play_file(&name);
        let probe = async {
            rig.output.render(4800);
            let midway = rig.engine.playback_progress();
            let duration = rig.engine.playback_duration_seconds();
            rig.output.render(9600);
            (midway, duration)
        };
        let (result, (midway, duration)) = tokio::join!(play, probe);
        result.unwrap();

        assert!((midway - 0.5).abs() < 0.01, "midway {midway}");
        assert!((duration - 0.2).abs() < 1e-9);
        // Idle again after completion
        assert_eq!(rig.engine.playback_progress(), 0.0);
    }
}
