//! Output Backends
//!
//! The `OutputBackend` trait is the seam between the orchestrator and
//! whatever drives the render graph:
//!
//! - `CpalOutput` - production; a dedicated audio thread owns the CPAL
//!   stream (the stream is not `Send`, so it never leaves that thread) and
//!   the device callback drives `RenderGraph::render`.
//! - `MockOutput` - tests pump the graph by hand, deterministically.
//! - `NullOutput` - accepts the graph and discards it; preview use.
//!
//! Only the control plane is polymorphic; inside the callback everything is
//! static dispatch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::config::StreamConfig;
use crate::error::{EngineError, EngineResult};
use crate::graph::RenderGraph;

/// How long to wait for the audio thread to report stream attachment
const ATTACH_TIMEOUT: Duration = Duration::from_secs(5);

/// Notifications sent out of the audio thread
enum OutputNotice {
    /// The device stream reported an error (callback context; logged later)
    StreamError(String),
}

/// Seam between the orchestrator and the device layer
pub trait OutputBackend: Send {
    /// Backend name for logs (e.g., "cpal", "mock")
    fn name(&self) -> &'static str;

    /// Attach the graph and start rendering
    ///
    /// A failure must leave nothing attached or running.
    fn start(&mut self, graph: RenderGraph) -> EngineResult<()>;

    /// Stop rendering and detach the graph
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}

/// Production backend: CPAL output stream on a dedicated audio thread
pub struct CpalOutput {
    config: StreamConfig,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    notice_tx: Sender<OutputNotice>,
    notices: Receiver<OutputNotice>,
}

impl CpalOutput {
    pub fn new(config: StreamConfig) -> Self {
        let (notice_tx, notices) = unbounded();
        Self {
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
            thread: None,
            notice_tx,
            notices,
        }
    }
}

impl OutputBackend for CpalOutput {
    fn name(&self) -> &'static str {
        "cpal"
    }

    fn start(&mut self, mut graph: RenderGraph) -> EngineResult<()> {
        if self.thread.is_some() {
            return Ok(());
        }

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);
        let (ready_tx, ready_rx) = bounded::<Result<(), String>>(1);
        let notice_tx = self.notice_tx.clone();
        let config = self.config.clone();

        let thread = thread::Builder::new()
            .name("entrain-audio".into())
            .spawn(move || {
                let host = cpal::default_host();
                let device = match host.default_output_device() {
                    Some(device) => device,
                    None => {
                        let _ = ready_tx.send(Err("no output device".into()));
                        return;
                    }
                };

                let cpal_config = cpal::StreamConfig {
                    channels: config.channels,
                    sample_rate: cpal::SampleRate(config.sample_rate),
                    buffer_size: cpal::BufferSize::Fixed(config.buffer_size),
                };

                let stream = match device.build_output_stream(
                    &cpal_config,
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        // Real-time audio callback - the graph does all the work
                        graph.render(data);
                    },
                    move |err| {
                        let _ = notice_tx.try_send(OutputNotice::StreamError(err.to_string()));
                    },
                    None, // No timeout
                ) {
                    Ok(stream) => stream,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err.to_string()));
                        return;
                    }
                };

                if let Err(err) = stream.play() {
                    let _ = ready_tx.send(Err(err.to_string()));
                    return;
                }
                let _ = ready_tx.send(Ok(()));

                // The stream is not Send; this thread holds it alive until shutdown
                while !shutdown_flag.load(Ordering::SeqCst) {
                    thread::park_timeout(Duration::from_millis(50));
                }
                drop(stream);
            })
            .map_err(|err| EngineError::Attachment(err.to_string()))?;

        match ready_rx.recv_timeout(ATTACH_TIMEOUT) {
            Ok(Ok(())) => {
                self.shutdown = shutdown;
                self.thread = Some(thread);
                info!(
                    sample_rate = self.config.sample_rate,
                    buffer_size = self.config.buffer_size,
                    "output stream attached"
                );
                Ok(())
            }
            Ok(Err(reason)) => {
                let _ = thread.join();
                Err(EngineError::Attachment(reason))
            }
            Err(_) => {
                shutdown.store(true, Ordering::SeqCst);
                thread.thread().unpark();
                let _ = thread.join();
                Err(EngineError::Attachment(
                    "audio thread did not report readiness".into(),
                ))
            }
        }
    }

    fn stop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            thread.thread().unpark();
            if thread.join().is_err() {
                warn!("audio thread panicked during shutdown");
            }
            info!("output stream detached");
        }
        // Surface any errors the stream callback reported while running
        while let Ok(OutputNotice::StreamError(err)) = self.notices.try_recv() {
            warn!(error = %err, "output stream reported an error");
        }
    }

    fn is_running(&self) -> bool {
        self.thread.is_some()
    }
}

impl Drop for CpalOutput {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Deterministic backend for tests: the graph is pumped by hand
pub struct MockOutput {
    graph: Arc<Mutex<Option<RenderGraph>>>,
    running: Arc<AtomicBool>,
    fail_start: bool,
}

/// Test-side handle that drives a `MockOutput`'s graph
#[derive(Clone)]
pub struct MockOutputHandle {
    graph: Arc<Mutex<Option<RenderGraph>>>,
    running: Arc<AtomicBool>,
}

impl MockOutput {
    /// Create a backend and the handle used to pump it
    pub fn new() -> (Self, MockOutputHandle) {
        let graph = Arc::new(Mutex::new(None));
        let running = Arc::new(AtomicBool::new(false));
        let handle = MockOutputHandle {
            graph: Arc::clone(&graph),
            running: Arc::clone(&running),
        };
        (
            Self {
                graph,
                running,
                fail_start: false,
            },
            handle,
        )
    }

    /// Create a backend whose `start` always fails
    pub fn failing() -> (Self, MockOutputHandle) {
        let (mut backend, handle) = Self::new();
        backend.fail_start = true;
        (backend, handle)
    }
}

impl OutputBackend for MockOutput {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn start(&mut self, graph: RenderGraph) -> EngineResult<()> {
        if self.fail_start {
            return Err(EngineError::Attachment("scripted attachment failure".into()));
        }
        *self.graph.lock() = Some(graph);
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) {
        *self.graph.lock() = None;
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl MockOutputHandle {
    /// Render `frames` frames through the attached graph
    ///
    /// Returns the interleaved samples (all zeros when nothing is attached),
    /// rendering in render-callback-sized blocks.
    pub fn render(&self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0_f32; frames * 2];
        let mut guard = self.graph.lock();
        if let Some(graph) = guard.as_mut() {
            for chunk in out.chunks_mut(512 * 2) {
                graph.render(chunk);
            }
        }
        out
    }

    pub fn is_attached(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Backend that accepts the graph and renders nothing (preview/stub)
pub struct NullOutput {
    running: bool,
}

impl NullOutput {
    pub fn new() -> Self {
        Self { running: false }
    }
}

impl Default for NullOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputBackend for NullOutput {
    fn name(&self) -> &'static str {
        "null"
    }

    fn start(&mut self, _graph: RenderGraph) -> EngineResult<()> {
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
