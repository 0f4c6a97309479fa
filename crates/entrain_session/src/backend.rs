//! Session Backends
//!
//! The `SessionBackend` trait is the seam between the lifecycle manager and
//! the host platform. Three implementations ship:
//!
//! - `SystemBackend` - production; validates device availability via CPAL.
//!   Desktop hosts have no session concept of their own, so categories are
//!   accepted whenever the required devices exist, and interruption events
//!   arrive only from an embedding shell that forwards them.
//! - `MockBackend` - deterministic, scriptable; drives the lifecycle and
//!   interruption tests without hardware.
//! - `NullBackend` - accepts everything, emits nothing; preview/stub use.
//!
//! Only the control plane is polymorphic; nothing here runs in the render
//! callback.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cpal::traits::HostTrait;
use tokio::sync::broadcast;
use tracing::debug;

use crate::category::SessionCategory;
use crate::error::SessionError;
use crate::events::{InterruptionEvent, SessionEvent};

/// Capacity of the session event channel
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Platform seam for session configuration, activation, and events
pub trait SessionBackend: Send + Sync {
    /// Backend name for logs (e.g., "system", "mock")
    fn name(&self) -> &'static str;

    /// Request a session category; must not change the active state
    fn set_category(&mut self, category: SessionCategory) -> Result<(), SessionError>;

    /// Bring the session up
    fn activate(&mut self) -> Result<(), SessionError>;

    /// Tear the session down; the manager treats failures as log-only
    fn deactivate(&mut self, notify_others: bool) -> Result<(), SessionError>;

    /// Sender for this backend's event channel
    ///
    /// The manager subscribes through this and also uses it for the events
    /// it emits itself (category changes).
    fn event_sender(&self) -> broadcast::Sender<SessionEvent>;
}

/// Production backend backed by the host audio stack
pub struct SystemBackend {
    events: broadcast::Sender<SessionEvent>,
}

impl SystemBackend {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { events }
    }

    fn has_output_device() -> bool {
        cpal::default_host().default_output_device().is_some()
    }

    fn has_input_device() -> bool {
        cpal::default_host().default_input_device().is_some()
    }
}

impl Default for SystemBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBackend for SystemBackend {
    fn name(&self) -> &'static str {
        "system"
    }

    fn set_category(&mut self, category: SessionCategory) -> Result<(), SessionError> {
        if category.plays_output() && !Self::has_output_device() {
            return Err(SessionError::CategoryRejected {
                category: category.name(),
                reason: "no output device".into(),
            });
        }
        if category.captures_input() && !Self::has_input_device() {
            return Err(SessionError::CategoryRejected {
                category: category.name(),
                reason: "no input device".into(),
            });
        }
        debug!(category = category.name(), "session category accepted");
        Ok(())
    }

    fn activate(&mut self) -> Result<(), SessionError> {
        if !Self::has_output_device() {
            return Err(SessionError::NoOutputDevice);
        }
        Ok(())
    }

    fn deactivate(&mut self, _notify_others: bool) -> Result<(), SessionError> {
        // Desktop hosts hold no session-level resources to release
        Ok(())
    }

    fn event_sender(&self) -> broadcast::Sender<SessionEvent> {
        self.events.clone()
    }
}

/// Scripted state shared between a `MockBackend` and its `MockHandle`
#[derive(Default)]
struct MockInner {
    fail_configure: AtomicBool,
    fail_activate: AtomicBool,
    fail_deactivate: AtomicBool,
    configure_calls: AtomicUsize,
    activate_calls: AtomicUsize,
    deactivate_calls: AtomicUsize,
    last_category: Mutex<Option<SessionCategory>>,
}

/// Deterministic backend for tests
pub struct MockBackend {
    inner: Arc<MockInner>,
    events: broadcast::Sender<SessionEvent>,
}

/// Test-side control over a `MockBackend` that has been handed to a manager
#[derive(Clone)]
pub struct MockHandle {
    inner: Arc<MockInner>,
    events: broadcast::Sender<SessionEvent>,
}

impl MockBackend {
    /// Create a backend and the handle used to script it
    pub fn new() -> (Self, MockHandle) {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let inner = Arc::new(MockInner::default());
        let handle = MockHandle {
            inner: Arc::clone(&inner),
            events: events.clone(),
        };
        (Self { inner, events }, handle)
    }
}

impl SessionBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn set_category(&mut self, category: SessionCategory) -> Result<(), SessionError> {
        self.inner.configure_calls.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_configure.load(Ordering::SeqCst) {
            return Err(SessionError::CategoryRejected {
                category: category.name(),
                reason: "scripted failure".into(),
            });
        }
        *self.inner.last_category.lock().unwrap() = Some(category);
        Ok(())
    }

    fn activate(&mut self) -> Result<(), SessionError> {
        self.inner.activate_calls.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_activate.load(Ordering::SeqCst) {
            return Err(SessionError::ActivationFailed("scripted failure".into()));
        }
        Ok(())
    }

    fn deactivate(&mut self, _notify_others: bool) -> Result<(), SessionError> {
        self.inner.deactivate_calls.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_deactivate.load(Ordering::SeqCst) {
            return Err(SessionError::ActivationFailed("scripted failure".into()));
        }
        Ok(())
    }

    fn event_sender(&self) -> broadcast::Sender<SessionEvent> {
        self.events.clone()
    }
}

impl MockHandle {
    pub fn set_fail_configure(&self, fail: bool) {
        self.inner.fail_configure.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_activate(&self, fail: bool) {
        self.inner.fail_activate.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deactivate(&self, fail: bool) {
        self.inner.fail_deactivate.store(fail, Ordering::SeqCst);
    }

    /// Inject an interruption start, as the platform would
    pub fn interrupt_began(&self) {
        let _ = self
            .events
            .send(SessionEvent::Interruption(InterruptionEvent::Began));
    }

    /// Inject the end of an interruption
    pub fn interrupt_ended(&self, should_resume: bool) {
        let _ = self
            .events
            .send(SessionEvent::Interruption(InterruptionEvent::Ended {
                should_resume,
            }));
    }

    /// Inject a route change
    pub fn disconnect_device(&self, name: &str) {
        let _ = self.events.send(SessionEvent::DeviceDisconnected {
            name: name.to_string(),
        });
    }

    pub fn configure_calls(&self) -> usize {
        self.inner.configure_calls.load(Ordering::SeqCst)
    }

    pub fn activate_calls(&self) -> usize {
        self.inner.activate_calls.load(Ordering::SeqCst)
    }

    pub fn deactivate_calls(&self) -> usize {
        self.inner.deactivate_calls.load(Ordering::SeqCst)
    }

    pub fn last_category(&self) -> Option<SessionCategory> {
        *self.inner.last_category.lock().unwrap()
    }
}

/// Backend that accepts everything and emits nothing
pub struct NullBackend {
    events: broadcast::Sender<SessionEvent>,
}

impl NullBackend {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { events }
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBackend for NullBackend {
    fn name(&self) -> &'static str {
        "null"
    }

    fn set_category(&mut self, _category: SessionCategory) -> Result<(), SessionError> {
        Ok(())
    }

    fn activate(&mut self) -> Result<(), SessionError> {
        Ok(())
    }

    fn deactivate(&mut self, _notify_others: bool) -> Result<(), SessionError> {
        Ok(())
    }

    fn event_sender(&self) -> broadcast::Sender<SessionEvent> {
        self.events.clone()
    }
}
