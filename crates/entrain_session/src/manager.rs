//! Session Lifecycle Manager
//!
//! Owns the session state machine and delegates platform work to a
//! `SessionBackend`:
//!
//! ```text
//! Inactive ──configure()──▶ Configuring ──activate()──▶ Active
//!     ▲                                                   │
//!     └────── interruption began / deactivate() ──────────┘
//! ```
//!
//! An interruption force-deactivates the session on the platform side;
//! returning to `Active` afterwards always requires an explicit
//! `activate()` call.

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::backend::{SessionBackend, SystemBackend};
use crate::category::SessionCategory;
use crate::error::SessionError;
use crate::events::SessionEvent;

/// Lifecycle states of the audio session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Inactive,
    Configuring,
    Active,
}

/// Manages session configuration, activation, and the event channel
pub struct SessionManager {
    backend: Box<dyn SessionBackend>,
    events: broadcast::Sender<SessionEvent>,
    state: SessionState,
    category: Option<SessionCategory>,
}

impl SessionManager {
    /// Create a manager over the given backend
    pub fn new(backend: Box<dyn SessionBackend>) -> Self {
        let events = backend.event_sender();
        Self {
            backend,
            events,
            state: SessionState::Inactive,
            category: None,
        }
    }

    /// Create a manager over the host audio stack
    pub fn with_system_backend() -> Self {
        Self::new(Box::new(SystemBackend::new()))
    }

    /// Subscribe to interruption and route-change events
    ///
    /// Delivery is ordered and at-least-once per subscriber; a `Began`
    /// always precedes its matching `Ended`.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Request a session category
    ///
    /// Does not change the active state. On platform rejection the previous
    /// category (if any) remains in effect.
    pub fn configure(&mut self, category: SessionCategory) -> Result<(), SessionError> {
        self.backend.set_category(category)?;
        self.category = Some(category);
        if self.state == SessionState::Inactive {
            self.state = SessionState::Configuring;
        }
        debug!(
            backend = self.backend.name(),
            category = category.name(),
            "session configured"
        );
        let _ = self.events.send(SessionEvent::CategoryChanged { category });
        Ok(())
    }

    /// Activate the session; no-op if already active
    pub fn activate(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Active {
            return Ok(());
        }
        if self.category.is_none() {
            return Err(SessionError::NotConfigured);
        }
        self.backend.activate()?;
        self.state = SessionState::Active;
        info!(backend = self.backend.name(), "audio session active");
        Ok(())
    }

    /// Deactivate the session, best-effort
    ///
    /// Platform failures are logged and swallowed: failing to deactivate
    /// must never abort a teardown path. The local state always ends up
    /// `Inactive`.
    pub fn deactivate(&mut self, notify_others: bool) {
        if self.state == SessionState::Inactive {
            return;
        }
        if let Err(err) = self.backend.deactivate(notify_others) {
            warn!(
                backend = self.backend.name(),
                error = %err,
                "session deactivation failed; continuing teardown"
            );
        }
        self.state = SessionState::Inactive;
        info!(backend = self.backend.name(), "audio session inactive");
    }

    /// Record that the platform force-deactivated the session
    ///
    /// Called by the interruption consumer when it sees `Began`; the
    /// platform has already torn the session down by then, so no backend
    /// call is made.
    pub fn note_interruption_began(&mut self) {
        if self.state == SessionState::Active {
            self.state = SessionState::Inactive;
            debug!("session force-deactivated by interruption");
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn category(&self) -> Option<SessionCategory> {
        self.category
    }
}
