//! Entrain Session - Audio Session Lifecycle
//!
//! This crate owns the platform audio-session concerns for Entrain:
//! - Session categories (playback / play-and-record / record) with their
//!   platform option sets
//! - Activation and best-effort deactivation
//! - Interruption and route-change event delivery
//!
//! # Architecture
//!
//! `SessionManager` drives the state machine; the `SessionBackend` trait is
//! the platform seam with production (`SystemBackend`), deterministic test
//! (`MockBackend`), and no-op (`NullBackend`) implementations. The manager
//! is an explicitly constructed, explicitly scoped object - there is no
//! process-wide singleton, which keeps tests hermetic.

mod backend;
mod category;
mod error;
mod events;
mod manager;

pub use backend::{MockBackend, MockHandle, NullBackend, SessionBackend, SystemBackend};
pub use category::{CategoryOptions, SessionCategory};
pub use error::SessionError;
pub use events::{InterruptionEvent, SessionEvent};
pub use manager::{SessionManager, SessionState};
