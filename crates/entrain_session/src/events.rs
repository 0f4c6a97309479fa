//! Session Event Types
//!
//! Events flow from the platform session observer to whoever subscribed.
//! Interruptions drive the orchestrator's recovery policy; route changes
//! are informational for observers.

use serde::{Deserialize, Serialize};

use crate::category::SessionCategory;

/// An OS-originated interruption of the audio session
///
/// `Began` always precedes its matching `Ended`. `Ended` carries whether
/// the session owner should resume playing on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterruptionEvent {
    /// The platform suspended the session (e.g., an incoming call)
    Began,

    /// The interruption is over
    Ended {
        /// Whether the platform suggests resuming playback
        should_resume: bool,
    },
}

/// Events emitted by the session layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum SessionEvent {
    /// The session was interrupted or the interruption ended
    Interruption(InterruptionEvent),

    /// An audio device appeared on the route
    DeviceConnected { name: String },

    /// An audio device left the route (e.g., headphones unplugged)
    DeviceDisconnected { name: String },

    /// The session category was reconfigured
    CategoryChanged { category: SessionCategory },
}
