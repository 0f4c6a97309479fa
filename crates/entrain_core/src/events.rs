//! Engine Event Types
//!
//! Events flow from the orchestrator to application observers. Playback
//! completion fires exactly once per scheduled clip, with a flag telling
//! natural completion apart from cancellation.

use serde::{Deserialize, Serialize};

/// Events emitted by the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum EngineEvent {
    /// Engine started successfully
    Started,

    /// Engine stopped
    Stopped,

    /// A scheduled clip finished
    PlaybackFinished {
        /// True when released by `stop()` rather than reaching the end
        cancelled: bool,
    },

    /// The platform interrupted the session; playback and tone are paused
    InterruptionBegan,

    /// The interruption is over
    InterruptionEnded {
        /// Whether the engine resumed on its own
        resumed: bool,
    },
}
