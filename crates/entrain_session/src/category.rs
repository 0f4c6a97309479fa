//! Session Categories
//!
//! Three mutually exclusive session configurations, each carrying the
//! platform option set requested alongside it. The orchestrator treats
//! these as opaque ("request category X"); only backends interpret the
//! options.

use serde::{Deserialize, Serialize};

/// Requested audio session configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionCategory {
    /// Playback only: mixes with other apps, ducks their audio
    Playback,
    /// Playback and capture (measurement mode): speaker output, Bluetooth allowed
    PlayAndRecord,
    /// Capture only
    Record,
}

/// Platform-level options requested with a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOptions {
    /// Share the output with other running audio apps
    pub mix_with_others: bool,

    /// Lower other apps' volume while this session plays
    pub duck_others: bool,

    /// Prefer the built-in speaker over the receiver
    pub default_to_speaker: bool,

    /// Permit Bluetooth input/output routes
    pub allow_bluetooth: bool,
}

impl SessionCategory {
    /// The option set this category is always requested with
    pub fn options(self) -> CategoryOptions {
        match self {
            SessionCategory::Playback => CategoryOptions {
                mix_with_others: true,
                duck_others: true,
                default_to_speaker: false,
                allow_bluetooth: false,
            },
            SessionCategory::PlayAndRecord => CategoryOptions {
                mix_with_others: false,
                duck_others: false,
                default_to_speaker: true,
                allow_bluetooth: true,
            },
            SessionCategory::Record => CategoryOptions {
                mix_with_others: false,
                duck_others: false,
                default_to_speaker: false,
                allow_bluetooth: false,
            },
        }
    }

    /// Whether this category plays audio
    pub fn plays_output(self) -> bool {
        !matches!(self, SessionCategory::Record)
    }

    /// Whether this category captures audio
    pub fn captures_input(self) -> bool {
        !matches!(self, SessionCategory::Playback)
    }

    /// Human-readable name for logs and errors
    pub fn name(self) -> &'static str {
        match self {
            SessionCategory::Playback => "playback",
            SessionCategory::PlayAndRecord => "play-and-record",
            SessionCategory::Record => "record",
        }
    }
}
