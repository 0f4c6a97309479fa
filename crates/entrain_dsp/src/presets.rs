//! Built-in Binaural Beat Presets
//!
//! Each preset maps to a fixed beat frequency: the difference between the
//! left (carrier) and right (carrier + beat) channel tones. The carrier
//! frequency itself is engine configuration, not part of the preset.

/// Named binaural beat preset
///
/// Switching presets only changes the beat frequency going forward; the
/// oscillator phase accumulators are never reset by a preset change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BeatPreset {
    /// No beat - oscillator off
    Off,
    /// 14 Hz (beta range) - concentration
    Focus,
    /// 10 Hz (alpha range) - relaxation
    Relax,
    /// 6 Hz (theta range) - sleep onset
    Sleep,
}

/// All presets, in menu order
pub const BEAT_PRESETS: &[BeatPreset] = &[
    BeatPreset::Off,
    BeatPreset::Focus,
    BeatPreset::Relax,
    BeatPreset::Sleep,
];

impl BeatPreset {
    /// Beat frequency delta in Hz (right channel = carrier + beat)
    pub fn beat_hz(self) -> f32 {
        match self {
            BeatPreset::Off => 0.0,
            BeatPreset::Focus => 14.0,
            BeatPreset::Relax => 10.0,
            BeatPreset::Sleep => 6.0,
        }
    }

    /// Whether this preset disables the oscillator
    pub fn is_off(self) -> bool {
        matches!(self, BeatPreset::Off)
    }

    /// Human-readable name for debugging/UI
    pub fn name(self) -> &'static str {
        match self {
            BeatPreset::Off => "Off",
            BeatPreset::Focus => "Focus",
            BeatPreset::Relax => "Relax",
            BeatPreset::Sleep => "Sleep",
        }
    }
}
