//! DSP Error Types

use thiserror::Error;

/// Errors from synthesis parameter validation
///
/// The render path itself is infallible; invalid inputs are rejected here,
/// at the control-plane setters, before they can reach the callback.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum DspError {
    #[error("Frequency must be finite and non-negative, got {0}")]
    InvalidFrequency(f32),

    #[error("Volume must be finite, got {0}")]
    InvalidVolume(f32),
}
