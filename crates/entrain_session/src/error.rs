//! Session Error Types

use thiserror::Error;

/// Errors from audio session configuration and activation
///
/// Deactivation is deliberately absent: failing to deactivate must never
/// abort a teardown path, so backends log it and return normally.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Audio session rejected category '{category}': {reason}")]
    CategoryRejected {
        category: &'static str,
        reason: String,
    },

    #[error("Audio session activation failed: {0}")]
    ActivationFailed(String),

    #[error("No output device available")]
    NoOutputDevice,

    #[error("Session must be configured before activation")]
    NotConfigured,
}
