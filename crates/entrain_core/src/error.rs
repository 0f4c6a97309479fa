//! Engine Error Types

use thiserror::Error;

/// Errors from loading or scheduling a playback source
///
/// Always recoverable from the engine's point of view: a playback failure
/// restores any ducked volume and leaves the coordinator idle, then
/// surfaces here to the caller.
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Cannot open audio source '{path}': {reason}")]
    UnreadableSource { path: String, reason: String },

    #[error("Cannot decode audio source: {0}")]
    DecodeFailed(String),

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Clip store write failed: {0}")]
    StoreFailed(String),

    #[error("No clip named '{0}' in the store")]
    ClipNotFound(String),
}

/// Errors that can occur in the audio engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid engine configuration: {0}")]
    Config(String),

    #[error("Session configuration failed: {0}")]
    Session(#[from] entrain_session::SessionError),

    #[error("Failed to attach audio output: {0}")]
    Attachment(String),

    #[error("Playback failed: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Synthesis parameter rejected: {0}")]
    Dsp(#[from] entrain_dsp::DspError),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
