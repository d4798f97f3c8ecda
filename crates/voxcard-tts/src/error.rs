//! Error types for gateway synthesis

use thiserror::Error;

/// Errors surfaced by a synthesis gateway.
#[derive(Error, Debug)]
pub enum TtsError {
    /// No credential or otherwise unusable configuration. Fatal to any
    /// synthesis attempt; never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The gateway could not be reached.
    #[error("Gateway unreachable: {0}")]
    Unreachable(String),

    /// The gateway rejected the credential.
    #[error("Authentication rejected: {0}")]
    AuthRejected(String),

    /// The gateway answered with a non-success status.
    #[error("Gateway error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The gateway returned a success status but no audio bytes.
    #[error("Gateway returned an empty audio stream")]
    EmptyAudio,

    /// Text not suitable for synthesis (e.g. empty after trimming).
    #[error("Invalid text input: {0}")]
    InvalidInput(String),
}

/// Result type for gateway operations.
pub type TtsResult<T> = Result<T, TtsError>;
