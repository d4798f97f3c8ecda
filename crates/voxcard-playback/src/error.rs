use thiserror::Error;

/// Errors that abort the current phase and return the engine to idle.
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Audio device error: {0}")]
    Device(String),

    #[error("Audio decode error: {0}")]
    Decode(String),
}
