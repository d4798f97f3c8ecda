use thiserror::Error;
use voxcard_synth::SynthesisError;

/// Errors that abort an export run. Temp staging is cleaned up best-effort
/// before any of these reach the caller.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export: the deck is empty")]
    EmptyDeck,

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error("Audio processing error: {0}")]
    Processing(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
