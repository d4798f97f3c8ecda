use thiserror::Error;
use voxcard_cache::CacheError;
use voxcard_tts::TtsError;

/// Errors surfaced by the synthesis service.
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// Unusable configuration (no credential). Surfaced immediately, never
    /// retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Any gateway failure mode, with a human-readable cause. The cache is
    /// left untouched and nothing is retried here.
    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    /// Cache write failure. Synthesized audio could not be persisted; the
    /// caller must be told rather than silently losing it.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl From<TtsError> for SynthesisError {
    fn from(err: TtsError) -> Self {
        match err {
            TtsError::Configuration(msg) => SynthesisError::Configuration(msg),
            other => SynthesisError::SynthesisFailed(other.to_string()),
        }
    }
}

pub type SynthesisResult<T> = Result<T, SynthesisError>;
