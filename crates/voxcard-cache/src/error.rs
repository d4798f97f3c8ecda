use thiserror::Error;

/// Cache storage errors. Read-side failures are degraded to misses by the
/// store; these surface for writes and startup.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache index serialization error: {0}")]
    Index(#[from] serde_json::Error),

    #[error("Unsupported cache index version {found} (this build supports {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

pub type CacheResult<T> = Result<T, CacheError>;
