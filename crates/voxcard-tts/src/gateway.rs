//! The synthesis gateway trait

use crate::error::TtsResult;
use crate::types::SynthesisRequest;
use async_trait::async_trait;

/// A remote text-to-speech provider.
///
/// Each call is an atomic request/response: the full audio for one text
/// fragment, or an error. Streaming synthesis is out of scope. Callers own
/// retry policy; implementations must not retry internally.
#[async_trait]
pub trait SynthesisGateway: Send + Sync {
    /// Provider name, for logs and diagnostics.
    fn name(&self) -> &str;

    /// Synthesize `request.text` with the given voice and return the raw
    /// encoded audio bytes.
    async fn convert(&self, voice_id: &str, request: &SynthesisRequest) -> TtsResult<Vec<u8>>;
}
