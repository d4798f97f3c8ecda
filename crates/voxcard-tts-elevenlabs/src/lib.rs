//! ElevenLabs synthesis gateway implementation for VoxCard

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};
use voxcard_tts::{SynthesisGateway, SynthesisRequest, TtsError, TtsResult};

mod tests;

/// Default ElevenLabs API endpoint.
pub const ELEVENLABS_API_URL: &str = "https://api.elevenlabs.io";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Gateway over the ElevenLabs REST text-to-speech API.
///
/// One POST per fragment to `/v1/text-to-speech/{voice_id}`; the response
/// body is the encoded audio (MP3 by default).
pub struct ElevenLabsGateway {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl ElevenLabsGateway {
    pub fn new(api_key: impl Into<String>) -> TtsResult<Self> {
        Self::with_base_url(api_key, ELEVENLABS_API_URL)
    }

    /// Point the gateway at a non-default endpoint (tests, proxies).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> TtsResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(TtsError::Configuration(
                "ElevenLabs API key is not set".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TtsError::Configuration(format!("HTTP client build failed: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    fn request_body(request: &SynthesisRequest) -> serde_json::Value {
        let mut body = json!({
            "text": request.text,
            "model_id": request.model_id,
            "voice_settings": {
                "stability": request.voice_settings.stability,
                "similarity_boost": request.voice_settings.similarity_boost,
                "style": request.voice_settings.style,
                "use_speaker_boost": request.voice_settings.use_speaker_boost,
            },
        });
        if let Some(language) = &request.language_code {
            body["language_code"] = json!(language);
        }
        body
    }
}

#[async_trait]
impl SynthesisGateway for ElevenLabsGateway {
    fn name(&self) -> &str {
        "ElevenLabs"
    }

    async fn convert(&self, voice_id: &str, request: &SynthesisRequest) -> TtsResult<Vec<u8>> {
        if request.text.trim().is_empty() {
            return Err(TtsError::InvalidInput("empty text".to_string()));
        }

        let url = format!("{}/v1/text-to-speech/{}", self.base_url, voice_id);
        debug!(voice_id, chars = request.text.len(), "ElevenLabs convert");

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&Self::request_body(request))
            .send()
            .await
            .map_err(|e| TtsError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(TtsError::AuthRejected(format!("HTTP {status}")));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(%status, "ElevenLabs request failed: {}", message);
            return Err(TtsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TtsError::Unreachable(e.to_string()))?;
        if bytes.is_empty() {
            return Err(TtsError::EmptyAudio);
        }
        Ok(bytes.to_vec())
    }
}
