//! Core types for gateway synthesis requests

use serde::{Deserialize, Serialize};

/// One atomic synthesis request forwarded to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisRequest {
    /// Text to speak.
    pub text: String,
    /// Provider model identifier (e.g. "eleven_multilingual_v2").
    pub model_id: String,
    /// Full locale tag (e.g. "es-ES"). Optional; some models infer it.
    pub language_code: Option<String>,
    /// Provider voice tuning, forwarded opaquely.
    pub voice_settings: VoiceSettings,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model_id: model_id.into(),
            language_code: None,
            voice_settings: VoiceSettings::default(),
        }
    }

    pub fn with_language(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = Some(language_code.into());
        self
    }

    pub fn with_voice_settings(mut self, settings: VoiceSettings) -> Self {
        self.voice_settings = settings;
        self
    }
}

/// Voice tuning bag. The effects are provider-defined; VoxCard only carries
/// the values through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Voice consistency across renders (0.0-1.0).
    pub stability: f32,
    /// Similarity to the reference voice (0.0-1.0).
    pub similarity_boost: f32,
    /// Style exaggeration (0.0-1.0).
    pub style: f32,
    /// Provider-side loudness/clarity boost.
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.0,
            use_speaker_boost: true,
        }
    }
}
