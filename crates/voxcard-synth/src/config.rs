//! Synthesis service configuration
//!
//! Voice and language defaults are configuration, not business logic: the
//! service is constructed with an explicit `SynthConfig` and reconfigured
//! by building a new instance, never by mutating shared state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use voxcard_tts::VoiceSettings;

/// Deck-side language selectors.
pub const SOURCE_LANGUAGE: &str = "source";
pub const TARGET_LANGUAGE: &str = "target";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Provider model used for every request.
    pub model_id: String,
    /// Selector -> full locale tag (e.g. "target" -> "es-ES").
    pub locales: HashMap<String, String>,
    /// Locale tag -> default voice id.
    pub default_voices: HashMap<String, String>,
    /// Voice used when a locale has no configured default.
    pub fallback_voice: String,
    /// Provider voice tuning, forwarded with every request.
    pub voice_settings: VoiceSettings,
}

impl Default for SynthConfig {
    fn default() -> Self {
        let locales = HashMap::from([
            (SOURCE_LANGUAGE.to_string(), "en-US".to_string()),
            (TARGET_LANGUAGE.to_string(), "es-ES".to_string()),
        ]);
        let default_voices = HashMap::from([
            ("en-US".to_string(), "21m00Tcm4TlvDq8ikWAM".to_string()),
            ("es-ES".to_string(), "ErXwobaYiN019PkySvjV".to_string()),
        ]);
        Self {
            model_id: "eleven_multilingual_v2".to_string(),
            locales,
            default_voices,
            fallback_voice: "21m00Tcm4TlvDq8ikWAM".to_string(),
            voice_settings: VoiceSettings::default(),
        }
    }
}

impl SynthConfig {
    /// Map a selector ("source", "target") to its locale tag. Anything that
    /// is not a configured selector is assumed to already be a locale tag.
    pub fn resolve_language(&self, selector: &str) -> String {
        self.locales
            .get(selector)
            .cloned()
            .unwrap_or_else(|| selector.to_string())
    }

    /// Pick the voice for a locale, honoring an explicit caller override.
    pub fn resolve_voice(&self, language_code: &str, explicit: Option<&str>) -> String {
        if let Some(voice) = explicit {
            return voice.to_string();
        }
        self.default_voices
            .get(language_code)
            .cloned()
            .unwrap_or_else(|| self.fallback_voice.clone())
    }
}
