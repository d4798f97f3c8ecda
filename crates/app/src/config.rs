//! Application configuration loaded from a TOML file

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use voxcard_foundation::AppError;
use voxcard_synth::SynthConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding cached audio blobs and the index file.
    pub cache_dir: PathBuf,
    /// Directory exported WAV files are written to.
    pub output_dir: PathBuf,
    /// API key used when neither the flag nor the environment provides one.
    pub api_key: Option<String>,
    /// Voice, locale and model defaults forwarded to the synthesis service.
    pub synth: SynthConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
            output_dir: PathBuf::from("exports"),
            api_key: None,
            synth: SynthConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read the config file, or fall back to defaults when it is absent.
    /// A present-but-invalid file is an error, never silently ignored.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str(&raw)
            .map_err(|e| AppError::Config(format!("invalid config {}: {e}", path.display())))
    }

    /// The API key to use, preferring the CLI/environment value.
    pub fn resolve_api_key(&self, cli_key: Option<String>) -> Result<String, AppError> {
        cli_key
            .or_else(|| self.api_key.clone())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config(
                    "no API key: pass --api-key, set ELEVENLABS_API_KEY, or add api_key to the config file"
                        .to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/voxcard.toml")).unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("cache"));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voxcard.toml");
        std::fs::write(&path, "cache_dir = \"/tmp/vc\"\napi_key = \"k\"\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/vc"));
        assert_eq!(config.output_dir, PathBuf::from("exports"));
        assert_eq!(config.synth.model_id, "eleven_multilingual_v2");
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voxcard.toml");
        std::fs::write(&path, "cache_dir = [nonsense").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn api_key_prefers_the_cli_value() {
        let mut config = AppConfig::default();
        config.api_key = Some("from-file".to_string());
        assert_eq!(
            config.resolve_api_key(Some("from-cli".to_string())).unwrap(),
            "from-cli"
        );
        assert_eq!(config.resolve_api_key(None).unwrap(), "from-file");
        config.api_key = None;
        assert!(config.resolve_api_key(None).is_err());
    }
}
