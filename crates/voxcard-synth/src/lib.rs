//! Cache-checked synthesis service for VoxCard
//!
//! Wraps a [`SynthesisGateway`] with the persistent [`AudioCache`]: hits
//! are served from disk, misses call the gateway at most once concurrently
//! per fingerprint, and successful results are stored before they are
//! returned. Failures are never cached.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use voxcard_cache::{AudioCache, Fingerprint, StoreMetadata};
use voxcard_tts::{SynthesisGateway, SynthesisRequest};

pub mod config;
pub mod error;

mod tests;

pub use config::{SynthConfig, SOURCE_LANGUAGE, TARGET_LANGUAGE};
pub use error::{SynthesisError, SynthesisResult};

/// The synthesis service. Cheap to clone conceptually via `reconfigure`;
/// gateway and cache are shared, configuration is immutable per instance.
pub struct SynthesisService {
    gateway: Arc<dyn SynthesisGateway>,
    cache: Arc<AudioCache>,
    config: SynthConfig,
    in_flight: Arc<Mutex<HashMap<Fingerprint, Arc<tokio::sync::Mutex<()>>>>>,
}

impl SynthesisService {
    pub fn new(gateway: Arc<dyn SynthesisGateway>, cache: Arc<AudioCache>, config: SynthConfig) -> Self {
        Self {
            gateway,
            cache,
            config,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Build a new effective instance with different configuration. The
    /// gateway, cache and in-flight table are shared; nothing is mutated.
    pub fn reconfigure(&self, config: SynthConfig) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            cache: Arc::clone(&self.cache),
            config,
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<AudioCache> {
        &self.cache
    }

    /// Synthesize one text fragment, cache-first.
    ///
    /// `language` is a selector ("source", "target") or a full locale tag;
    /// `voice` overrides the configured default for the resolved locale.
    pub async fn synthesize(
        &self,
        text: &str,
        language: &str,
        voice: Option<&str>,
    ) -> SynthesisResult<Vec<u8>> {
        let language_code = self.config.resolve_language(language);
        let voice_id = self.config.resolve_voice(&language_code, voice);
        let fingerprint = Fingerprint::compute(text, &voice_id, &language_code);

        if let Some(bytes) = self.cache.lookup(&fingerprint).await? {
            return Ok(bytes);
        }

        // One gateway call per fingerprint at a time: later callers queue on
        // the slot lock and re-check the cache once the leader finishes.
        let slot = {
            let mut in_flight = self.in_flight.lock();
            Arc::clone(
                in_flight
                    .entry(fingerprint)
                    .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
            )
        };
        let guard = slot.lock().await;
        let result = self
            .fetch_and_store(&fingerprint, text, &language_code, &voice_id)
            .await;
        // Every exit releases the slot, errors included; a leaked slot
        // would pin its map entry until a later success for the same triple.
        drop(guard);
        self.release_slot(&fingerprint, &slot);
        result
    }

    /// The slot-holding half of `synthesize`: recheck the cache, then call
    /// the gateway and persist the result.
    async fn fetch_and_store(
        &self,
        fingerprint: &Fingerprint,
        text: &str,
        language_code: &str,
        voice_id: &str,
    ) -> SynthesisResult<Vec<u8>> {
        if let Some(bytes) = self.cache.lookup(fingerprint).await? {
            return Ok(bytes);
        }

        debug!(%fingerprint, language = %language_code, voice = %voice_id, "Cache miss, calling gateway");
        let request = SynthesisRequest::new(text.trim(), self.config.model_id.clone())
            .with_language(language_code.to_string())
            .with_voice_settings(self.config.voice_settings.clone());
        let bytes = self.gateway.convert(voice_id, &request).await?;

        self.cache
            .store(
                fingerprint,
                StoreMetadata {
                    text: text.trim().to_string(),
                    voice_id: voice_id.to_string(),
                    language_code: language_code.to_string(),
                },
                &bytes,
            )
            .await?;
        Ok(bytes)
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Drop the slot once no other caller holds a clone of it.
    fn release_slot(&self, fingerprint: &Fingerprint, slot: &Arc<tokio::sync::Mutex<()>>) {
        let mut in_flight = self.in_flight.lock();
        // Two strong refs: the map's and ours. Anything more means a waiter
        // is still queued and will clean up in its turn.
        if Arc::strong_count(slot) <= 2 {
            in_flight.remove(fingerprint);
        }
    }
}
