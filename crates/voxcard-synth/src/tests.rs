//! Tests for the synthesis service

#[cfg(test)]
mod tests {
    use crate::{SynthConfig, SynthesisError, SynthesisService, TARGET_LANGUAGE};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Notify;
    use voxcard_cache::{AudioCache, Fingerprint};
    use voxcard_tts::{SynthesisGateway, SynthesisRequest, TtsError, TtsResult};

    /// Gateway fake that counts invocations and can hold each call open
    /// until released.
    struct CountingGateway {
        calls: AtomicUsize,
        hold: Option<Arc<Notify>>,
        started: Arc<Notify>,
        fail_first: AtomicUsize,
    }

    impl CountingGateway {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                hold: None,
                started: Arc::new(Notify::new()),
                fail_first: AtomicUsize::new(0),
            })
        }

        fn held() -> (Arc<Self>, Arc<Notify>) {
            let release = Arc::new(Notify::new());
            let gateway = Arc::new(Self {
                calls: AtomicUsize::new(0),
                hold: Some(Arc::clone(&release)),
                started: Arc::new(Notify::new()),
                fail_first: AtomicUsize::new(0),
            });
            (gateway, release)
        }

        fn failing_once() -> Arc<Self> {
            let gateway = Self::new();
            gateway.fail_first.store(1, Ordering::SeqCst);
            gateway
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SynthesisGateway for CountingGateway {
        fn name(&self) -> &str {
            "counting-fake"
        }

        async fn convert(&self, voice_id: &str, request: &SynthesisRequest) -> TtsResult<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.started.notify_one();
            if let Some(hold) = &self.hold {
                hold.notified().await;
            }
            if self.fail_first.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                n.checked_sub(1)
            }) == Ok(1)
            {
                return Err(TtsError::Api {
                    status: 500,
                    message: "synthetic failure".to_string(),
                });
            }
            Ok(format!("audio:{voice_id}:{}", request.text).into_bytes())
        }
    }

    async fn service_with(gateway: Arc<CountingGateway>) -> (SynthesisService, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(AudioCache::open(dir.path()).await.unwrap());
        let service = SynthesisService::new(gateway, cache, SynthConfig::default());
        (service, dir)
    }

    #[tokio::test]
    async fn second_request_is_served_from_cache() {
        let gateway = CountingGateway::new();
        let (service, _dir) = service_with(Arc::clone(&gateway)).await;

        let first = service.synthesize("hola", TARGET_LANGUAGE, None).await.unwrap();
        let second = service.synthesize("hola", TARGET_LANGUAGE, None).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_identical_requests_hit_the_gateway_once() {
        let (gateway, release) = CountingGateway::held();
        let (service, _dir) = service_with(Arc::clone(&gateway)).await;
        let service = Arc::new(service);

        let a = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.synthesize("hola", TARGET_LANGUAGE, None).await })
        };
        gateway.started.notified().await;

        let b = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.synthesize("hola", TARGET_LANGUAGE, None).await })
        };
        // Let the second caller reach the in-flight slot before releasing.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        release.notify_waiters();

        let first = a.await.unwrap().unwrap();
        let second = b.await.unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn distinct_texts_are_separate_gateway_calls() {
        let gateway = CountingGateway::new();
        let (service, _dir) = service_with(Arc::clone(&gateway)).await;

        service.synthesize("uno", TARGET_LANGUAGE, None).await.unwrap();
        service.synthesize("dos", TARGET_LANGUAGE, None).await.unwrap();
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn gateway_failure_is_not_cached() {
        let gateway = CountingGateway::failing_once();
        let (service, _dir) = service_with(Arc::clone(&gateway)).await;

        let err = service.synthesize("hola", TARGET_LANGUAGE, None).await.unwrap_err();
        assert!(matches!(err, SynthesisError::SynthesisFailed(_)));
        assert_eq!(service.cache().stats().count, 0);

        // The next attempt goes back to the gateway and succeeds.
        service.synthesize("hola", TARGET_LANGUAGE, None).await.unwrap();
        assert_eq!(gateway.call_count(), 2);
        assert_eq!(service.cache().stats().count, 1);
    }

    #[tokio::test]
    async fn gateway_failure_releases_the_in_flight_slot() {
        let gateway = CountingGateway::failing_once();
        let (service, _dir) = service_with(Arc::clone(&gateway)).await;

        service.synthesize("hola", TARGET_LANGUAGE, None).await.unwrap_err();
        assert_eq!(service.in_flight_len(), 0);
    }

    #[tokio::test]
    async fn cache_store_failure_releases_the_in_flight_slot() {
        let gateway = CountingGateway::new();
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(AudioCache::open(dir.path()).await.unwrap());
        let service = SynthesisService::new(gateway, cache, SynthConfig::default());

        // Pull the cache directory out from under the store so the blob
        // write fails after a successful gateway call.
        std::fs::remove_dir_all(dir.path()).unwrap();

        let err = service.synthesize("hola", TARGET_LANGUAGE, None).await.unwrap_err();
        assert!(matches!(err, SynthesisError::Cache(_)));
        assert_eq!(service.in_flight_len(), 0);
    }

    #[tokio::test]
    async fn default_voice_is_keyed_by_resolved_language() {
        let gateway = CountingGateway::new();
        let (service, _dir) = service_with(Arc::clone(&gateway)).await;
        let config = service.config().clone();

        service.synthesize("hola", TARGET_LANGUAGE, None).await.unwrap();

        let language = config.resolve_language(TARGET_LANGUAGE);
        let voice = config.resolve_voice(&language, None);
        let fingerprint = Fingerprint::compute("hola", &voice, &language);
        assert!(service.cache().lookup(&fingerprint).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn explicit_voice_overrides_the_default() {
        let gateway = CountingGateway::new();
        let (service, _dir) = service_with(Arc::clone(&gateway)).await;

        let bytes = service
            .synthesize("hola", TARGET_LANGUAGE, Some("custom-voice"))
            .await
            .unwrap();
        assert_eq!(bytes, b"audio:custom-voice:hola");
    }

    #[tokio::test]
    async fn unknown_selector_passes_through_as_locale() {
        let config = SynthConfig::default();
        assert_eq!(config.resolve_language("target"), "es-ES");
        assert_eq!(config.resolve_language("source"), "en-US");
        assert_eq!(config.resolve_language("fr-FR"), "fr-FR");
    }

    #[tokio::test]
    async fn reconfigure_returns_a_new_effective_instance() {
        let gateway = CountingGateway::new();
        let (service, _dir) = service_with(Arc::clone(&gateway)).await;

        let mut config = service.config().clone();
        config
            .locales
            .insert("target".to_string(), "de-DE".to_string());
        let reconfigured = service.reconfigure(config);

        assert_eq!(service.config().resolve_language("target"), "es-ES");
        assert_eq!(reconfigured.config().resolve_language("target"), "de-DE");
    }
}
