//! Tests for the ElevenLabs gateway

#[cfg(test)]
mod tests {
    use crate::ElevenLabsGateway;
    use voxcard_tts::{SynthesisGateway, SynthesisRequest, TtsError, VoiceSettings};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> SynthesisRequest {
        SynthesisRequest::new("El perro corre.", "eleven_multilingual_v2")
            .with_language("es-ES")
    }

    #[test]
    fn empty_api_key_is_a_configuration_error() {
        let result = ElevenLabsGateway::new("   ");
        assert!(matches!(result, Err(TtsError::Configuration(_))));
    }

    #[tokio::test]
    async fn empty_text_never_reaches_the_server() {
        let gateway = ElevenLabsGateway::with_base_url("key", "http://127.0.0.1:9").unwrap();
        let mut req = request();
        req.text = "  ".to_string();
        let result = gateway.convert("voice-1", &req).await;
        assert!(matches!(result, Err(TtsError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn successful_convert_returns_audio_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/text-to-speech/voice-1"))
            .and(header("xi-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "model_id": "eleven_multilingual_v2",
                "language_code": "es-ES",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp3-bytes".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = ElevenLabsGateway::with_base_url("test-key", server.uri()).unwrap();
        let audio = gateway.convert("voice-1", &request()).await.unwrap();
        assert_eq!(audio, b"mp3-bytes");
    }

    #[tokio::test]
    async fn voice_settings_are_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "voice_settings": { "stability": 0.9, "use_speaker_boost": false },
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = ElevenLabsGateway::with_base_url("test-key", server.uri()).unwrap();
        let req = request().with_voice_settings(VoiceSettings {
            stability: 0.9,
            use_speaker_boost: false,
            ..Default::default()
        });
        gateway.convert("voice-1", &req).await.unwrap();
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let gateway = ElevenLabsGateway::with_base_url("bad-key", server.uri()).unwrap();
        let result = gateway.convert("voice-1", &request()).await;
        assert!(matches!(result, Err(TtsError::AuthRejected(_))));
    }

    #[tokio::test]
    async fn server_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let gateway = ElevenLabsGateway::with_base_url("test-key", server.uri()).unwrap();
        match gateway.convert("voice-1", &request()).await {
            Err(TtsError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_body_is_an_empty_audio_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let gateway = ElevenLabsGateway::with_base_url("test-key", server.uri()).unwrap();
        let result = gateway.convert("voice-1", &request()).await;
        assert!(matches!(result, Err(TtsError::EmptyAudio)));
    }
}
