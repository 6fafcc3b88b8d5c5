//! Network speech provider — remote TTS endpoint returning a media URL.
//!
//! `POST {endpoint}` with `{ "text", "voice_id"? }` answers
//! `{ "audio_url" }` or `{ "error" }`. A relative `audio_url` is resolved
//! against the endpoint. The audio itself is fetched and played through an
//! [`AudioPlayer`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{AudioHandle, HandleBasedProvider};
use crate::error::{UpstreamKind, VoiceError};
use crate::playback::AudioPlayer;

/// Default provider name used in logs and switch notifications.
pub const NETWORK_PROVIDER_NAME: &str = "network";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Configuration for [`NetworkTtsProvider`].
#[derive(Debug, Clone)]
pub struct NetworkTtsConfig {
    pub(crate) endpoint: Url,
    pub(crate) voice_id: Option<String>,
    pub(crate) token: Option<String>,
    pub(crate) timeout: Duration,
}

impl NetworkTtsConfig {
    #[must_use]
    pub const fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            voice_id: None,
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Provider-side voice identifier sent with every request.
    #[must_use]
    pub fn with_voice_id(mut self, voice_id: Option<String>) -> Self {
        self.voice_id = voice_id.filter(|v| !v.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_id: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
struct SynthesisResponse {
    #[serde(default)]
    audio_url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Speech provider backed by a remote TTS endpoint.
pub struct NetworkTtsProvider {
    name: String,
    client: reqwest::Client,
    config: NetworkTtsConfig,
    player: Arc<dyn AudioPlayer>,
}

impl NetworkTtsProvider {
    pub fn new(config: NetworkTtsConfig, player: Arc<dyn AudioPlayer>) -> Result<Self, VoiceError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("habitvox/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VoiceError::Configuration(e.to_string()))?;

        Ok(Self {
            name: NETWORK_PROVIDER_NAME.to_string(),
            client,
            config,
            player,
        })
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Ask the endpoint for audio and resolve the absolute media URL.
    async fn request_audio_url(&self, text: &str) -> Result<Url, VoiceError> {
        let body = SynthesisRequest {
            text,
            voice_id: self.config.voice_id.as_deref(),
        };

        let mut request = self
            .client
            .post(self.config.endpoint.clone())
            .json(&body)
            .timeout(self.config.timeout);
        if let Some(ref token) = self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(&e, self.config.timeout))?;
        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| transport_error(&e, self.config.timeout))?;

        let parsed: SynthesisResponse = if raw.trim().is_empty() {
            SynthesisResponse::default()
        } else {
            serde_json::from_str(&raw).unwrap_or_default()
        };

        if !status.is_success() {
            let code = status.as_u16();
            return Err(VoiceError::Upstream {
                status: code,
                kind: UpstreamKind::from_status(code),
                message: parsed.error.unwrap_or_else(|| truncate(&raw)),
            });
        }

        let Some(audio_url) = parsed.audio_url.filter(|u| !u.trim().is_empty()) else {
            return Err(match parsed.error {
                Some(message) => VoiceError::Upstream {
                    status: status.as_u16(),
                    kind: UpstreamKind::Other,
                    message,
                },
                None => VoiceError::Configuration("response carried no audio_url".to_string()),
            });
        };

        self.config
            .endpoint
            .join(audio_url.trim())
            .map_err(|e| VoiceError::Configuration(format!("invalid audio_url {audio_url:?}: {e}")))
    }
}

#[async_trait]
impl HandleBasedProvider for NetworkTtsProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        self.player.is_available()
    }

    async fn prepare(&self, text: &str) -> Result<Box<dyn AudioHandle>, VoiceError> {
        let url = self.request_audio_url(text).await?;
        tracing::debug!(provider = %self.name, audio_url = %url, "Network speech ready");
        self.player.load(&url).await
    }
}

pub(crate) fn transport_error(err: &reqwest::Error, timeout: Duration) -> VoiceError {
    if err.is_timeout() {
        VoiceError::Timeout(timeout)
    } else {
        VoiceError::Network(err.to_string())
    }
}

fn truncate(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        "no response body".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    /// Player that records the URL it was asked to load.
    #[derive(Default)]
    struct RecordingPlayer {
        loaded: Mutex<Vec<Url>>,
    }

    struct SilentHandle;

    #[async_trait]
    impl AudioHandle for SilentHandle {
        async fn play(&self) -> Result<(), VoiceError> {
            Ok(())
        }

        fn pause(&self) {}
    }

    #[async_trait]
    impl AudioPlayer for RecordingPlayer {
        fn is_available(&self) -> bool {
            true
        }

        async fn load(&self, url: &Url) -> Result<Box<dyn AudioHandle>, VoiceError> {
            self.loaded.lock().unwrap().push(url.clone());
            Ok(Box::new(SilentHandle))
        }
    }

    async fn provider(server: &MockServer, player: Arc<RecordingPlayer>) -> NetworkTtsProvider {
        let endpoint = Url::parse(&format!("{}/api/tts", server.uri())).unwrap();
        NetworkTtsProvider::new(
            NetworkTtsConfig::new(endpoint)
                .with_voice_id(Some("voice-7".into()))
                .with_timeout(Duration::from_millis(500)),
            player,
        )
        .unwrap()
    }

    async fn respond(status: u16, body: serde_json::Value) -> Result<Box<dyn AudioHandle>, VoiceError> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/tts"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;
        provider(&server, Arc::new(RecordingPlayer::default()))
            .await
            .prepare("hello")
            .await
    }

    #[tokio::test]
    async fn relative_audio_url_is_resolved_against_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/tts"))
            .and(body_json(json!({"text": "Good morning", "voice_id": "voice-7"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"audio_url": "/audio/abc.mp3"})),
            )
            .mount(&server)
            .await;

        let player = Arc::new(RecordingPlayer::default());
        let provider = provider(&server, Arc::clone(&player)).await;
        provider.prepare("Good morning").await.unwrap();

        let loaded = player.loaded.lock().unwrap();
        assert_eq!(loaded[0].as_str(), format!("{}/audio/abc.mp3", server.uri()));
    }

    #[tokio::test]
    async fn missing_audio_url_is_configuration_error() {
        let err = respond(200, json!({"ok": true})).await.err().unwrap();
        assert!(matches!(err, VoiceError::Configuration(_)));
    }

    #[tokio::test]
    async fn status_codes_are_sub_classified() {
        let err = respond(429, json!({"error": "quota exceeded"})).await.err().unwrap();
        assert_eq!(
            err,
            VoiceError::Upstream {
                status: 429,
                kind: UpstreamKind::RateLimited,
                message: "quota exceeded".into()
            }
        );

        let err = respond(403, json!({"error": "bad key"})).await.err().unwrap();
        assert!(matches!(err, VoiceError::Upstream { kind: UpstreamKind::Auth, .. }));

        let err = respond(500, json!({})).await.err().unwrap();
        assert!(matches!(err, VoiceError::Upstream { kind: UpstreamKind::Other, .. }));
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"audio_url": "https://cdn.example/a.mp3"}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = provider(&server, Arc::new(RecordingPlayer::default()))
            .await
            .prepare("hello")
            .await
            .err()
            .unwrap();
        assert_eq!(err, VoiceError::Timeout(Duration::from_millis(500)));
        assert_eq!(err.to_string(), "Speech request timed out after 500ms");
    }
}
