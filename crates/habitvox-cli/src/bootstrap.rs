//! CLI bootstrap - the composition root.
//!
//! This is the ONLY place where adapters are wired together:
//! - the backend client (via habitvox-api)
//! - the network and on-device speech providers behind one dispatcher
//! - the terminal recognizer behind the speech input listener
//!
//! Command handlers receive the composed [`CliContext`].

use std::sync::Arc;

use habitvox_api::{HabitApiClient, HabitApiConfig};
use habitvox_core::{
    Settings, StaticIdentity, SystemClock, TtsConfig, TtsConfigPort, validate_settings,
};
use habitvox_voice::{
    AudioPlayer, CheckInConfig, CommandSynthesisEngine, NETWORK_PROVIDER_NAME, NetworkTtsConfig,
    NetworkTtsProvider, ON_DEVICE_PROVIDER_NAME, OnDeviceProvider, RodioAudioPlayer,
    SessionContext, SpeechInputListener, SpeechOutputDispatcher, SpeechProvider, SynthesisEngine,
};
use url::Url;

use crate::error::CliError;
use crate::terminal::{ConsoleRecognizer, LineEditorConfirmer};

/// Synthesis endpoint, relative to the API base URL.
const TTS_PATH: &str = "/api/tts";

/// Fully composed application context for CLI commands.
pub struct CliContext {
    pub settings: Settings,
    pub api: Arc<HabitApiClient>,
    pub dispatcher: Arc<SpeechOutputDispatcher>,
    /// Also registered in the dispatcher; kept for voice listing.
    pub on_device: Arc<OnDeviceProvider>,
    pub listener: Arc<SpeechInputListener>,
    pub confirmer: Arc<LineEditorConfirmer>,
}

impl CliContext {
    /// Collaborators for a check-in or goals session.
    pub fn session_context(&self) -> SessionContext {
        SessionContext {
            api: self.api.clone(),
            identity: Arc::new(StaticIdentity::new(self.settings.user_id.clone())),
            clock: Arc::new(SystemClock),
            speech: self.dispatcher.clone(),
            input: self.listener.clone(),
        }
    }

    pub fn checkin_config(&self) -> CheckInConfig {
        CheckInConfig {
            max_clarifications: self.settings.effective_max_clarifications(),
        }
    }
}

/// Bootstrap the CLI application.
///
/// Validates settings, builds the backend client, reads the TTS config once
/// to pick the default speech provider, and registers both providers so a
/// failure on one can fail over to the other.
pub async fn bootstrap(settings: Settings) -> Result<CliContext, CliError> {
    validate_settings(&settings)?;

    let api = Arc::new(HabitApiClient::new(HabitApiConfig::from_settings(&settings))?);

    let tts = match api.fetch_tts_config().await {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Could not read TTS config, using on-device speech");
            TtsConfig::default()
        }
    };

    let engine = CommandSynthesisEngine::detect();
    if engine.is_none() {
        tracing::warn!("No speech synthesizer found on PATH (espeak-ng, espeak or say)");
    }
    let on_device = Arc::new(
        OnDeviceProvider::new(engine.map(|e| Arc::new(e) as Arc<dyn SynthesisEngine>))
            .with_preferred_voice(settings.preferred_voice.clone()),
    );

    let player: Arc<dyn AudioPlayer> =
        Arc::new(RodioAudioPlayer::new(settings.effective_tts_timeout())?);
    let network_config = NetworkTtsConfig::new(tts_endpoint(settings.effective_api_base_url())?)
        .with_voice_id(tts.fish_audio_voice_id.clone())
        .with_token(settings.auth_token.clone())
        .with_timeout(settings.effective_tts_timeout());
    let network = Arc::new(NetworkTtsProvider::new(network_config, player)?);

    let default = default_provider(&tts);
    tracing::info!(default, "Speech providers ready");
    let dispatcher = SpeechOutputDispatcher::new(
        vec![
            SpeechProvider::HandleBased(network),
            SpeechProvider::SelfManaged(on_device.clone()),
        ],
        Some(default),
    )
    .with_switch_observer(|from, to| {
        eprintln!("(speech switched from {from} to {to})");
    });

    let listener = SpeechInputListener::new(Arc::new(ConsoleRecognizer::default()));

    Ok(CliContext {
        settings,
        api,
        dispatcher: Arc::new(dispatcher),
        on_device,
        listener: Arc::new(listener),
        confirmer: Arc::new(LineEditorConfirmer::default()),
    })
}

/// Provider the dispatcher starts with.
pub const fn default_provider(tts: &TtsConfig) -> &'static str {
    if tts.use_fish_audio {
        NETWORK_PROVIDER_NAME
    } else {
        ON_DEVICE_PROVIDER_NAME
    }
}

/// Synthesis endpoint under `base`, keeping any path prefix.
pub fn tts_endpoint(base: &str) -> Result<Url, CliError> {
    let url = format!("{}{TTS_PATH}", base.trim_end_matches('/'));
    Url::parse(&url).map_err(|e| CliError::Config(format!("invalid TTS endpoint {url}: {e}")))
}
