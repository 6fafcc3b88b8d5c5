//! TTS configuration port, read once when speech providers are built.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::HabitApiError;

/// Which speech provider the backend prefers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsConfig {
    /// Prefer the network voice over on-device synthesis.
    #[serde(default)]
    pub use_fish_audio: bool,
    /// Provider-side voice identifier for the network voice.
    #[serde(default)]
    pub fish_audio_voice_id: Option<String>,
}

#[async_trait]
pub trait TtsConfigPort: Send + Sync {
    async fn fetch_tts_config(&self) -> Result<TtsConfig, HabitApiError>;
}
