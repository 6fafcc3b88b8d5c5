//! Speech seams the sessions depend on.
//!
//! Sessions never touch a provider or recognition engine directly. They hold
//! an injected [`SpeechOutput`] (normally the
//! [`SpeechOutputDispatcher`](crate::SpeechOutputDispatcher)) and a
//! [`SpeechInput`] (normally the [`SpeechInputListener`](crate::SpeechInputListener)).

use async_trait::async_trait;

use crate::error::VoiceError;

/// Single speech output channel.
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    /// Speak `text`, resolving when playback ends.
    async fn speak(&self, text: &str) -> Result<(), VoiceError>;

    /// Cancel in-flight playback. Safe to call when idle.
    fn stop(&self);
}

/// Result of listening for one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenOutcome {
    Transcript(String),
    /// The engine ended without a usable result.
    NoResult,
    Error(VoiceError),
}

/// A transcript piece collected during continuous listening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptFragment {
    pub text: String,
    pub is_final: bool,
}

impl TranscriptFragment {
    pub fn new(text: impl Into<String>, is_final: bool) -> Self {
        Self {
            text: text.into(),
            is_final,
        }
    }
}

/// Speech-to-text input.
#[async_trait]
pub trait SpeechInput: Send + Sync {
    /// Listen for a single utterance.
    async fn listen_once(&self) -> ListenOutcome;

    /// Listen continuously (interim results on) until the engine ends or
    /// [`stop`](Self::stop) is called, returning every fragment in order.
    async fn listen_continuous(&self) -> Result<Vec<TranscriptFragment>, VoiceError>;

    /// End the current listening pass.
    fn stop(&self);
}

/// Join the final fragments of a continuous pass with single spaces.
pub fn join_final_fragments(fragments: &[TranscriptFragment]) -> String {
    fragments
        .iter()
        .filter(|f| f.is_final)
        .map(|f| f.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
