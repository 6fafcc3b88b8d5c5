//! On-device speech provider — wraps a local [`SynthesisEngine`].
//!
//! Engines may publish their voice list some time after start-up, so a
//! preferred voice is looked up with a bounded retry-with-backoff loop
//! before falling back to the engine default. Any pending utterance is
//! cancelled, and the engine given a short settle delay, before a new one
//! is submitted.
//!
//! Every [`stop`](SelfManagedProvider::stop) bumps a cancellation
//! generation. An utterance whose generation moved on while it was waiting
//! for a voice or the settle delay is dropped and reported complete, so at
//! most one utterance ever reaches the engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use super::{SelfManagedProvider, UtteranceCallbacks};
use crate::error::VoiceError;

pub const ON_DEVICE_PROVIDER_NAME: &str = "on-device";

/// A voice the engine can speak with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceInfo {
    pub name: String,
    pub language: Option<String>,
}

/// One request to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// `None` uses the engine's default voice.
    pub voice: Option<String>,
}

/// Local text-to-speech engine.
#[async_trait]
pub trait SynthesisEngine: Send + Sync {
    async fn voices(&self) -> Result<Vec<VoiceInfo>, VoiceError>;

    /// Speak one utterance, resolving when it ends or is cancelled.
    async fn speak(&self, utterance: Utterance) -> Result<(), VoiceError>;

    /// Cancel whatever is being spoken. Idempotent.
    fn cancel(&self);
}

/// Voice lookup retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceRetry {
    pub attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: u32,
}

impl Default for VoiceRetry {
    fn default() -> Self {
        Self {
            attempts: 5,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
            multiplier: 2,
        }
    }
}

/// Delay between cancelling an utterance and submitting the next one.
const CANCEL_SETTLE: Duration = Duration::from_millis(50);

pub struct OnDeviceProvider {
    name: String,
    engine: Option<Arc<dyn SynthesisEngine>>,
    preferred_voice: Option<String>,
    retry: VoiceRetry,
    cancel_settle: Duration,
    /// Outcome of the first voice lookup, reused for later utterances.
    resolved_voice: OnceCell<Option<String>>,
    /// Bumped by every `stop`.
    generation: Arc<AtomicU64>,
}

impl OnDeviceProvider {
    /// `engine` is `None` when no synthesis engine exists on this machine;
    /// every `speak` then fails with [`VoiceError::Unsupported`].
    pub fn new(engine: Option<Arc<dyn SynthesisEngine>>) -> Self {
        Self {
            name: ON_DEVICE_PROVIDER_NAME.to_string(),
            engine,
            preferred_voice: None,
            retry: VoiceRetry::default(),
            cancel_settle: CANCEL_SETTLE,
            resolved_voice: OnceCell::new(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    #[must_use]
    pub fn with_preferred_voice(mut self, voice: Option<String>) -> Self {
        self.preferred_voice = voice.filter(|v| !v.trim().is_empty());
        self
    }

    #[must_use]
    pub const fn with_retry(mut self, retry: VoiceRetry) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub const fn with_cancel_settle(mut self, delay: Duration) -> Self {
        self.cancel_settle = delay;
        self
    }

    /// Voices the engine currently reports; empty when there is no engine.
    pub async fn voices(&self) -> Result<Vec<VoiceInfo>, VoiceError> {
        match self.engine {
            Some(ref engine) => engine.voices().await,
            None => Ok(Vec::new()),
        }
    }

    async fn voice_for_utterance(&self, engine: &dyn SynthesisEngine) -> Option<String> {
        let Some(ref preferred) = self.preferred_voice else {
            return None;
        };
        self.resolved_voice
            .get_or_init(|| resolve_voice(engine, preferred, self.retry))
            .await
            .clone()
    }

    fn superseded(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != ticket
    }
}

/// Look `preferred` up in the engine's voice list, retrying with backoff.
pub async fn resolve_voice(
    engine: &dyn SynthesisEngine,
    preferred: &str,
    retry: VoiceRetry,
) -> Option<String> {
    let mut delay = retry.initial_delay;
    let attempts = retry.attempts.max(1);

    for attempt in 1..=attempts {
        match engine.voices().await {
            Ok(voices) => {
                if let Some(voice) = match_voice(&voices, preferred) {
                    tracing::debug!(voice = %voice.name, attempt, "Resolved preferred voice");
                    return Some(voice.name.clone());
                }
            }
            Err(e) => tracing::debug!(error = %e, attempt, "Voice list not ready"),
        }

        if attempt < attempts {
            tokio::time::sleep(delay).await;
            delay = (delay * retry.multiplier).min(retry.max_delay);
        }
    }

    tracing::warn!(preferred, attempts, "Preferred voice not found, using engine default");
    None
}

/// Exact (case-insensitive) name match first, then substring.
fn match_voice<'a>(voices: &'a [VoiceInfo], preferred: &str) -> Option<&'a VoiceInfo> {
    let wanted = preferred.trim().to_lowercase();
    voices
        .iter()
        .find(|v| v.name.to_lowercase() == wanted)
        .or_else(|| voices.iter().find(|v| v.name.to_lowercase().contains(&wanted)))
}

#[async_trait]
impl SelfManagedProvider for OnDeviceProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    async fn speak(&self, text: &str, callbacks: UtteranceCallbacks) -> Result<(), VoiceError> {
        let Some(ref engine) = self.engine else {
            return Err(VoiceError::Unsupported(
                "no speech synthesis engine available".to_string(),
            ));
        };

        let ticket = self.generation.load(Ordering::SeqCst);
        let voice = self.voice_for_utterance(engine.as_ref()).await;
        if self.superseded(ticket) {
            tracing::debug!("Utterance stopped during voice lookup");
            callbacks.on_complete();
            return Ok(());
        }

        engine.cancel();
        tokio::time::sleep(self.cancel_settle).await;
        if self.superseded(ticket) {
            tracing::debug!("Utterance stopped before it started");
            callbacks.on_complete();
            return Ok(());
        }

        let utterance = Utterance {
            text: text.to_string(),
            voice,
        };
        let engine = Arc::clone(engine);
        let generation = Arc::clone(&self.generation);
        tokio::spawn(async move {
            if generation.load(Ordering::SeqCst) != ticket {
                callbacks.on_complete();
                return;
            }
            match engine.speak(utterance).await {
                Ok(()) => callbacks.on_complete(),
                Err(e) => callbacks.on_error(e),
            }
        });
        Ok(())
    }

    fn stop(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(ref engine) = self.engine {
            engine.cancel();
        }
    }
}
