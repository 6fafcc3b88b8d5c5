//! Speech output provider traits.
//!
//! Providers come in two playback shapes, and the
//! [`SpeechOutputDispatcher`](crate::dispatcher::SpeechOutputDispatcher)
//! branches on the declared [`ProviderCapability`]:
//!
//! | Shape          | Trait                   | Who drives playback |
//! |----------------|-------------------------|---------------------|
//! | audio handle   | [`HandleBasedProvider`] | dispatcher plays the returned [`AudioHandle`] |
//! | self-managed   | [`SelfManagedProvider`] | provider reports through [`UtteranceCallbacks`] |
//!
//! ## Implementations
//!
//! | Module        | Provider | Shape |
//! |---------------|----------|-------|
//! | [`network`]   | [`NetworkTtsProvider`](network::NetworkTtsProvider) | audio handle |
//! | [`on_device`] | [`OnDeviceProvider`](on_device::OnDeviceProvider)   | self-managed |

pub mod command_engine;
pub mod network;
pub mod on_device;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::error::VoiceError;

// ── Audio handles ──────────────────────────────────────────────────

/// A prepared, playable piece of audio.
#[async_trait]
pub trait AudioHandle: Send + Sync {
    /// Play to the end.
    ///
    /// Resolves `Ok(())` when playback finishes or after [`pause`](Self::pause)
    /// cuts it short; `Err` only for decode / device failures.
    async fn play(&self) -> Result<(), VoiceError>;

    /// Stop playback. Idempotent.
    fn pause(&self);
}

// ── Self-managed completion ────────────────────────────────────────

/// Completion / error callbacks handed to a [`SelfManagedProvider`].
///
/// Exactly one of the two is consumed per utterance. Dropping the value
/// without calling either is reported to the waiting side as a synthesis
/// failure.
pub struct UtteranceCallbacks {
    done: oneshot::Sender<Result<(), VoiceError>>,
}

impl UtteranceCallbacks {
    /// Create callbacks plus the receiver the dispatcher awaits.
    pub fn new() -> (Self, oneshot::Receiver<Result<(), VoiceError>>) {
        let (done, rx) = oneshot::channel();
        (Self { done }, rx)
    }

    pub fn on_complete(self) {
        let _ = self.done.send(Ok(()));
    }

    pub fn on_error(self, err: VoiceError) {
        let _ = self.done.send(Err(err));
    }
}

// ── Provider traits ────────────────────────────────────────────────

/// Provider that hands back an [`AudioHandle`] for the caller to play.
#[async_trait]
pub trait HandleBasedProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn is_available(&self) -> bool;

    /// Synthesize `text` and return a playable handle.
    async fn prepare(&self, text: &str) -> Result<Box<dyn AudioHandle>, VoiceError>;
}

/// Provider that plays on its own and reports completion through callbacks.
#[async_trait]
pub trait SelfManagedProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn is_available(&self) -> bool;

    /// Start speaking `text`.
    ///
    /// An `Err` means the utterance never started and `callbacks` were not
    /// used. On `Ok`, exactly one callback fires when the utterance ends;
    /// [`stop`](Self::stop) ends it early.
    async fn speak(&self, text: &str, callbacks: UtteranceCallbacks) -> Result<(), VoiceError>;

    /// Cancel the current utterance. Idempotent.
    fn stop(&self);
}

/// Declared playback shape of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderCapability {
    AudioHandle,
    SelfManaged,
}

/// A registered speech output provider.
#[derive(Clone)]
pub enum SpeechProvider {
    HandleBased(Arc<dyn HandleBasedProvider>),
    SelfManaged(Arc<dyn SelfManagedProvider>),
}

impl SpeechProvider {
    pub fn handle_based(provider: impl HandleBasedProvider + 'static) -> Self {
        Self::HandleBased(Arc::new(provider))
    }

    pub fn self_managed(provider: impl SelfManagedProvider + 'static) -> Self {
        Self::SelfManaged(Arc::new(provider))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::HandleBased(p) => p.name(),
            Self::SelfManaged(p) => p.name(),
        }
    }

    pub const fn capability(&self) -> ProviderCapability {
        match self {
            Self::HandleBased(_) => ProviderCapability::AudioHandle,
            Self::SelfManaged(_) => ProviderCapability::SelfManaged,
        }
    }

    pub async fn is_available(&self) -> bool {
        match self {
            Self::HandleBased(p) => p.is_available().await,
            Self::SelfManaged(p) => p.is_available().await,
        }
    }
}

impl std::fmt::Debug for SpeechProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechProvider")
            .field("name", &self.name())
            .field("capability", &self.capability())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn callbacks_deliver_exactly_one_result() {
        let (callbacks, rx) = UtteranceCallbacks::new();
        callbacks.on_error(VoiceError::Synthesis("engine crashed".into()));
        assert_eq!(
            rx.await.unwrap(),
            Err(VoiceError::Synthesis("engine crashed".into()))
        );
    }

    #[tokio::test]
    async fn dropped_callbacks_close_the_channel() {
        let (callbacks, rx) = UtteranceCallbacks::new();
        drop(callbacks);
        assert!(rx.await.is_err());
    }
}
