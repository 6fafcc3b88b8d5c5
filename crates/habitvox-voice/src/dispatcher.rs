//! Speech output dispatcher — one speak contract over N ordered providers.
//!
//! ```text
//!   speak(text)
//!     │ empty text / no providers ──────────────► Err
//!     ▼
//!   stop() ─► attempt(active) ── ok ───────────► Ok
//!                 │ err
//!                 ▼ (≥2 providers)
//!           switch active → next ─► attempt(next) ── ok ─► Ok
//!                                       │ err
//!                                       ▼
//!                                  Err(second error)
//! ```
//!
//! At most one utterance plays at a time: every `speak` first stops the
//! previous one. A playback generation counter tells an interrupted
//! utterance apart from a failed one, so a `speak` cut short by a newer
//! `speak` or `stop` resolves `Ok(())` and never fails over.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::backend::{AudioHandle, ProviderCapability, SelfManagedProvider, SpeechProvider, UtteranceCallbacks};
use crate::error::VoiceError;
use crate::ports::SpeechOutput;

/// Observer invoked with `(previous, next)` provider names on failover.
pub type SwitchObserver = Box<dyn Fn(&str, &str) + Send + Sync>;

/// Availability report for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderStatus {
    pub name: String,
    pub capability: ProviderCapability,
    pub available: bool,
    pub active: bool,
}

/// Output currently owned by the dispatcher.
enum ActiveOutput {
    Handle(Arc<dyn AudioHandle>),
    SelfManaged(Arc<dyn SelfManagedProvider>),
}

impl ActiveOutput {
    fn halt(&self) {
        match self {
            Self::Handle(handle) => handle.pause(),
            Self::SelfManaged(provider) => provider.stop(),
        }
    }
}

#[derive(Default)]
struct PlaybackState {
    generation: u64,
    playing: bool,
    current: Option<ActiveOutput>,
}

pub struct SpeechOutputDispatcher {
    providers: Vec<SpeechProvider>,
    active: AtomicUsize,
    playback: Mutex<PlaybackState>,
    on_switch: Option<SwitchObserver>,
}

impl SpeechOutputDispatcher {
    /// Create a dispatcher over `providers` (in failover order).
    ///
    /// `default_provider` picks the initially active provider by name; an
    /// unknown or absent name selects the first one.
    pub fn new(providers: Vec<SpeechProvider>, default_provider: Option<&str>) -> Self {
        let active = default_provider
            .and_then(|name| providers.iter().position(|p| p.name() == name))
            .unwrap_or(0);

        if let Some(name) = default_provider {
            if providers.get(active).is_none_or(|p| p.name() != name) {
                tracing::warn!(requested = name, "Unknown default speech provider, using first");
            }
        }

        Self {
            providers,
            active: AtomicUsize::new(active),
            playback: Mutex::new(PlaybackState::default()),
            on_switch: None,
        }
    }

    #[must_use]
    pub fn with_switch_observer(mut self, observer: impl Fn(&str, &str) + Send + Sync + 'static) -> Self {
        self.on_switch = Some(Box::new(observer));
        self
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(SpeechProvider::name).collect()
    }

    /// Name of the provider the next `speak` will try first.
    pub fn active_provider(&self) -> Option<&str> {
        self.providers
            .get(self.active.load(Ordering::SeqCst))
            .map(SpeechProvider::name)
    }

    pub fn is_playing(&self) -> bool {
        self.state().playing
    }

    pub async fn available_providers(&self) -> Vec<ProviderStatus> {
        let active = self.active.load(Ordering::SeqCst);
        let mut statuses = Vec::with_capacity(self.providers.len());
        for (index, provider) in self.providers.iter().enumerate() {
            statuses.push(ProviderStatus {
                name: provider.name().to_string(),
                capability: provider.capability(),
                available: provider.is_available().await,
                active: index == active,
            });
        }
        statuses
    }

    /// Speak `text` on the active provider, failing over once.
    pub async fn speak(&self, text: &str) -> Result<(), VoiceError> {
        if text.trim().is_empty() {
            return Err(VoiceError::EmptyText);
        }
        if self.providers.is_empty() {
            return Err(VoiceError::NoProviders);
        }

        self.stop();
        let generation = {
            let mut state = self.state();
            state.generation += 1;
            state.playing = true;
            state.generation
        };

        let first = self.active.load(Ordering::SeqCst);
        let result = match self.attempt(first, text, generation).await {
            Ok(()) => Ok(()),
            Err(_) if self.is_interrupted(generation) => Ok(()),
            Err(err) if self.providers.len() > 1 => {
                let next = (first + 1) % self.providers.len();
                tracing::warn!(
                    provider = self.providers[first].name(),
                    error = %err,
                    "Speech provider failed, failing over"
                );
                self.switch_to(first, next);

                match self.attempt(next, text, generation).await {
                    Err(_) if self.is_interrupted(generation) => Ok(()),
                    other => other,
                }
            }
            Err(err) => Err(err),
        };

        self.finish(generation);
        if let Err(ref err) = result {
            tracing::warn!(error = %err, "Speech output failed");
        }
        result
    }

    /// Stop whatever is playing. Idempotent.
    pub fn stop(&self) {
        let current = {
            let mut state = self.state();
            state.generation += 1;
            state.playing = false;
            state.current.take()
        };
        if let Some(output) = current {
            tracing::debug!("Stopping speech output");
            output.halt();
        }
    }

    async fn attempt(&self, index: usize, text: &str, generation: u64) -> Result<(), VoiceError> {
        let provider = &self.providers[index];
        tracing::debug!(provider = provider.name(), "Speaking");

        match provider {
            SpeechProvider::HandleBased(p) => {
                let handle: Arc<dyn AudioHandle> = Arc::from(p.prepare(text).await?);
                if !self.register(generation, ActiveOutput::Handle(Arc::clone(&handle))) {
                    return Ok(());
                }
                handle.play().await
            }
            SpeechProvider::SelfManaged(p) => {
                if !self.register(generation, ActiveOutput::SelfManaged(Arc::clone(p))) {
                    return Ok(());
                }
                let (callbacks, done) = UtteranceCallbacks::new();
                p.speak(text, callbacks).await?;
                done.await.unwrap_or_else(|_| {
                    Err(VoiceError::Synthesis(
                        "utterance ended without reporting completion".to_string(),
                    ))
                })
            }
        }
    }

    /// Make `output` the current output unless `generation` was superseded.
    fn register(&self, generation: u64, output: ActiveOutput) -> bool {
        let mut state = self.state();
        if state.generation != generation {
            return false;
        }
        state.current = Some(output);
        true
    }

    fn finish(&self, generation: u64) {
        let mut state = self.state();
        if state.generation == generation {
            state.playing = false;
            state.current = None;
        }
    }

    fn is_interrupted(&self, generation: u64) -> bool {
        self.state().generation != generation
    }

    fn switch_to(&self, previous: usize, next: usize) {
        self.active.store(next, Ordering::SeqCst);
        let (prev_name, next_name) = (self.providers[previous].name(), self.providers[next].name());
        tracing::info!(from = prev_name, to = next_name, "Switched speech provider");
        if let Some(ref observer) = self.on_switch {
            observer(prev_name, next_name);
        }
    }

    fn state(&self) -> MutexGuard<'_, PlaybackState> {
        self.playback.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SpeechOutput for SpeechOutputDispatcher {
    async fn speak(&self, text: &str) -> Result<(), VoiceError> {
        Self::speak(self, text).await
    }

    fn stop(&self) {
        Self::stop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HandleBasedProvider;

    struct Named(&'static str);

    #[async_trait]
    impl HandleBasedProvider for Named {
        fn name(&self) -> &str {
            self.0
        }

        async fn is_available(&self) -> bool {
            self.0 != "offline"
        }

        async fn prepare(&self, _text: &str) -> Result<Box<dyn AudioHandle>, VoiceError> {
            Err(VoiceError::Network("unreachable".into()))
        }
    }

    fn providers(names: &[&'static str]) -> Vec<SpeechProvider> {
        names
            .iter()
            .map(|n| SpeechProvider::handle_based(Named(n)))
            .collect()
    }

    #[test]
    fn default_provider_by_name() {
        let dispatcher = SpeechOutputDispatcher::new(providers(&["a", "b", "c"]), Some("b"));
        assert_eq!(dispatcher.active_provider(), Some("b"));
    }

    #[test]
    fn unknown_default_falls_back_to_first() {
        let dispatcher = SpeechOutputDispatcher::new(providers(&["a", "b"]), Some("zzz"));
        assert_eq!(dispatcher.active_provider(), Some("a"));

        let dispatcher = SpeechOutputDispatcher::new(providers(&["a", "b"]), None);
        assert_eq!(dispatcher.active_provider(), Some("a"));
    }

    #[test]
    fn stop_when_idle_is_a_no_op() {
        let dispatcher = SpeechOutputDispatcher::new(providers(&["a"]), None);
        dispatcher.stop();
        dispatcher.stop();
        assert!(!dispatcher.is_playing());
    }

    #[tokio::test]
    async fn reports_availability() {
        let dispatcher = SpeechOutputDispatcher::new(providers(&["online", "offline"]), None);
        let statuses = dispatcher.available_providers().await;
        assert_eq!(statuses.len(), 2);
        assert!(statuses[0].available && statuses[0].active);
        assert!(!statuses[1].available && !statuses[1].active);
        assert_eq!(statuses[1].capability, ProviderCapability::AudioHandle);
    }

    #[tokio::test]
    async fn single_provider_failure_is_returned_without_switch() {
        let dispatcher = SpeechOutputDispatcher::new(providers(&["only"]), None);
        let err = dispatcher.speak("hello").await.unwrap_err();
        assert_eq!(err, VoiceError::Network("unreachable".into()));
        assert_eq!(dispatcher.active_provider(), Some("only"));
        assert!(!dispatcher.is_playing());
    }
}
