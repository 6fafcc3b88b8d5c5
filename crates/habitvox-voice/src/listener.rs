//! Speech input listener — wraps a [`RecognitionEngine`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::VoiceError;
use crate::ports::{ListenOutcome, SpeechInput, TranscriptFragment};

/// Events a recognition engine emits during one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    Interim(String),
    Final(String),
    Error(VoiceError),
    /// The pass is over; nothing follows.
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecognitionOptions {
    pub continuous: bool,
    pub interim_results: bool,
}

impl RecognitionOptions {
    pub const SINGLE: Self = Self {
        continuous: false,
        interim_results: false,
    };

    pub const CONTINUOUS: Self = Self {
        continuous: true,
        interim_results: true,
    };
}

/// Speech-to-text engine.
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Begin one recognition pass. Events are sent on `events` and the pass
    /// ends with [`RecognitionEvent::End`] (or by dropping the sender).
    async fn start(
        &self,
        options: RecognitionOptions,
        events: mpsc::UnboundedSender<RecognitionEvent>,
    ) -> Result<(), VoiceError>;

    /// End the current pass early. Idempotent.
    fn stop(&self);
}

/// [`SpeechInput`] over a recognition engine.
pub struct SpeechInputListener {
    engine: Arc<dyn RecognitionEngine>,
    listening: AtomicBool,
}

impl SpeechInputListener {
    pub fn new(engine: Arc<dyn RecognitionEngine>) -> Self {
        Self {
            engine,
            listening: AtomicBool::new(false),
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    async fn begin(
        &self,
        options: RecognitionOptions,
    ) -> Result<mpsc::UnboundedReceiver<RecognitionEvent>, VoiceError> {
        if self
            .listening
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(VoiceError::Recognition("already listening".to_string()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        if let Err(e) = self.engine.start(options, tx).await {
            self.listening.store(false, Ordering::Release);
            return Err(e);
        }
        tracing::debug!(continuous = options.continuous, "Listening");
        Ok(rx)
    }

    fn end(&self) {
        self.listening.store(false, Ordering::Release);
    }
}

#[async_trait]
impl SpeechInput for SpeechInputListener {
    async fn listen_once(&self) -> ListenOutcome {
        let mut events = match self.begin(RecognitionOptions::SINGLE).await {
            Ok(rx) => rx,
            Err(e) => return ListenOutcome::Error(e),
        };

        let mut transcript: Option<String> = None;
        let outcome = loop {
            match events.recv().await {
                Some(RecognitionEvent::Final(text)) => {
                    let text = text.trim();
                    if transcript.is_none() && !text.is_empty() {
                        transcript = Some(text.to_string());
                    }
                }
                Some(RecognitionEvent::Interim(_)) => {}
                Some(RecognitionEvent::Error(e)) => {
                    self.engine.stop();
                    break ListenOutcome::Error(e);
                }
                Some(RecognitionEvent::End) | None => {
                    break transcript.map_or(ListenOutcome::NoResult, ListenOutcome::Transcript);
                }
            }
        };

        self.end();
        outcome
    }

    async fn listen_continuous(&self) -> Result<Vec<TranscriptFragment>, VoiceError> {
        let mut events = self.begin(RecognitionOptions::CONTINUOUS).await?;

        let mut fragments = Vec::new();
        let result = loop {
            match events.recv().await {
                Some(RecognitionEvent::Interim(text)) => {
                    fragments.push(TranscriptFragment::new(text, false));
                }
                Some(RecognitionEvent::Final(text)) => {
                    fragments.push(TranscriptFragment::new(text, true));
                }
                Some(RecognitionEvent::Error(e)) => {
                    self.engine.stop();
                    break Err(e);
                }
                Some(RecognitionEvent::End) | None => break Ok(fragments),
            }
        };

        self.end();
        if let Ok(ref fragments) = result {
            tracing::debug!(fragments = fragments.len(), "Continuous listening ended");
        }
        result
    }

    fn stop(&self) {
        if self.is_listening() {
            self.engine.stop();
        }
    }
}
