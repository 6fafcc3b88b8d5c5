//! Voice layer for habitvox.
//!
//! - [`SpeechOutputDispatcher`]: one `speak` contract over ordered speech
//!   providers with single-hop failover and at-most-one playback.
//! - [`backend`]: the network and on-device providers.
//! - [`SpeechInputListener`]: speech-to-text over a [`RecognitionEngine`].
//! - [`CheckInSession`] / [`GoalsSession`]: the voice-driven state machines,
//!   emitting [`SessionEvent`]s.
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use chrono as _;
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tokio_test as _;

pub mod backend;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod listener;
pub mod playback;
pub mod ports;
pub mod session;

// Re-export key types for convenience
pub use backend::command_engine::CommandSynthesisEngine;
pub use backend::network::{NETWORK_PROVIDER_NAME, NetworkTtsConfig, NetworkTtsProvider};
pub use backend::on_device::{
    ON_DEVICE_PROVIDER_NAME, OnDeviceProvider, SynthesisEngine, Utterance, VoiceInfo, VoiceRetry,
};
pub use backend::{
    AudioHandle, HandleBasedProvider, ProviderCapability, SelfManagedProvider, SpeechProvider,
    UtteranceCallbacks,
};
pub use dispatcher::{ProviderStatus, SpeechOutputDispatcher};
pub use error::{UpstreamKind, VoiceError};
pub use events::{CheckInPhase, GoalsPhase, SessionEvent, SessionPhase};
pub use listener::{RecognitionEngine, RecognitionEvent, RecognitionOptions, SpeechInputListener};
pub use playback::{AudioPlayer, RodioAudioPlayer};
pub use ports::{ListenOutcome, SpeechInput, SpeechOutput, TranscriptFragment};
pub use session::{
    CheckInConfig, CheckInOutcome, CheckInSession, GoalConfirmation, GoalConfirmer, GoalsOutcome,
    GoalsSession, SessionContext, SessionError,
};
