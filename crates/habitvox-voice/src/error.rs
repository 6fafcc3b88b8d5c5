//! Voice error types.

use std::time::Duration;

use habitvox_core::{Categorized, ErrorKind};

/// Sub-classification of a non-2xx answer from a network speech provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamKind {
    /// 429.
    RateLimited,
    /// 401 / 403.
    Auth,
    Other,
}

impl UpstreamKind {
    pub const fn from_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimited,
            401 | 403 => Self::Auth,
            _ => Self::Other,
        }
    }
}

/// Errors from speech output, playback and recognition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoiceError {
    /// The synthesis engine or audio device is absent.
    #[error("Speech is not supported here: {0}")]
    Unsupported(String),

    /// On-device synthesis failed.
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    /// Network speech provider answered with a non-2xx status.
    #[error("Speech provider returned {status} ({kind:?}): {message}")]
    Upstream {
        status: u16,
        kind: UpstreamKind,
        message: String,
    },

    /// Provider endpoint missing or its response carried no audio.
    #[error("Speech provider misconfigured: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Speech request timed out after {0:?}")]
    Timeout(Duration),

    /// Audio handle failed to decode or play.
    #[error("Audio playback failed: {0}")]
    Playback(String),

    #[error("Speech recognition failed: {0}")]
    Recognition(String),

    #[error("Nothing to speak")]
    EmptyText,

    #[error("No speech providers registered")]
    NoProviders,
}

impl Categorized for VoiceError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::Synthesis(_) | Self::Playback(_) => ErrorKind::Synthesis,
            Self::Upstream {
                kind: UpstreamKind::RateLimited,
                ..
            } => ErrorKind::RateLimited,
            Self::Upstream { .. } => ErrorKind::Upstream,
            Self::Configuration(_) | Self::NoProviders => ErrorKind::Configuration,
            Self::Network(_) | Self::Timeout(_) | Self::Recognition(_) => ErrorKind::Unavailable,
            Self::EmptyText => ErrorKind::BadRequest,
        }
    }
}
