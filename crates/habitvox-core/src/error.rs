//! Error taxonomy shared by every habitvox crate.
//!
//! Adapter crates keep their own error enums and map them onto an
//! [`ErrorKind`] at the boundary. The kind decides the redacted message a
//! user sees; the technical detail travels alongside it in an
//! [`ErrorReport`] and is never spoken.

use serde::{Deserialize, Serialize};

/// Category of a failure, independent of where it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No resolved user identity, or the backend rejected the credentials.
    AuthRequired,
    /// Missing credentials, endpoints or an unusable upstream payload.
    Configuration,
    /// Nothing stored for the requested user/date.
    NotFound,
    /// Malformed payload or date.
    BadRequest,
    /// Upstream asked us to slow down.
    RateLimited,
    /// Upstream 5xx, network failure or timeout.
    Unavailable,
    /// A required speech capability is not present on this machine.
    Unsupported,
    /// On-device synthesis failed.
    Synthesis,
    /// A network speech provider failed.
    Upstream,
    /// A spoken answer matched no known keyword.
    Ambiguous,
    /// The fetched habit stack had no usable habits.
    EmptyStack,
    /// The user stopped the session.
    Cancelled,
}

impl ErrorKind {
    /// Redacted, user-facing message for this kind.
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::AuthRequired => "Please sign in to continue.",
            Self::Configuration => "The app isn't set up correctly. Please contact support.",
            Self::NotFound => "There's no habit stack for today yet.",
            Self::BadRequest => "Something about that request wasn't right. Please try again.",
            Self::RateLimited => "Too many requests right now. Please wait a moment.",
            Self::Unavailable => "The service is unavailable. Please try again later.",
            Self::Unsupported => "Speech isn't supported on this device.",
            Self::Synthesis | Self::Upstream => "I couldn't speak that out loud.",
            Self::Ambiguous => "Sorry, I didn't understand that.",
            Self::EmptyStack => "Your habit stack is empty. Set some goals first.",
            Self::Cancelled => "Okay, stopping here.",
        }
    }

    /// Whether a session must stop when it hits this kind.
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::AuthRequired)
    }
}

/// An error as surfaced on a status channel: kind, technical detail and the
/// redacted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub technical: String,
    pub user_message: String,
}

impl ErrorReport {
    pub fn new(kind: ErrorKind, technical: impl Into<String>) -> Self {
        Self {
            kind,
            technical: technical.into(),
            user_message: kind.user_message().to_string(),
        }
    }
}

/// Implemented by error enums that can be placed on a status channel.
pub trait Categorized: std::error::Error {
    fn kind(&self) -> ErrorKind;

    fn report(&self) -> ErrorReport {
        ErrorReport::new(self.kind(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_auth_is_fatal() {
        assert!(ErrorKind::AuthRequired.is_fatal());
        assert!(!ErrorKind::Unavailable.is_fatal());
        assert!(!ErrorKind::Ambiguous.is_fatal());
    }

    #[test]
    fn report_carries_redacted_message() {
        let report = ErrorReport::new(ErrorKind::Unavailable, "connect ECONNREFUSED 10.0.0.4:443");
        assert_eq!(report.user_message, ErrorKind::Unavailable.user_message());
        assert!(!report.user_message.contains("10.0.0.4"));
        assert!(report.technical.contains("10.0.0.4"));
    }
}
