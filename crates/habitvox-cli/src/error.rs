//! CLI-specific error types and mappings.
//!
//! Errors from the core, API and voice crates are folded into [`CliError`],
//! which carries a sysexits-style exit code.

use habitvox_core::{HabitApiError, SettingsError};
use habitvox_voice::{SessionError, VoiceError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument or input error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Settings or wiring error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No usable credentials.
    #[error("Not signed in: {0}")]
    Auth(String),

    /// The habit backend failed or is unreachable.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Speech output or recognition failed.
    #[error("Speech error: {0}")]
    Speech(String),

    /// A session ended without completing.
    #[error("Session ended: {0}")]
    Session(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow sysexits.h where one fits; everything else is 1.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Session(_) => 1,
            Self::Arguments(_) => 64, // EX_USAGE
            Self::Backend(_) => 69,   // EX_UNAVAILABLE
            Self::Speech(_) => 71,    // EX_OSERR
            Self::Io(_) => 74,        // EX_IOERR
            Self::Auth(_) => 77,      // EX_NOPERM
            Self::Config(_) => 78,    // EX_CONFIG
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<HabitApiError> for CliError {
    fn from(err: HabitApiError) -> Self {
        match err {
            HabitApiError::AuthRequired { .. } => Self::Auth(err.to_string()),
            HabitApiError::Configuration { .. } => Self::Config(err.to_string()),
            _ => Self::Backend(err.to_string()),
        }
    }
}

impl From<VoiceError> for CliError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::EmptyText => Self::Arguments(err.to_string()),
            VoiceError::Configuration(_) | VoiceError::NoProviders => Self::Config(err.to_string()),
            _ => Self::Speech(err.to_string()),
        }
    }
}

impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::AuthRequired => {
                Self::Auth("set HABITVOX_USER_ID or pass --user-id".to_string())
            }
            SessionError::Api(api) => api.into(),
            SessionError::Speech(voice) => voice.into(),
            SessionError::EmptyStack | SessionError::Cancelled => Self::Session(err.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_errors_keep_their_category() {
        let err = CliError::from(SessionError::Api(HabitApiError::Unavailable {
            message: "connection refused".into(),
        }));
        assert!(matches!(err, CliError::Backend(_)));
        assert_eq!(err.exit_code(), 69);

        let err = CliError::from(SessionError::AuthRequired);
        assert_eq!(err.exit_code(), 77);

        let err = CliError::from(SessionError::Speech(VoiceError::NoProviders));
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn cancelled_session_is_a_plain_failure() {
        assert_eq!(CliError::from(SessionError::Cancelled).exit_code(), 1);
    }
}
