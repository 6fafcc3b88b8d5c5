//! Voice session state machines.
//!
//! Both sessions are non-reentrant: `start()` while a run is in progress
//! returns [`AlreadyRunning`](CheckInOutcome::AlreadyRunning) without doing
//! anything. Only [`SessionError`] values end a run early; everything else
//! is reported on the event channel and the run carries on.

pub mod checkin;
pub mod goals;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use habitvox_core::{Categorized, Clock, ErrorKind, HabitApiError, HabitApiPort, IdentityPort};

use crate::error::VoiceError;
use crate::ports::{SpeechInput, SpeechOutput};

pub use checkin::{CheckInConfig, CheckInOutcome, CheckInSession};
pub use goals::{GoalConfirmation, GoalConfirmer, GoalsOutcome, GoalsSession};

/// Collaborators shared by both sessions.
#[derive(Clone)]
pub struct SessionContext {
    pub api: Arc<dyn HabitApiPort>,
    pub identity: Arc<dyn IdentityPort>,
    pub clock: Arc<dyn Clock>,
    pub speech: Arc<dyn SpeechOutput>,
    pub input: Arc<dyn SpeechInput>,
}

/// Outcomes that end a session run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("No signed-in user")]
    AuthRequired,

    #[error(transparent)]
    Api(#[from] HabitApiError),

    #[error("Habit stack has no habits")]
    EmptyStack,

    /// Listening failed where there is nothing to fall back to.
    #[error(transparent)]
    Speech(#[from] VoiceError),

    #[error("Session cancelled")]
    Cancelled,
}

impl Categorized for SessionError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthRequired => ErrorKind::AuthRequired,
            Self::Api(e) => e.kind(),
            Self::EmptyStack => ErrorKind::EmptyStack,
            Self::Speech(e) => e.kind(),
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}

/// Clears the re-entrancy flag when a run ends, however it ends.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);
        let guard = RunGuard::acquire(&flag).unwrap();
        assert!(RunGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(RunGuard::acquire(&flag).is_some());
    }

    #[test]
    fn api_errors_keep_their_kind() {
        let err = SessionError::from(HabitApiError::NotFound {
            message: "no stack for 2026-10-19".into(),
        });
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(SessionError::AuthRequired.kind(), ErrorKind::AuthRequired);
    }
}
