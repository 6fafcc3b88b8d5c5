//! Events emitted by the voice sessions to the UI / application layer.

use habitvox_core::{ErrorReport, HabitResponse};
use serde::Serialize;

/// Phase of a [`CheckInSession`](crate::CheckInSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum CheckInPhase {
    Idle,
    FetchingStack,
    /// Speaking the question for habit `habit` (zero-based).
    Prompting { habit: usize },
    Listening { habit: usize },
    /// The last answer matched nothing; a clarifying prompt follows.
    Ambiguous { habit: usize },
    AskingReflection,
    ListeningReflection,
    Submitting,
    Complete,
    Error,
}

/// Phase of a [`GoalsSession`](crate::GoalsSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalsPhase {
    Idle,
    Listening,
    TranscriptReady,
    AwaitingConfirmation,
    Submitting,
    Submitted,
    Cancelled,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SessionPhase {
    CheckIn(CheckInPhase),
    Goals(GoalsPhase),
}

impl From<CheckInPhase> for SessionPhase {
    fn from(phase: CheckInPhase) -> Self {
        Self::CheckIn(phase)
    }
}

impl From<GoalsPhase> for SessionPhase {
    fn from(phase: GoalsPhase) -> Self {
        Self::Goals(phase)
    }
}

/// Events emitted by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    PhaseChanged(SessionPhase),

    /// Text about to be spoken.
    Prompt(String),

    /// Something the user said.
    Transcript { text: String, is_final: bool },

    /// A habit answer was recorded.
    Recorded {
        habit_key: String,
        response: HabitResponse,
    },

    /// A failure, fatal or not.
    Error(ErrorReport),

    /// The session finished; `message` carries the technical error on
    /// failure.
    Completed {
        success: bool,
        message: Option<String>,
    },
}
