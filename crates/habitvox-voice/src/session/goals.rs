//! Weekly goals session.
//!
//! ```text
//!   Idle → Listening → TranscriptReady → AwaitingConfirmation → Submitting → Submitted
//!                              │                  │
//!                              └── nothing heard  └── declined → Cancelled
//! ```
//!
//! Goals are never sent without an explicit confirmation, and the confirmer
//! may edit them first.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use habitvox_core::{Categorized, GoalSet, GoalSubmission, HabitStack, extract_goals, week_start};
use tokio::sync::mpsc;

use super::{RunGuard, SessionContext, SessionError};
use crate::events::{GoalsPhase, SessionEvent};
use crate::ports::join_final_fragments;

const GOALS_PROMPT: &str = "Tell me your goals for this week. Stop when you're done.";
const SAVED: &str = "Got it. Your goals are saved and your new habit stack is ready.";

/// The user's answer to the confirmation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalConfirmation {
    /// Submit these goals (possibly edited).
    Confirmed(Vec<String>),
    Cancelled,
}

/// Shows extracted goals to the user and collects confirmation / edits.
#[async_trait]
pub trait GoalConfirmer: Send + Sync {
    async fn confirm(&self, goals: &GoalSet) -> GoalConfirmation;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalsOutcome {
    AlreadyRunning,
    /// Listening produced no final transcript.
    NothingHeard,
    /// The user declined, or confirmed an empty list.
    Declined,
    Submitted { goals: GoalSet, stack: HabitStack },
}

pub struct GoalsSession {
    ctx: SessionContext,
    confirmer: Arc<dyn GoalConfirmer>,
    running: AtomicBool,
    cancelled: AtomicBool,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl GoalsSession {
    pub fn new(
        ctx: SessionContext,
        confirmer: Arc<dyn GoalConfirmer>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let session = Self {
            ctx,
            confirmer,
            running: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            event_tx,
        };
        (session, event_rx)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub async fn start(&self) -> Result<GoalsOutcome, SessionError> {
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            tracing::debug!("Goals session already running, ignoring start");
            return Ok(GoalsOutcome::AlreadyRunning);
        };
        self.cancelled.store(false, Ordering::Release);
        tracing::info!("Goals session started");

        let result = self.run().await;
        match &result {
            Ok(GoalsOutcome::NothingHeard | GoalsOutcome::Declined) => {
                self.set_phase(GoalsPhase::Cancelled);
                self.emit(SessionEvent::Completed {
                    success: false,
                    message: None,
                });
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, "Goals session ended early");
                let cancelled = matches!(err, SessionError::Cancelled);
                self.set_phase(if cancelled {
                    GoalsPhase::Cancelled
                } else {
                    GoalsPhase::Error
                });
                let report = err.report();
                self.emit(SessionEvent::Error(report.clone()));
                if !cancelled {
                    self.say(&report.user_message).await;
                }
                self.emit(SessionEvent::Completed {
                    success: false,
                    message: Some(report.technical),
                });
            }
        }
        result
    }

    /// End listening; the captured transcript is then processed as usual.
    pub fn stop_listening(&self) {
        self.ctx.input.stop();
    }

    /// Abandon the run at the next step boundary.
    pub fn cancel(&self) {
        if self.is_running() {
            tracing::info!("Cancelling goals session");
            self.cancelled.store(true, Ordering::Release);
            self.ctx.speech.stop();
            self.ctx.input.stop();
        }
    }

    async fn run(&self) -> Result<GoalsOutcome, SessionError> {
        self.say(GOALS_PROMPT).await;
        self.check_cancelled()?;

        self.set_phase(GoalsPhase::Listening);
        let fragments = self.ctx.input.listen_continuous().await?;
        self.check_cancelled()?;
        for fragment in &fragments {
            self.emit(SessionEvent::Transcript {
                text: fragment.text.clone(),
                is_final: fragment.is_final,
            });
        }

        let transcript = join_final_fragments(&fragments);
        self.set_phase(GoalsPhase::TranscriptReady);
        if transcript.is_empty() {
            tracing::info!("No goals heard");
            return Ok(GoalsOutcome::NothingHeard);
        }
        tracing::debug!(%transcript, "Goals transcript");

        let extracted = GoalSet::from_raw(extract_goals(&transcript));
        tracing::info!(goals = extracted.len(), "Extracted goals");

        self.set_phase(GoalsPhase::AwaitingConfirmation);
        let goals = match self.confirmer.confirm(&extracted).await {
            GoalConfirmation::Confirmed(edited) => GoalSet::from_raw(edited),
            GoalConfirmation::Cancelled => GoalSet::default(),
        };
        if goals.is_empty() {
            tracing::info!("Goals not confirmed");
            return Ok(GoalsOutcome::Declined);
        }
        self.check_cancelled()?;

        let user_id = self
            .ctx
            .identity
            .user_id()
            .ok_or(SessionError::AuthRequired)?;

        self.set_phase(GoalsPhase::Submitting);
        let submission = GoalSubmission {
            user_id,
            week_start: week_start(self.ctx.clock.today()),
            goals,
        };
        let stack = self.ctx.api.submit_goals(&submission).await?;

        tracing::info!(
            goals = submission.goals.len(),
            habits = stack.len(),
            week_start = %submission.week_start,
            "Goals submitted"
        );
        self.set_phase(GoalsPhase::Submitted);
        self.say(SAVED).await;
        self.emit(SessionEvent::Completed {
            success: true,
            message: None,
        });

        Ok(GoalsOutcome::Submitted {
            goals: submission.goals,
            stack,
        })
    }

    async fn say(&self, text: &str) {
        self.emit(SessionEvent::Prompt(text.to_string()));
        if let Err(err) = self.ctx.speech.speak(text).await {
            tracing::warn!(error = %err, "Could not speak prompt");
            self.emit(SessionEvent::Error(err.report()));
        }
    }

    fn check_cancelled(&self) -> Result<(), SessionError> {
        if self.cancelled.load(Ordering::Acquire) {
            Err(SessionError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn set_phase(&self, phase: GoalsPhase) {
        tracing::debug!(?phase, "Goals phase");
        self.emit(SessionEvent::PhaseChanged(phase.into()));
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.event_tx.send(event);
    }
}
