//! Daily check-in session.
//!
//! ```text
//!   Idle → FetchingStack → ┬→ Prompting(i) → Listening(i) ─┬─ yes/no/skip ─→ next habit
//!                          │        ▲                      │
//!                          │        └── Ambiguous(i) ◄─────┘ (up to the clarification cap)
//!                          └→ AskingReflection → ListeningReflection → Submitting → Complete
//! ```
//!
//! Only a missing identity or a failed stack fetch ends a run early. Speech
//! and recognition failures inside the habit loop are reported on the event
//! channel; recognition failures are also spoken and the habit is skipped
//! over. The daily log is submitted exactly
//! once; a failed submit still completes the run, with the failure in the
//! outcome.

use std::sync::atomic::{AtomicBool, Ordering};

use habitvox_core::{
    Categorized, Classification, DailyLog, DailyResponseSet, ErrorKind, ErrorReport,
    HabitResponse, HabitSlot, classify_response, is_decline,
};
use tokio::sync::mpsc;

use super::{RunGuard, SessionContext, SessionError};
use crate::events::{CheckInPhase, SessionEvent};
use crate::ports::ListenOutcome;

const REFLECTION_PROMPT: &str =
    "Thanks. Would you like to share a short reflection on today? Say skip to finish.";
const THANK_YOU: &str = "Thanks! Your check-in has been saved.";
const MOVING_ON: &str = "Moving on.";

/// Check-in tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInConfig {
    /// Clarifying re-prompts allowed per habit before it is left unrecorded.
    pub max_clarifications: u32,
}

impl Default for CheckInConfig {
    fn default() -> Self {
        Self {
            max_clarifications: habitvox_core::settings::DEFAULT_MAX_CLARIFICATIONS,
        }
    }
}

/// How a `start()` call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInOutcome {
    /// Another run was in progress; nothing happened.
    AlreadyRunning,
    Submitted(DailyLog),
    /// Everything was collected but the submit failed.
    SubmitFailed { log: DailyLog, error: ErrorReport },
}

pub struct CheckInSession {
    ctx: SessionContext,
    config: CheckInConfig,
    running: AtomicBool,
    cancelled: AtomicBool,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl CheckInSession {
    /// Create a session.
    ///
    /// Returns the session and a receiver for [`SessionEvent`]s.
    pub fn new(
        ctx: SessionContext,
        config: CheckInConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let session = Self {
            ctx,
            config,
            running: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            event_tx,
        };
        (session, event_rx)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run one check-in to completion.
    pub async fn start(&self) -> Result<CheckInOutcome, SessionError> {
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            tracing::debug!("Check-in already running, ignoring start");
            return Ok(CheckInOutcome::AlreadyRunning);
        };
        self.cancelled.store(false, Ordering::Release);
        tracing::info!("Check-in started");

        let result = self.run().await;
        if let Err(ref err) = result {
            tracing::warn!(error = %err, "Check-in ended early");
            self.set_phase(CheckInPhase::Error);
            let report = err.report();
            self.emit(SessionEvent::Error(report.clone()));
            if !matches!(err, SessionError::Cancelled) {
                self.say(&report.user_message).await;
            }
            self.emit(SessionEvent::Completed {
                success: false,
                message: Some(report.technical),
            });
        }
        result
    }

    /// Stop the running check-in at the next step boundary.
    pub fn cancel(&self) {
        if self.is_running() {
            tracing::info!("Cancelling check-in");
            self.cancelled.store(true, Ordering::Release);
            self.ctx.speech.stop();
            self.ctx.input.stop();
        }
    }

    async fn run(&self) -> Result<CheckInOutcome, SessionError> {
        let user_id = self
            .ctx
            .identity
            .user_id()
            .ok_or(SessionError::AuthRequired)?;
        let date = self.ctx.clock.today();

        self.set_phase(CheckInPhase::FetchingStack);
        let stack = self.ctx.api.fetch_habit_stack(&user_id, date).await?;
        if stack.is_empty() {
            return Err(SessionError::EmptyStack);
        }
        tracing::info!(habits = stack.len(), %date, "Habit stack loaded");

        let mut responses = DailyResponseSet::new();
        for (index, slot) in stack.slots().iter().enumerate() {
            self.check_cancelled()?;
            if let Some(response) = self.ask_habit(index, slot).await? {
                if responses.record(slot.key.as_str(), response) {
                    self.emit(SessionEvent::Recorded {
                        habit_key: slot.key.clone(),
                        response,
                    });
                }
            }
        }

        self.check_cancelled()?;
        let reflection = self.ask_reflection().await?;

        self.set_phase(CheckInPhase::Submitting);
        let log = DailyLog {
            date,
            responses,
            reflection,
        };

        match self.ctx.api.submit_daily_log(&user_id, &log).await {
            Ok(()) => {
                tracing::info!(responses = log.responses.len(), "Check-in submitted");
                self.say(THANK_YOU).await;
                self.set_phase(CheckInPhase::Complete);
                self.emit(SessionEvent::Completed {
                    success: true,
                    message: None,
                });
                Ok(CheckInOutcome::Submitted(log))
            }
            Err(err) => {
                tracing::warn!(error = %err, "Daily log submit failed");
                let report = err.report();
                self.emit(SessionEvent::Error(report.clone()));
                self.say(&report.user_message).await;
                self.set_phase(CheckInPhase::Complete);
                self.emit(SessionEvent::Completed {
                    success: false,
                    message: Some(report.technical.clone()),
                });
                Ok(CheckInOutcome::SubmitFailed { log, error: report })
            }
        }
    }

    /// Prompt for one habit until it is classified, the clarification cap is
    /// hit, or listening fails. `None` leaves the habit unrecorded.
    async fn ask_habit(
        &self,
        index: usize,
        slot: &HabitSlot,
    ) -> Result<Option<HabitResponse>, SessionError> {
        let mut prompt = format!("Did you complete {}? Say yes, no, or skip.", slot.text);
        let mut clarifications = 0;

        loop {
            self.set_phase(CheckInPhase::Prompting { habit: index });
            self.say(&prompt).await;
            self.check_cancelled()?;

            self.set_phase(CheckInPhase::Listening { habit: index });
            let transcript = match self.listen().await {
                ListenOutcome::Transcript(text) => Some(text),
                ListenOutcome::NoResult => None,
                ListenOutcome::Error(err) => {
                    self.check_cancelled()?;
                    tracing::warn!(habit = %slot.key, error = %err, "Listening failed, moving on");
                    self.report_and_move_on(err.report()).await;
                    return Ok(None);
                }
            };
            self.check_cancelled()?;

            if let Some(ref text) = transcript {
                tracing::debug!(habit = %slot.key, transcript = %text, "Heard answer");
                self.emit(SessionEvent::Transcript {
                    text: text.clone(),
                    is_final: true,
                });
                if let Classification::Recognized(response) = classify_response(text) {
                    return Ok(Some(response));
                }
            }

            if clarifications >= self.config.max_clarifications {
                tracing::warn!(habit = %slot.key, clarifications, "No usable answer, leaving habit unrecorded");
                self.report_and_move_on(ErrorReport::new(
                    ErrorKind::Ambiguous,
                    format!(
                        "no yes/no/skip answer for {} after {clarifications} clarifications",
                        slot.key
                    ),
                ))
                .await;
                return Ok(None);
            }

            clarifications += 1;
            self.set_phase(CheckInPhase::Ambiguous { habit: index });
            prompt = format!(
                "Sorry, I didn't understand. Did you complete {}? Please say yes, no, or skip.",
                slot.text
            );
        }
    }

    async fn ask_reflection(&self) -> Result<String, SessionError> {
        self.set_phase(CheckInPhase::AskingReflection);
        self.say(REFLECTION_PROMPT).await;
        self.check_cancelled()?;

        self.set_phase(CheckInPhase::ListeningReflection);
        let reflection = match self.listen().await {
            ListenOutcome::Transcript(text) => {
                self.emit(SessionEvent::Transcript {
                    text: text.clone(),
                    is_final: true,
                });
                if is_decline(&text) {
                    String::new()
                } else {
                    text.trim().to_string()
                }
            }
            ListenOutcome::NoResult => String::new(),
            ListenOutcome::Error(err) => {
                tracing::warn!(error = %err, "Reflection listening failed, submitting without one");
                self.emit(SessionEvent::Error(err.report()));
                String::new()
            }
        };
        self.check_cancelled()?;
        Ok(reflection)
    }

    /// Listen once, re-listening a single time if the engine ends without a
    /// result.
    async fn listen(&self) -> ListenOutcome {
        match self.ctx.input.listen_once().await {
            ListenOutcome::NoResult if !self.cancelled.load(Ordering::Acquire) => {
                tracing::debug!("No result, listening again");
                self.ctx.input.listen_once().await
            }
            outcome => outcome,
        }
    }

    /// Speak `text`; a failure is reported and the run continues.
    async fn say(&self, text: &str) {
        self.emit(SessionEvent::Prompt(text.to_string()));
        if let Err(err) = self.ctx.speech.speak(text).await {
            tracing::warn!(error = %err, "Could not speak prompt");
            self.emit(SessionEvent::Error(err.report()));
        }
    }

    /// Report a habit-level failure and tell the user the habit is skipped.
    async fn report_and_move_on(&self, report: ErrorReport) {
        let spoken = format!("{} {MOVING_ON}", report.user_message);
        self.emit(SessionEvent::Error(report));
        self.say(&spoken).await;
    }

    fn check_cancelled(&self) -> Result<(), SessionError> {
        if self.cancelled.load(Ordering::Acquire) {
            Err(SessionError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn set_phase(&self, phase: CheckInPhase) {
        tracing::debug!(?phase, "Check-in phase");
        self.emit(SessionEvent::PhaseChanged(phase.into()));
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.event_tx.send(event);
    }
}
