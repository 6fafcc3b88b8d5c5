//! Habit backend port — habit-stack fetch, daily-log submit, goal submission.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{DailyLog, GoalSubmission, HabitStack};
use crate::error::{Categorized, ErrorKind};

/// Errors returned by [`HabitApiPort`] operations.
///
/// Implementation-specific errors (HTTP, JSON, timeouts) are mapped to these
/// by the adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HabitApiError {
    /// 401, or no credentials to send.
    #[error("Authentication required: {message}")]
    AuthRequired { message: String },

    /// 404.
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Other 4xx, or a body-level `success: false`.
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// 429.
    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    /// 5xx, transport failure or timeout.
    #[error("Service unavailable: {message}")]
    Unavailable { message: String },

    /// Missing endpoint or an undecodable response.
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl Categorized for HabitApiError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthRequired { .. } => ErrorKind::AuthRequired,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Unavailable { .. } => ErrorKind::Unavailable,
            Self::Configuration { .. } => ErrorKind::Configuration,
        }
    }
}

/// Backend operations the voice sessions depend on.
///
/// Authentication (bearer token, cookies) is the adapter's concern; the
/// sessions pass only the resolved user id.
#[async_trait]
pub trait HabitApiPort: Send + Sync {
    /// Fetch the habit stack for `user_id` on `date`.
    async fn fetch_habit_stack(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<HabitStack, HabitApiError>;

    /// Submit one completed check-in.
    async fn submit_daily_log(&self, user_id: &str, log: &DailyLog) -> Result<(), HabitApiError>;

    /// Submit confirmed weekly goals and return the generated habit stack.
    async fn submit_goals(&self, submission: &GoalSubmission) -> Result<HabitStack, HabitApiError>;
}
