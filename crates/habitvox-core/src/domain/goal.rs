//! Weekly goals captured by voice.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Hard cap on the number of goals kept from one transcript.
pub const MAX_GOALS: usize = 5;

/// Ordered list of 1–[`MAX_GOALS`] trimmed, non-empty goal strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalSet(Vec<String>);

impl GoalSet {
    /// Normalise arbitrary strings into a goal set: trim, drop empties,
    /// truncate to [`MAX_GOALS`].
    pub fn from_raw<I, S>(goals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            goals
                .into_iter()
                .map(|g| g.as_ref().trim().to_string())
                .filter(|g| !g.is_empty())
                .take(MAX_GOALS)
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Body posted to the goal/habit-stack generation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalSubmission {
    pub user_id: String,
    /// Sunday starting the week, serialized as `YYYY-MM-DD`.
    pub week_start: NaiveDate,
    pub goals: GoalSet,
}

/// The most recent Sunday on or before `today`.
pub fn week_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(i64::from(today.weekday().num_days_from_sunday()))
}
