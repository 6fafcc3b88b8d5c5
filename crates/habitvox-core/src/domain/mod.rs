//! Domain types for habit check-ins and weekly goals.
//!
//! These are pure data types with no infrastructure dependencies.

mod goal;
mod habit;

pub use goal::{GoalSet, GoalSubmission, MAX_GOALS, week_start};
pub use habit::{DailyLog, DailyResponseSet, HabitResponse, HabitSlot, HabitStack, MAX_HABITS};
