//! Core domain types and port definitions for habitvox.
//!
//! Nothing in here talks to the network or to audio hardware. The voice
//! crate builds its sessions on these types; the API crate implements the
//! ports.
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod error;
pub mod ports;
pub mod settings;
pub mod text;

// Re-export commonly used types for convenience
pub use domain::{
    DailyLog, DailyResponseSet, GoalSet, GoalSubmission, HabitResponse, HabitSlot, HabitStack,
    MAX_GOALS, MAX_HABITS, week_start,
};
pub use error::{Categorized, ErrorKind, ErrorReport};
pub use ports::{
    Clock, FixedClock, HabitApiError, HabitApiPort, IdentityPort, StaticIdentity, SystemClock,
    TtsConfig, TtsConfigPort,
};
pub use settings::{Settings, SettingsError, validate_settings};
pub use text::{Classification, classify_response, extract_goals, is_decline};
