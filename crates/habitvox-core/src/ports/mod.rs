//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the voice sessions expect from
//! infrastructure. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No `reqwest` types in any signature
//! - Authentication headers are the adapter's business; ports take a user id
//! - Every port error maps onto an [`ErrorKind`](crate::ErrorKind)

pub mod clock;
pub mod habit_api;
pub mod identity;
pub mod tts_config;

pub use clock::{Clock, FixedClock, SystemClock};
pub use habit_api::{HabitApiError, HabitApiPort};
pub use identity::{IdentityPort, StaticIdentity};
pub use tts_config::{TtsConfig, TtsConfigPort};
