//! HTTP client for the habitvox habit backend.
//!
//! [`HabitApiClient`] implements [`HabitApiPort`](habitvox_core::HabitApiPort)
//! and [`TtsConfigPort`](habitvox_core::TtsConfigPort) over `reqwest`.
//! HTTP statuses are mapped onto [`HabitApiError`](habitvox_core::HabitApiError):
//!
//! | Status            | Error          |
//! |-------------------|----------------|
//! | 401               | `AuthRequired` |
//! | 404               | `NotFound`     |
//! | 429               | `RateLimited`  |
//! | other 4xx         | `BadRequest`   |
//! | 5xx, network, timeout | `Unavailable` |
//!
//! A 2xx body carrying `"success": false` is treated as `BadRequest`.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]
// ClientError stays crate-private; only its conversion into the port error is public
#![allow(private_interfaces)]

mod client;
mod config;
mod error;
mod http;

pub use client::HabitApiClient;
pub use config::{Endpoints, HabitApiConfig};

// Silence unused dev-dependency warnings (used by tests/)
#[cfg(test)]
use tokio as _;
#[cfg(test)]
use wiremock as _;
