//! `habitvox` command-line interface.
//!
//! The binary is the composition root: it parses flags and `HABITVOX_*`
//! environment variables into settings, wires the backend client and speech
//! adapters in [`bootstrap`], and runs one command. The microphone is
//! stood in for by the terminal: answers are typed lines.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by main.rs
use anyhow as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod env;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;
pub mod terminal;

pub use bootstrap::{CliContext, bootstrap};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
