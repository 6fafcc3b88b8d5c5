//! Main CLI parser and top-level argument handling.
//!
//! Global options double as the application settings. Each one falls back
//! to a `HABITVOX_*` environment variable, so a `.env` file is enough to
//! configure the binary.

use std::path::PathBuf;

use clap::Parser;
use habitvox_core::Settings;

use crate::commands::Commands;

/// Voice-driven daily habit check-ins and weekly goal setting.
#[derive(Parser)]
#[command(name = "habitvox")]
#[command(about = "Voice-driven daily habit check-ins")]
#[command(version)]
pub struct Cli {
    /// Backend base URL
    #[arg(long, env = "HABITVOX_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Signed-in user id
    #[arg(long, env = "HABITVOX_USER_ID", global = true)]
    pub user_id: Option<String>,

    /// Bearer token for the backend
    #[arg(long, env = "HABITVOX_AUTH_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Preferred on-device voice (exact or partial name)
    #[arg(long, env = "HABITVOX_VOICE", global = true)]
    pub voice: Option<String>,

    /// Clarifying re-prompts allowed per habit
    #[arg(long, env = "HABITVOX_MAX_CLARIFICATIONS", global = true)]
    pub max_clarifications: Option<u32>,

    /// Timeout for habit-stack fetch and daily-log submit
    #[arg(long, env = "HABITVOX_REQUEST_TIMEOUT", global = true, value_name = "SECS")]
    pub request_timeout: Option<u64>,

    /// Timeout for goal submission
    #[arg(long, env = "HABITVOX_GOALS_TIMEOUT", global = true, value_name = "SECS")]
    pub goals_timeout: Option<u64>,

    /// Timeout for network speech synthesis
    #[arg(long, env = "HABITVOX_TTS_TIMEOUT", global = true, value_name = "SECS")]
    pub tts_timeout: Option<u64>,

    /// Load additional environment variables from this file
    #[arg(long, global = true, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Effective settings: explicit values over built-in defaults.
    pub fn settings(&self) -> Settings {
        let defaults = Settings::with_defaults();
        Settings {
            api_base_url: self.api_url.clone().or(defaults.api_base_url),
            user_id: self.user_id.clone(),
            auth_token: self.token.clone(),
            preferred_voice: self.voice.clone(),
            max_clarifications: self.max_clarifications.or(defaults.max_clarifications),
            request_timeout_secs: self.request_timeout.or(defaults.request_timeout_secs),
            goals_timeout_secs: self.goals_timeout.or(defaults.goals_timeout_secs),
            tts_timeout_secs: self.tts_timeout.or(defaults.tts_timeout_secs),
        }
    }
}
