//! Available subcommands.

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run today's voice check-in against your habit stack
    Checkin,

    /// Dictate this week's goals and generate a new habit stack
    Goals,

    /// Speak a line of text through the configured speech providers
    Say {
        /// Text to speak
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// List speech providers and on-device voices
    Voices,

    /// Show the effective configuration
    Config,
}
