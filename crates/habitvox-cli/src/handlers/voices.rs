//! Voices command handler.
//!
//! Lists the registered speech providers with their availability, then the
//! voices the on-device engine offers.

use habitvox_voice::{ProviderStatus, VoiceInfo};

use crate::bootstrap::CliContext;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext) -> Result<(), CliError> {
    println!("Speech providers:");
    for status in ctx.dispatcher.available_providers().await {
        println!("{}", format_provider(&status));
    }

    println!();
    match ctx.on_device.voices().await {
        Ok(voices) if voices.is_empty() => println!("No on-device voices found."),
        Ok(voices) => {
            println!("On-device voices:");
            for voice in &voices {
                println!("{}", format_voice(voice));
            }
        }
        Err(e) => println!("On-device voices unavailable: {e}"),
    }
    Ok(())
}

fn format_provider(status: &ProviderStatus) -> String {
    format!(
        "  {} {:<10} {}",
        if status.active { "*" } else { " " },
        status.name,
        if status.available {
            "available"
        } else {
            "unavailable"
        }
    )
}

fn format_voice(voice: &VoiceInfo) -> String {
    match voice.language {
        Some(ref language) => format!("  {:<24} {language}", voice.name),
        None => format!("  {}", voice.name),
    }
}
