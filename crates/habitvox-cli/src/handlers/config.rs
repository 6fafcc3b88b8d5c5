//! Config command handler.

use habitvox_core::{Settings, validate_settings};

use crate::error::CliError;

/// Print the effective configuration. Works without a reachable backend.
pub fn execute(settings: &Settings) -> Result<(), CliError> {
    println!("{}", render(settings));
    validate_settings(settings)?;
    Ok(())
}

fn render(settings: &Settings) -> String {
    let rows = [
        ("API base URL", settings.effective_api_base_url().to_string()),
        (
            "User id",
            settings.user_id.clone().unwrap_or_else(|| "(not set)".into()),
        ),
        (
            "Auth token",
            if settings.auth_token.is_some() {
                "(set)".into()
            } else {
                "(not set)".into()
            },
        ),
        (
            "Preferred voice",
            settings
                .preferred_voice
                .clone()
                .unwrap_or_else(|| "(system default)".into()),
        ),
        (
            "Max clarifications",
            settings.effective_max_clarifications().to_string(),
        ),
        (
            "Request timeout",
            format!("{}s", settings.effective_request_timeout().as_secs()),
        ),
        (
            "Goals timeout",
            format!("{}s", settings.effective_goals_timeout().as_secs()),
        ),
        (
            "TTS timeout",
            format!("{}s", settings.effective_tts_timeout().as_secs()),
        ),
    ];
    rows.iter()
        .map(|(label, value)| format!("{label:<20} {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_never_printed() {
        let settings = Settings {
            auth_token: Some("secret-token".into()),
            user_id: Some("u1".into()),
            ..Settings::with_defaults()
        };
        let out = render(&settings);
        assert!(!out.contains("secret-token"));
        assert!(out.contains("(set)"));
        assert!(out.contains("u1"));
    }

    #[test]
    fn invalid_settings_are_reported() {
        let settings = Settings {
            request_timeout_secs: Some(0),
            ..Settings::with_defaults()
        };
        assert!(matches!(execute(&settings), Err(CliError::Config(_))));
    }
}
