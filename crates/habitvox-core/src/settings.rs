//! Settings domain types and validation.
//!
//! The CLI fills these from flags and `HABITVOX_*` environment variables;
//! adapters read the effective values. All fields are optional so a partial
//! environment still yields sensible defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default backend base URL.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

/// Default timeout for habit-stack fetch and daily-log submit.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Default timeout for goal submission (the backend calls an LLM).
pub const DEFAULT_GOALS_TIMEOUT_SECS: u64 = 30;

/// Default timeout for the TTS config lookup.
pub const DEFAULT_TTS_CONFIG_TIMEOUT_SECS: u64 = 10;

/// Default timeout for network speech synthesis.
pub const DEFAULT_TTS_TIMEOUT_SECS: u64 = 20;

/// Default cap on clarifying re-prompts per habit.
pub const DEFAULT_MAX_CLARIFICATIONS: u32 = 3;

/// Application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Backend base URL (endpoints are resolved against it).
    pub api_base_url: Option<String>,

    /// Signed-in user id.
    pub user_id: Option<String>,

    /// Bearer token attached to backend requests.
    pub auth_token: Option<String>,

    /// Preferred on-device voice name.
    pub preferred_voice: Option<String>,

    /// Clarifying re-prompts allowed per habit before moving on.
    pub max_clarifications: Option<u32>,

    /// Timeout for habit-stack fetch and daily-log submit, in seconds.
    pub request_timeout_secs: Option<u64>,

    /// Timeout for goal submission, in seconds.
    pub goals_timeout_secs: Option<u64>,

    /// Timeout for network speech synthesis, in seconds.
    pub tts_timeout_secs: Option<u64>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            api_base_url: Some(DEFAULT_API_BASE_URL.to_string()),
            user_id: None,
            auth_token: None,
            preferred_voice: None,
            max_clarifications: Some(DEFAULT_MAX_CLARIFICATIONS),
            request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
            goals_timeout_secs: Some(DEFAULT_GOALS_TIMEOUT_SECS),
            tts_timeout_secs: Some(DEFAULT_TTS_TIMEOUT_SECS),
        }
    }

    pub fn effective_api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    pub fn effective_max_clarifications(&self) -> u32 {
        self.max_clarifications.unwrap_or(DEFAULT_MAX_CLARIFICATIONS)
    }

    pub fn effective_request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn effective_goals_timeout(&self) -> Duration {
        Duration::from_secs(self.goals_timeout_secs.unwrap_or(DEFAULT_GOALS_TIMEOUT_SECS))
    }

    pub fn effective_tts_timeout(&self) -> Duration {
        Duration::from_secs(self.tts_timeout_secs.unwrap_or(DEFAULT_TTS_TIMEOUT_SECS))
    }
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("API base URL is not a valid http(s) URL: {0}")]
    InvalidBaseUrl(String),

    #[error("{name} timeout must be between 1 and 300 seconds, got {value}")]
    InvalidTimeout { name: &'static str, value: u64 },

    #[error("Max clarifications must be between 0 and 10, got {0}")]
    InvalidClarifications(u32),

    #[error("User id cannot be blank")]
    BlankUserId,
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(ref base) = settings.api_base_url {
        let parsed =
            url::Url::parse(base).map_err(|_| SettingsError::InvalidBaseUrl(base.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SettingsError::InvalidBaseUrl(base.clone()));
        }
    }

    let timeouts = [
        ("Request", settings.request_timeout_secs),
        ("Goals", settings.goals_timeout_secs),
        ("TTS", settings.tts_timeout_secs),
    ];
    for (name, value) in timeouts {
        if let Some(value) = value {
            if !(1..=300).contains(&value) {
                return Err(SettingsError::InvalidTimeout { name, value });
            }
        }
    }

    if let Some(max) = settings.max_clarifications {
        if max > 10 {
            return Err(SettingsError::InvalidClarifications(max));
        }
    }

    if settings.user_id.as_ref().is_some_and(|id| id.trim().is_empty()) {
        return Err(SettingsError::BlankUserId);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::with_defaults();
        assert_eq!(settings.effective_api_base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(settings.effective_request_timeout(), Duration::from_secs(15));
        assert_eq!(settings.effective_goals_timeout(), Duration::from_secs(30));
        assert_eq!(settings.effective_max_clarifications(), 3);
        assert!(settings.user_id.is_none());
    }

    #[test]
    fn test_validate_settings_valid() {
        assert!(validate_settings(&Settings::with_defaults()).is_ok());
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_validate_bad_base_url() {
        let settings = Settings {
            api_base_url: Some("ftp://example.com".into()),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidBaseUrl(_))
        ));

        let settings = Settings {
            api_base_url: Some("not a url".into()),
            ..Default::default()
        };
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let settings = Settings {
            goals_timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidTimeout { name: "Goals", value: 0 })
        ));
    }

    #[test]
    fn test_validate_clarification_cap() {
        let settings = Settings {
            max_clarifications: Some(50),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidClarifications(50))
        ));
    }

    #[test]
    fn test_validate_blank_user() {
        let settings = Settings {
            user_id: Some("   ".into()),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::BlankUserId)
        ));
    }
}
