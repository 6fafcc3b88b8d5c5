//! Public configuration for the habit backend client.

use std::time::Duration;

use habitvox_core::Settings;

/// Endpoint paths, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub habit_stack: String,
    pub daily_log: String,
    pub goals: String,
    pub tts_config: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            habit_stack: "/api/habit-stack".to_string(),
            daily_log: "/api/daily-log".to_string(),
            goals: "/api/goals".to_string(),
            tts_config: "/api/tts-config".to_string(),
        }
    }
}

/// Configuration for [`HabitApiClient`](crate::HabitApiClient).
///
/// # Example
///
/// ```
/// use habitvox_api::HabitApiConfig;
/// use std::time::Duration;
///
/// let config = HabitApiConfig::new()
///     .with_base_url("https://habits.example.com")
///     .with_request_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct HabitApiConfig {
    pub(crate) base_url: String,
    pub(crate) user_agent: String,
    pub(crate) token: Option<String>,
    pub(crate) endpoints: Endpoints,
    /// Habit-stack fetch and daily-log submit.
    pub(crate) request_timeout: Duration,
    pub(crate) goals_timeout: Duration,
    pub(crate) tts_config_timeout: Duration,
}

impl Default for HabitApiConfig {
    fn default() -> Self {
        Self {
            base_url: habitvox_core::settings::DEFAULT_API_BASE_URL.to_string(),
            user_agent: concat!("habitvox/", env!("CARGO_PKG_VERSION")).to_string(),
            token: None,
            endpoints: Endpoints::default(),
            request_timeout: Duration::from_secs(
                habitvox_core::settings::DEFAULT_REQUEST_TIMEOUT_SECS,
            ),
            goals_timeout: Duration::from_secs(habitvox_core::settings::DEFAULT_GOALS_TIMEOUT_SECS),
            tts_config_timeout: Duration::from_secs(
                habitvox_core::settings::DEFAULT_TTS_CONFIG_TIMEOUT_SECS,
            ),
        }
    }
}

impl HabitApiConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a config from validated application settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new()
            .with_base_url(settings.effective_api_base_url())
            .with_optional_token(settings.auth_token.clone())
            .with_request_timeout(settings.effective_request_timeout())
            .with_goals_timeout(settings.effective_goals_timeout())
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_optional_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Timeout for habit-stack fetch and daily-log submit. Defaults to 15s.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Timeout for goal submission. Defaults to 30s.
    #[must_use]
    pub const fn with_goals_timeout(mut self, timeout: Duration) -> Self {
        self.goals_timeout = timeout;
        self
    }

    /// Timeout for the TTS config lookup. Defaults to 10s.
    #[must_use]
    pub const fn with_tts_config_timeout(mut self, timeout: Duration) -> Self {
        self.tts_config_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HabitApiConfig::new();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert!(config.user_agent.starts_with("habitvox/"));
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.goals_timeout, Duration::from_secs(30));
        assert_eq!(config.tts_config_timeout, Duration::from_secs(10));
        assert!(config.token.is_none());
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            api_base_url: Some("https://habits.example.com".into()),
            auth_token: Some("secret".into()),
            request_timeout_secs: Some(5),
            ..Settings::default()
        };
        let config = HabitApiConfig::from_settings(&settings);
        assert_eq!(config.base_url, "https://habits.example.com");
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.goals_timeout, Duration::from_secs(30));
    }
}
