//! [`HabitApiClient`] — the adapter implementing the habit backend ports.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use habitvox_core::{
    DailyLog, GoalSubmission, HabitApiError, HabitApiPort, HabitStack, TtsConfig, TtsConfigPort,
};

use crate::config::HabitApiConfig;
use crate::http::ReqwestBackend;

/// Response of the habit-stack and goal endpoints.
#[derive(Debug, Deserialize)]
struct HabitStackResponse {
    #[serde(default)]
    habit_stack: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Reqwest-backed client for the habit backend.
pub struct HabitApiClient {
    backend: ReqwestBackend,
    config: HabitApiConfig,
}

impl HabitApiClient {
    pub fn new(config: HabitApiConfig) -> Result<Self, HabitApiError> {
        let backend = ReqwestBackend::new(&config)?;
        Ok(Self { backend, config })
    }

    pub fn config(&self) -> &HabitApiConfig {
        &self.config
    }
}

#[async_trait]
impl HabitApiPort for HabitApiClient {
    async fn fetch_habit_stack(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<HabitStack, HabitApiError> {
        let mut url = self.backend.url(&self.config.endpoints.habit_stack)?;
        url.query_pairs_mut()
            .append_pair("user_id", user_id)
            .append_pair("date", &date.format("%Y-%m-%d").to_string());

        let response: HabitStackResponse = self
            .backend
            .get_json(url, self.config.request_timeout)
            .await?;

        let stack = response
            .habit_stack
            .as_ref()
            .map(HabitStack::from_wire)
            .unwrap_or_default();
        tracing::info!(habits = stack.len(), %date, "Fetched habit stack");
        Ok(stack)
    }

    async fn submit_daily_log(&self, user_id: &str, log: &DailyLog) -> Result<(), HabitApiError> {
        let mut url = self.backend.url(&self.config.endpoints.daily_log)?;
        url.query_pairs_mut().append_pair("user_id", user_id);

        let _: serde_json::Value = self
            .backend
            .post_json(url, log, self.config.request_timeout)
            .await?;

        tracing::info!(date = %log.date, responses = log.responses.len(), "Submitted daily log");
        Ok(())
    }

    async fn submit_goals(&self, submission: &GoalSubmission) -> Result<HabitStack, HabitApiError> {
        let url = self.backend.url(&self.config.endpoints.goals)?;

        let response: HabitStackResponse = self
            .backend
            .post_json(url, submission, self.config.goals_timeout)
            .await?;

        let stack = response
            .habit_stack
            .as_ref()
            .map(HabitStack::from_wire)
            .unwrap_or_default();
        tracing::info!(
            goals = submission.goals.len(),
            week_start = %submission.week_start,
            habits = stack.len(),
            "Submitted weekly goals"
        );
        Ok(stack)
    }
}

#[async_trait]
impl TtsConfigPort for HabitApiClient {
    async fn fetch_tts_config(&self) -> Result<TtsConfig, HabitApiError> {
        let url = self.backend.url(&self.config.endpoints.tts_config)?;
        let config: TtsConfig = self
            .backend
            .get_json(url, self.config.tts_config_timeout)
            .await?;
        tracing::debug!(use_fish_audio = config.use_fish_audio, "Fetched TTS config");
        Ok(config)
    }
}
