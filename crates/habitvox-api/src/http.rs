//! Reqwest transport shared by every endpoint.
//!
//! Each call carries its own wall-clock timeout. There is no automatic
//! retry: a timed-out or failed request is reported once and the caller
//! decides what happens next.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::HabitApiConfig;
use crate::error::{ClientError, ClientResult, body_message};

/// Body-level status flag carried by most backend responses.
#[derive(Debug, serde::Deserialize)]
struct Envelope {
    success: Option<bool>,
    error: Option<String>,
}

pub(crate) struct ReqwestBackend {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl ReqwestBackend {
    pub(crate) fn new(config: &HabitApiConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.token.clone(),
        })
    }

    /// Resolve an endpoint path against the base URL, keeping any path
    /// prefix the base carries.
    pub(crate) fn url(&self, path: &str) -> ClientResult<Url> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        Ok(Url::parse(&format!("{}{path}", self.base_url))?)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        timeout: Duration,
    ) -> ClientResult<T> {
        let request = self.authorize(self.client.get(url.clone()));
        self.execute(request, url, timeout).await
    }

    pub(crate) async fn post_json<B, T>(&self, url: Url, body: &B, timeout: Duration) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.authorize(self.client.post(url.clone()).json(body));
        self.execute(request, url, timeout).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: Url,
        timeout: Duration,
    ) -> ClientResult<T> {
        tracing::debug!(url = %url, ?timeout, "Backend request");

        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, &url, timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, &url, timeout))?;

        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "Backend request failed");
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                message: body_message(&body),
            });
        }

        if let Ok(envelope) = serde_json::from_str::<Envelope>(&body) {
            if envelope.success == Some(false) {
                tracing::warn!(url = %url, "Backend rejected request");
                return Err(ClientError::Rejected {
                    url: url.to_string(),
                    message: envelope
                        .error
                        .unwrap_or_else(|| "request was not successful".to_string()),
                });
            }
        }

        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(body).map_err(|e| ClientError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

fn transport_error(err: reqwest::Error, url: &Url, timeout: Duration) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout {
            url: url.to_string(),
            after: timeout,
        }
    } else {
        ClientError::Network(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_keeps_base_prefix() {
        let backend =
            ReqwestBackend::new(&HabitApiConfig::new().with_base_url("https://h.example/app/"))
                .unwrap();
        assert_eq!(
            backend.url("/api/goals").unwrap().as_str(),
            "https://h.example/app/api/goals"
        );
        assert_eq!(
            backend.url("api/goals").unwrap().as_str(),
            "https://h.example/app/api/goals"
        );
    }

    #[test]
    fn invalid_base_is_reported() {
        let backend =
            ReqwestBackend::new(&HabitApiConfig::new().with_base_url("not a url")).unwrap();
        assert!(matches!(backend.url("/x"), Err(ClientError::InvalidUrl(_))));
    }
}
