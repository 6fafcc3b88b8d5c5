//! Internal error types for backend requests.
//!
//! These errors are internal to `habitvox-api` and are mapped to
//! [`HabitApiError`] at the port boundary.

use std::time::Duration;

use habitvox_core::HabitApiError;
use thiserror::Error;

pub(crate) type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub(crate) enum ClientError {
    /// Non-2xx response.
    #[error("request to {url} failed with status {status}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    /// 2xx response whose body said `success: false`.
    #[error("request to {url} was rejected: {message}")]
    Rejected { url: String, message: String },

    #[error("request to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP client could not be built: {0}")]
    Build(String),
}

impl From<ClientError> for HabitApiError {
    fn from(err: ClientError) -> Self {
        let message = err.to_string();
        match err {
            ClientError::Status { status, .. } => match status {
                401 => Self::AuthRequired { message },
                404 => Self::NotFound { message },
                429 => Self::RateLimited { message },
                400..=499 => Self::BadRequest { message },
                _ => Self::Unavailable { message },
            },
            ClientError::Rejected { .. } => Self::BadRequest { message },
            ClientError::Timeout { .. } | ClientError::Network(_) => Self::Unavailable { message },
            ClientError::Decode { .. } | ClientError::InvalidUrl(_) | ClientError::Build(_) => {
                Self::Configuration { message }
            }
        }
    }
}

/// Pull a human-readable message out of an error body
/// (`{"error": "..."}` or `{"message": "..."}`), falling back to the raw text.
pub(crate) fn body_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["error", "message"]
                .iter()
                .find_map(|field| v.get(*field).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no response body".to_string()
            } else {
                trimmed.chars().take(200).collect()
            }
        })
}
