use std::time::Duration;

use thiserror::Error;

use crate::http::HttpError;

/// Errors from talking to a roster provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Non-success HTTP status other than 429.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP 429. `retry_after` is the server's hint, when it sent one.
    #[error("Rate limit exceeded{}", retry_suffix(.retry_after))]
    RateLimited { retry_after: Option<Duration> },

    /// Connection-level failure.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Response body could not be decoded.
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Client is missing something it needs (base url, credentials).
    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

fn retry_suffix(retry_after: &Option<Duration>) -> String {
    retry_after
        .map(|d| format!(", retry after {}s", d.as_secs()))
        .unwrap_or_default()
}

impl ProviderError {
    #[inline]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    #[inline]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    #[inline]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether retrying after a pause can help.
    #[inline]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

impl From<HttpError> for ProviderError {
    fn from(err: HttpError) -> Self {
        Self::network(err.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err.to_string())
    }
}

/// First line of an error message, for progress events and summaries.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;
