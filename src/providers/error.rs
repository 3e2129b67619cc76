//! Error types for chat-completion calls
//!
//! Errors are categorized so callers can log transient and permanent
//! failures differently. The components never retry.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when calling a chat-completion API
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Connection issues, DNS failures, refused sockets
    #[error("Network error: {message}")]
    Network { message: String },

    /// Invalid API key or unauthorized access
    #[error("Authentication error: {message}")]
    Auth { message: String },

    /// Too many requests or quota exhausted
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        retry_after: Option<u64>,
    },

    /// Bad parameters, unknown model, malformed messages
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// The request did not complete within the client timeout
    #[error("Request timeout after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Error object reported by the service itself
    #[error("Provider error: {message}")]
    Provider {
        message: String,
        code: Option<String>,
    },

    /// Response body could not be decoded
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// The client could not be built from the given settings
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ProviderError {
    /// Returns true if this error is typically transient
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::Network { .. }
                | ProviderError::RateLimit { .. }
                | ProviderError::Timeout { .. }
        )
    }

    /// Returns true if this error indicates an authentication problem
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ProviderError::Auth { .. })
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn rate_limit(message: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn timeout(seconds: u64) -> Self {
        Self::Timeout { seconds }
    }

    pub fn provider(message: impl Into<String>, code: Option<impl Into<String>>) -> Self {
        Self::Provider {
            message: message.into(),
            code: code.map(|c| c.into()),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Maps a non-success HTTP status and its body to an error
    pub fn from_status(status: StatusCode, body: &str, retry_after: Option<u64>) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Self::auth(format!("Authentication failed ({}): {}", status, body))
            }
            StatusCode::TOO_MANY_REQUESTS => Self::rate_limit(
                format!("Rate limited ({}): {}", status, body),
                retry_after,
            ),
            s if s.is_client_error() => {
                Self::invalid_request(format!("Client error ({}): {}", status, body))
            }
            s => Self::provider(
                format!("Server error ({}): {}", s, body),
                Some(s.as_u16().to_string()),
            ),
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl ProviderError {
    /// Classifies a transport error; `timeout_seconds` is the client's configured timeout
    pub fn from_reqwest(err: reqwest::Error, timeout_seconds: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                seconds: timeout_seconds,
            }
        } else if err.is_decode() {
            Self::Serialization {
                message: err.to_string(),
            }
        } else {
            Self::Network {
                message: err.to_string(),
            }
        }
    }
}
