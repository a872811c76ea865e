//! Aerogen error types

use std::time::Duration;

/// Aerogen error types
#[derive(Debug, thiserror::Error)]
pub enum AerogenError {
    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited (429), retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("request timed out")]
    Timeout,

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    // Soft errors
    #[error("empty response from model")]
    EmptyResponse,
}

impl AerogenError {
    /// Whether the error is worth trying again later in the session.
    ///
    /// Network failures, timeouts, rate limits and 5xx responses are
    /// transient. Authentication, configuration and malformed-data errors
    /// are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout | Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Provider `retry-after` hint, if the error carried one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// HTTP status associated with the error, when known.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            Self::AuthenticationFailed => Some(401),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AerogenError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AerogenError::Timeout
        } else {
            // the URL may hold the API base or model name; keep it out of logs
            AerogenError::Http(err.without_url().to_string())
        }
    }
}

/// Result type alias for Aerogen operations
pub type Result<T> = std::result::Result<T, AerogenError>;
