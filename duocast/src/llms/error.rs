//! Error types for provider operations.
//!
//! [`LlmError`] covers all failure modes when talking to the chat-completion
//! and speech-synthesis backends (authentication, rate limiting, network
//! issues, etc.). It integrates into [`Error`](crate::Error) via `Error::Llm`.

/// Error type for provider operations.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum LlmError {
    /// Authentication or authorization failure.
    #[error("[{provider}] {message}")]
    Auth {
        /// Provider name (e.g., "openai", "elevenlabs").
        provider: String,
        /// Error description.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("[{provider}] Rate limit exceeded. Please retry after some time.")]
    RateLimited {
        /// Provider name.
        provider: String,
    },

    /// Response format error.
    #[error("Expected {expected}, got {got}")]
    ResponseFormat {
        /// Expected format description.
        expected: String,
        /// Actual format received.
        got: String,
    },

    /// Network or connection error.
    #[error("{0}")]
    Network(String),

    /// HTTP status error.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Provider-specific error.
    #[error("[{provider}] {message}")]
    Provider {
        /// Provider name.
        provider: String,
        /// Error description.
        message: String,
        /// Optional error code from the provider.
        code: Option<String>,
    },

    /// Internal error.
    #[error("{0}")]
    Internal(String),
}

impl LlmError {
    /// Create an authentication error.
    #[must_use]
    pub fn auth(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Auth {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a rate limit error.
    #[must_use]
    pub fn rate_limited(provider: impl Into<String>) -> Self {
        Self::RateLimited {
            provider: provider.into(),
        }
    }

    /// Create a response format error.
    #[must_use]
    pub fn response_format(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::ResponseFormat {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a provider-specific error.
    #[must_use]
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            code: None,
        }
    }

    /// Create a provider error with an error code.
    #[must_use]
    pub fn provider_code(
        provider: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a retryable error.
    ///
    /// Server-side 5xx statuses count as transient alongside rate limits and
    /// network failures.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Network(_) => true,
            Self::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {err}"))
        } else {
            Self::network(err.to_string())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn auth_creates_error() {
        let err = LlmError::auth("openai", "Invalid API key");
        assert!(matches!(err, LlmError::Auth { ref provider, .. } if provider == "openai"));
        assert_eq!(err.to_string(), "[openai] Invalid API key");
    }

    #[test]
    fn provider_code_keeps_code() {
        let err = LlmError::provider_code("elevenlabs", "voice_not_found", "Unknown voice");
        match err {
            LlmError::Provider { code, message, .. } => {
                assert_eq!(code.as_deref(), Some("voice_not_found"));
                assert_eq!(message, "Unknown voice");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn retryable_kinds() {
        assert!(LlmError::rate_limited("openai").is_retryable());
        assert!(LlmError::network("reset").is_retryable());
        assert!(LlmError::http_status(503, "busy").is_retryable());
        assert!(!LlmError::http_status(400, "bad").is_retryable());
        assert!(!LlmError::auth("openai", "nope").is_retryable());
        assert!(!LlmError::response_format("json", "text").is_retryable());
    }

    #[test]
    fn http_status_display() {
        let err = LlmError::http_status(502, "bad gateway");
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");
    }
}
