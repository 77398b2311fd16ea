use std::time::Duration;
use thiserror::Error;

/// Failures that end a turn. The core never retries these itself.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Authentication failed: {message}")]
    Authentication {
        message: String,
        hint: Option<String>,
    },

    #[error("Rate limit exceeded: {message}{}", retry_suffix(.retry_after))]
    RateLimit {
        message: String,
        retry_after: Option<Duration>,
    },

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl TransportError {
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimit { .. } | Self::Connection(_) | Self::Timeout(_) | Self::Server { .. }
        )
    }

    #[must_use]
    pub fn auth_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Attaches the server's `Retry-After` delay to a rate-limit error.
    #[must_use]
    pub fn with_retry_after(self, delay: Option<Duration>) -> Self {
        match self {
            Self::RateLimit { message, .. } => Self::RateLimit {
                message,
                retry_after: delay,
            },
            other => other,
        }
    }

    /// Hint text worth showing next to the error, if any.
    #[must_use]
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Authentication { hint, .. } => hint.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn from_status(status: u16, body: &str, api_key_env_var: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error")?.get("message")?.as_str().map(String::from))
            .unwrap_or_else(|| format!("HTTP {status}"));

        match status {
            401 | 403 => Self::Authentication {
                message,
                hint: Some(format!("Check your {api_key_env_var} environment variable")),
            },
            408 => Self::Timeout(message),
            429 => Self::RateLimit {
                message,
                retry_after: None,
            },
            500..=599 => Self::Server { status, message },
            _ => Self::InvalidRequest(message),
        }
    }
}

fn retry_suffix(retry_after: &Option<Duration>) -> String {
    retry_after
        .map(|d| format!(" (retry after {}s)", d.as_secs()))
        .unwrap_or_default()
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_connect() {
            Self::Connection(e.to_string())
        } else if e.is_body() || e.is_decode() {
            Self::Stream(e.to_string())
        } else {
            Self::Connection(e.to_string())
        }
    }
}

impl From<reqwest_middleware::Error> for TransportError {
    fn from(e: reqwest_middleware::Error) -> Self {
        match e {
            reqwest_middleware::Error::Reqwest(e) => e.into(),
            reqwest_middleware::Error::Middleware(e) => Self::Connection(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(TransportError::server(503, "overloaded").is_retryable());
        assert!(TransportError::Connection("refused".into()).is_retryable());
        assert!(TransportError::Timeout("read".into()).is_retryable());

        assert!(!TransportError::auth_with_hint("invalid", "check key").is_retryable());
        assert!(!TransportError::Stream("closed mid-event".into()).is_retryable());
        assert!(!TransportError::Configuration("missing key".into()).is_retryable());
    }

    #[test]
    fn test_from_status_401() {
        let body = r#"{"error": {"message": "Invalid API key"}}"#;
        let err = TransportError::from_status(401, body, "OPENAI_API_KEY");

        match &err {
            TransportError::Authentication { message, .. } => {
                assert_eq!(message, "Invalid API key");
            }
            _ => panic!("Expected Authentication error"),
        }
        assert!(err.hint().is_some_and(|h| h.contains("OPENAI_API_KEY")));
    }

    #[test]
    fn test_from_status_429() {
        let err = TransportError::from_status(429, "", "OPENAI_API_KEY");
        assert!(matches!(err, TransportError::RateLimit { .. }));
        assert_eq!(err.to_string(), "Rate limit exceeded: HTTP 429");
    }

    #[test]
    fn test_rate_limit_carries_retry_after() {
        let err = TransportError::from_status(429, "", "OPENAI_API_KEY")
            .with_retry_after(Some(Duration::from_secs(20)));
        assert!(matches!(
            err,
            TransportError::RateLimit { retry_after: Some(d), .. } if d == Duration::from_secs(20)
        ));
        assert_eq!(err.to_string(), "Rate limit exceeded: HTTP 429 (retry after 20s)");
    }

    #[test]
    fn test_retry_after_ignored_for_other_errors() {
        let err = TransportError::from_status(500, "", "API_KEY")
            .with_retry_after(Some(Duration::from_secs(5)));
        assert!(matches!(err, TransportError::Server { status: 500, .. }));
    }

    #[test]
    fn test_from_status_500() {
        let body = r#"{"error": {"message": "Internal server error"}}"#;
        let err = TransportError::from_status(500, body, "API_KEY");

        match err {
            TransportError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal server error");
            }
            _ => panic!("Expected Server error"),
        }
    }

    #[test]
    fn test_from_status_400() {
        let body = r#"{"error": {"message": "Unknown parameter: 'tools[0].foo'"}}"#;
        let err = TransportError::from_status(400, body, "API_KEY");
        assert!(matches!(err, TransportError::InvalidRequest(ref m) if m.contains("tools[0]")));
    }
}
