//! Configuration and error types for asset fetching.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Settings for [`HttpFetcher`](crate::HttpFetcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFetcherConfig {
    /// Whole-request deadline, including body download.
    pub timeout: Duration,
    /// Bodies larger than this are rejected.
    pub max_download_bytes: u64,
    pub user_agent: String,
    pub max_redirects: usize,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_download_bytes: 5 * 1024 * 1024,
            user_agent: concat!("splash/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: 5,
        }
    }
}

/// Fetch failure with a stable code.
///
/// Errors contain:
/// - `code`: Stable error code
/// - `message`: Human-readable description
/// - `retryable`: Whether a later attempt may succeed
/// - `details`: Optional error-specific context
///
/// The splash session never retries; `retryable` only informs logging.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct FetchError {
    pub code: ErrorCode,
    pub message: String,
    pub retryable: bool,
    pub details: ErrorDetails,
}

impl FetchError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.is_retryable(),
            details: ErrorDetails::default(),
        }
    }

    /// Add a detail field.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.0.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details
            .0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// URL parsing failed.
    InvalidUrl,
    /// Non-http(s) scheme.
    InvalidScheme,
    /// Request timeout.
    Timeout,
    /// Network/connection error.
    Network,
    /// Max redirects exceeded.
    RedirectLimit,
    /// HTTP 4xx client error.
    Http4xx,
    /// HTTP 5xx server error.
    Http5xx,
    /// Response exceeds size limit.
    ResponseTooLarge,
    /// Body is not a recognised image.
    DecodeFailed,
    /// HTTP client could not be constructed.
    Internal,
}

impl ErrorCode {
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorCode::Timeout | ErrorCode::Network | ErrorCode::Http5xx
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUrl => "invalid_url",
            ErrorCode::InvalidScheme => "invalid_scheme",
            ErrorCode::Timeout => "timeout",
            ErrorCode::Network => "network",
            ErrorCode::RedirectLimit => "redirect_limit",
            ErrorCode::Http4xx => "http_4xx",
            ErrorCode::Http5xx => "http_5xx",
            ErrorCode::ResponseTooLarge => "response_too_large",
            ErrorCode::DecodeFailed => "decode_failed",
            ErrorCode::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error details as key-value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorDetails(pub Vec<(String, String)>);

#[cfg(test)]
mod tests {
    use super::{ErrorCode, FetchError};

    #[test]
    fn retryable_follows_code() {
        assert!(FetchError::new(ErrorCode::Timeout, "slow").retryable);
        assert!(FetchError::new(ErrorCode::Http5xx, "down").retryable);
        assert!(!FetchError::new(ErrorCode::Http4xx, "gone").retryable);
        assert!(!FetchError::new(ErrorCode::DecodeFailed, "html").retryable);
    }

    #[test]
    fn details_are_looked_up_by_key() {
        let err = FetchError::new(ErrorCode::Http4xx, "not found")
            .with_detail("status", "404")
            .with_detail("url", "https://example.com/a.png");
        assert_eq!(err.detail("status"), Some("404"));
        assert_eq!(err.detail("missing"), None);
        assert_eq!(err.to_string(), "not found");
    }
}
