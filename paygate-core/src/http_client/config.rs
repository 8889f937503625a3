use crate::config::RetryPolicy;
use crate::error::{ConfigValidationError, ValidationResult};
use std::time::Duration;

use super::request::system_language;

/// Default connect and read timeout for every request (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// HTTP layer configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Connect timeout applied to requests that don't set their own.
    pub connect_timeout: Duration,
    /// Read timeout applied to requests that don't set their own.
    pub read_timeout: Duration,
    /// Default User-Agent header value.
    pub user_agent: String,
    /// Language sent in `Accept-Language` on requests created by the client.
    /// Defaults to the system locale's language.
    pub accept_language: String,
    /// Whether to log response previews at debug level.
    pub verbose: bool,
    /// Maximum response body size in bytes (default: 10MB).
    ///
    /// Bodies over the limit fail with `NetworkError::ResponseTooLarge`.
    pub max_response_size: usize,
    /// Maximum number of requests executing on the background lane at once.
    pub max_concurrent_requests: usize,
    /// Policy used by [`HttpClient::fetch`](super::HttpClient::fetch).
    pub retry_policy: RetryPolicy,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            user_agent: format!("paygate-rust/{}", env!("CARGO_PKG_VERSION")),
            accept_language: system_language(),
            verbose: false,
            max_response_size: 10 * 1024 * 1024,
            max_concurrent_requests: 8,
            retry_policy: RetryPolicy::none(),
        }
    }
}

impl HttpConfig {
    /// Validates the HTTP configuration parameters.
    ///
    /// # Validation Rules
    ///
    /// - timeouts must be non-zero and at most 5 minutes
    /// - a read timeout under one second produces a warning
    /// - `max_concurrent_requests` and `max_response_size` must be non-zero
    /// - the retry policy must validate
    ///
    /// # Example
    ///
    /// ```rust
    /// use paygate_core::http_client::HttpConfig;
    /// use std::time::Duration;
    ///
    /// assert!(HttpConfig::default().validate().is_ok());
    ///
    /// let invalid = HttpConfig {
    ///     read_timeout: Duration::from_secs(600),
    ///     ..Default::default()
    /// };
    /// assert!(invalid.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<ValidationResult, ConfigValidationError> {
        let max_timeout = Duration::from_secs(300);
        let mut result = ValidationResult::new();

        for (field, value) in [
            ("connect_timeout", self.connect_timeout),
            ("read_timeout", self.read_timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigValidationError::invalid(
                    field,
                    "timeout cannot be zero",
                ));
            }
            if value > max_timeout {
                return Err(ConfigValidationError::too_high(
                    field,
                    format!("{value:?}"),
                    "5 minutes",
                ));
            }
        }

        if self.read_timeout < Duration::from_secs(1) {
            result.add_warning(format!(
                "read_timeout {:?} is very short, may cause frequent timeouts",
                self.read_timeout
            ));
        }

        if self.max_concurrent_requests == 0 {
            return Err(ConfigValidationError::too_low(
                "max_concurrent_requests",
                0,
                1,
            ));
        }

        if self.max_response_size == 0 {
            return Err(ConfigValidationError::invalid(
                "max_response_size",
                "max_response_size cannot be zero",
            ));
        }

        if self.accept_language.trim().is_empty() {
            result.add_warning("accept_language is empty; requests will send an empty Accept-Language");
        }

        result.merge(self.retry_policy.validate()?);
        Ok(result)
    }
}
