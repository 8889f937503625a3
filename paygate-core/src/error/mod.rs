//! # Error handling for paygate
//!
//! Every fallible operation in the HTTP layer returns [`Result<T>`], whose
//! error type is the closed-for-matching, open-for-extension [`Error`] enum.
//!
//! ## Error hierarchy
//!
//! ```text
//! Error
//! ├── MalformedRequest     - missing/invalid base URL or path
//! ├── InvalidArgument      - caller passed an unusable value
//! ├── UnprocessableEntity  - HTTP 400 / 422
//! ├── Authentication       - HTTP 401
//! ├── Authorization        - HTTP 403
//! ├── UpgradeRequired      - HTTP 426
//! ├── RateLimit            - HTTP 429
//! ├── ServerError          - HTTP 500
//! ├── ServiceUnavailable   - HTTP 503
//! ├── UnexpectedStatus     - any other status
//! ├── Network              - TLS, socket, timeout and decode failures (via NetworkError)
//! ├── RetryLimitExceeded   - every attempt of a retried call failed
//! └── Context              - error with additional context
//! ```
//!
//! ## Quick start
//!
//! ```rust
//! use paygate_core::error::{Error, Result};
//!
//! fn check(path: &str) -> Result<()> {
//!     if path.is_empty() {
//!         return Err(Error::invalid_argument("Path cannot be empty"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check("").is_err());
//! ```
//!
//! Gateway messages are kept verbatim: for status errors, [`Error::message`]
//! returns exactly the decoded response body.

mod config;
mod context;
pub(crate) mod convert;
mod network;

use std::borrow::Cow;
use std::error::Error as StdError;
use thiserror::Error;

pub use config::{ConfigValidationError, ValidationResult};
pub use context::ContextExt;
pub use network::NetworkError;

/// Fixed message delivered for HTTP 429 responses.
pub const RATE_LIMIT_MESSAGE: &str =
    "You are being rate-limited. Please try again in a few minutes.";

/// Fixed message delivered when every attempt of a retried call failed.
pub const RETRY_LIMIT_MESSAGE: &str = "Retry limit has been exceeded. Try again later.";

/// Result type alias for all paygate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The primary error type for the paygate HTTP layer.
///
/// Large variants are boxed to keep the enum small; static messages use
/// `Cow<'static, str>` to avoid allocation.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The request URL could not be built (missing base URL, unparsable path).
    #[error("Malformed request: {0}")]
    MalformedRequest(Cow<'static, str>),

    /// A required argument was missing or unusable.
    #[error("Invalid argument: {0}")]
    InvalidArgument(Cow<'static, str>),

    /// The gateway rejected the request semantics (HTTP 400 or 422).
    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    /// Credentials were missing or invalid (HTTP 401).
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Credentials lack permission for the operation (HTTP 403).
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// The SDK version is no longer accepted by the gateway (HTTP 426).
    #[error("Upgrade required: {0}")]
    UpgradeRequired(String),

    /// Too many requests (HTTP 429).
    #[error("{0}")]
    RateLimit(Cow<'static, str>),

    /// Internal gateway failure (HTTP 500).
    #[error("Server error: {0}")]
    ServerError(String),

    /// Gateway is down for maintenance or overloaded (HTTP 503).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Any status code without a dedicated variant.
    #[error("Unexpected HTTP status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Decoded response body
        message: String,
    },

    /// Transport failures. Boxed to reduce enum size.
    #[error("Network error: {0}")]
    Network(Box<NetworkError>),

    /// All attempts of a retried call failed.
    #[error("{message}")]
    RetryLimitExceeded {
        /// Always [`RETRY_LIMIT_MESSAGE`]
        message: Cow<'static, str>,
        /// The failure of the final attempt
        #[source]
        last_error: Box<Error>,
    },

    /// Error with additional context, preserving the error chain.
    #[error("{context}")]
    Context {
        /// Context message describing what operation failed
        context: String,
        /// The underlying error
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    // ==================== Constructor Methods ====================

    /// Creates a malformed request error.
    pub fn malformed_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::MalformedRequest(msg.into())
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates an unprocessable entity error carrying the gateway body.
    pub fn unprocessable_entity(body: impl Into<String>) -> Self {
        Self::UnprocessableEntity(body.into())
    }

    /// Creates an authentication error.
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Creates an authorization error.
    pub fn authorization(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }

    /// Creates an upgrade required error.
    pub fn upgrade_required(msg: impl Into<String>) -> Self {
        Self::UpgradeRequired(msg.into())
    }

    /// Creates the rate limit error with the fixed gateway message.
    pub fn rate_limit() -> Self {
        Self::RateLimit(Cow::Borrowed(RATE_LIMIT_MESSAGE))
    }

    /// Creates a server error.
    pub fn server_error(msg: impl Into<String>) -> Self {
        Self::ServerError(msg.into())
    }

    /// Creates a service unavailable error.
    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::ServiceUnavailable(msg.into())
    }

    /// Creates an unexpected status error.
    pub fn unexpected_status(status: u16, msg: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            status,
            message: msg.into(),
        }
    }

    /// Creates a connection failure.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(Box::new(NetworkError::ConnectionFailed(msg.into())))
    }

    /// Creates a TLS failure.
    pub fn ssl(msg: impl Into<String>) -> Self {
        Self::Network(Box::new(NetworkError::Ssl(msg.into())))
    }

    /// Wraps the final attempt's failure once the retry budget is spent.
    pub fn retry_limit_exceeded(last_error: Error) -> Self {
        Self::RetryLimitExceeded {
            message: Cow::Borrowed(RETRY_LIMIT_MESSAGE),
            last_error: Box::new(last_error),
        }
    }

    // ==================== Context Methods ====================

    /// Attaches context to an existing error.
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    fn iter_chain(&self) -> impl Iterator<Item = &Error> {
        std::iter::successors(Some(self), |err| match err {
            Error::Context { source, .. } => Some(source.as_ref()),
            _ => None,
        })
    }

    /// Returns the root cause of the error, skipping Context layers.
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        self.iter_chain().last().unwrap_or(self)
    }

    /// Generates a detailed error report with the full chain.
    ///
    /// ```rust
    /// use paygate_core::error::Error;
    ///
    /// let err = Error::server_error("boom").context("Failed to fetch configuration");
    /// assert_eq!(
    ///     err.report(),
    ///     "Failed to fetch configuration\nCaused by: Server error: boom"
    /// );
    /// ```
    #[must_use]
    pub fn report(&self) -> String {
        use std::fmt::Write;
        let mut report = String::new();
        report.push_str(&self.to_string());

        let mut current: Option<&(dyn StdError + 'static)> = self.source();
        while let Some(err) = current {
            let _ = write!(report, "\nCaused by: {err}");
            current = err.source();
        }
        report
    }

    // ==================== Inspection (Context Penetrating) ====================

    /// The verbatim message carried by this error.
    ///
    /// For status errors this is the decoded response body; for
    /// [`Error::RateLimit`] and [`Error::RetryLimitExceeded`] it is the fixed
    /// message. Transport and context errors have no verbatim message.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self.root_cause() {
            Error::MalformedRequest(msg)
            | Error::InvalidArgument(msg)
            | Error::RateLimit(msg) => Some(msg.as_ref()),
            Error::UnprocessableEntity(msg)
            | Error::Authentication(msg)
            | Error::Authorization(msg)
            | Error::UpgradeRequired(msg)
            | Error::ServerError(msg)
            | Error::ServiceUnavailable(msg)
            | Error::UnexpectedStatus { message: msg, .. } => Some(msg.as_str()),
            Error::RetryLimitExceeded { message, .. } => Some(message.as_ref()),
            Error::Network(_) | Error::Context { .. } => None,
        }
    }

    /// The HTTP status code this error was derived from, if any.
    ///
    /// 400 and 422 both map to `UnprocessableEntity`; this reports 422.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self.root_cause() {
            Error::UnprocessableEntity(_) => Some(422),
            Error::Authentication(_) => Some(401),
            Error::Authorization(_) => Some(403),
            Error::UpgradeRequired(_) => Some(426),
            Error::RateLimit(_) => Some(429),
            Error::ServerError(_) => Some(500),
            Error::ServiceUnavailable(_) => Some(503),
            Error::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure is transient by nature.
    ///
    /// This is advisory only: the async client retries every failed attempt
    /// regardless of kind, while malformed requests are rejected before the
    /// first attempt.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.root_cause(),
            Error::ServerError(_)
                | Error::ServiceUnavailable(_)
                | Error::UnexpectedStatus { .. }
                | Error::Network(_)
        )
    }

    /// Returns the transport error, if this is one (penetrates Context layers).
    #[must_use]
    pub fn as_network(&self) -> Option<&NetworkError> {
        match self.root_cause() {
            Error::Network(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    /// Returns the failure of the final attempt for retry-exhausted calls.
    #[must_use]
    pub fn last_attempt_error(&self) -> Option<&Error> {
        match self.root_cause() {
            Error::RetryLimitExceeded { last_error, .. } => Some(last_error.as_ref()),
            _ => None,
        }
    }
}
