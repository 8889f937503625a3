//! Transport-level error types.

use std::error::Error as StdError;
use thiserror::Error;

/// Failures below the HTTP status line: TLS, sockets, timeouts and body
/// decoding.
///
/// Third-party error types (such as `reqwest::Error`) never appear in the
/// public API; they are either flattened into a message or kept opaque in
/// [`NetworkError::Transport`].
///
/// # Example
///
/// ```rust
/// use paygate_core::error::{Error, NetworkError};
///
/// let err: Error = NetworkError::Ssl("handshake failed".to_string()).into();
/// assert!(err.to_string().contains("handshake failed"));
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NetworkError {
    /// Connect or read timeout elapsed.
    #[error("Request timeout")]
    Timeout,

    /// Connection could not be established.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// TLS configuration or handshake failure.
    #[error("SSL/TLS error: {0}")]
    Ssl(String),

    /// Response body could not be decoded (bad gzip stream, truncated body).
    #[error("Failed to decode response body: {0}")]
    Decode(String),

    /// Response body exceeded the configured size limit.
    #[error("Response size {size} bytes exceeds limit {limit} bytes")]
    ResponseTooLarge {
        /// Bytes received before the limit was hit
        size: usize,
        /// Configured limit
        limit: usize,
    },

    /// Opaque transport error for everything else.
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync + 'static>),
}
