//! Paygate Core Library
//!
//! The asynchronous HTTP execution layer of the paygate SDK: request
//! descriptors, a response parser that maps gateway status codes to typed
//! errors, a single-round-trip executor, a two-lane scheduler and a client
//! that retries failed attempts and delivers outcomes through callbacks.
//!
//! # Features
//!
//! - **Typed failures**: every status class the gateway uses has its own
//!   [`Error`] variant carrying the response body verbatim
//! - **Secret hygiene**: request bodies are zeroed after they are written
//! - **Async/Await**: built on tokio and reqwest with rustls
//! - **Error Handling**: comprehensive error types with `thiserror`
//!
//! # Example
//!
//! ```rust,no_run
//! use paygate_core::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let client = HttpClient::new(HttpConfig::default())?;
//!
//! let request = client
//!     .request()
//!     .base_url("https://api.example.com")
//!     .path("/v1/configuration")
//!     .build();
//!
//! let response = client
//!     .fetch_with_retry(request, RetryPolicy::max_3_times())
//!     .await?;
//! println!("{} in {:?}", response.body(), response.duration());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// =============================================================================
// Global Clippy Lint Suppressions
// =============================================================================
// - module_name_repetitions: HttpClient in http_client, HttpConfig in config
// - missing_errors_doc: Too verbose to document every Result-returning function
// - missing_panics_doc: Too verbose to document every potential panic
// - must_use_candidate: Not all return values need #[must_use]
// - doc_markdown: Technical terms in docs don't need backticks (e.g., gzip, TLS)
// - return_self_not_must_use: Builder pattern methods return Self without must_use
// =============================================================================
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]

// Re-exports of external dependencies
pub use serde_json;

// Core modules
pub mod config;
pub mod credentials;
pub mod error;
pub mod http_client;
pub mod logging;

// Re-exports of core types for convenience
pub use config::RetryPolicy;
pub use credentials::{RequestBody, SecretString};
pub use error::{ContextExt, Error, NetworkError, Result};
pub use http_client::{
    HttpClient, HttpConfig, HttpMethod, HttpRequest, HttpResponse, HttpResponseCallback,
};

/// Prelude module for convenient imports
///
/// Import everything needed for typical use:
///
/// ```rust
/// use paygate_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::RetryPolicy;
    pub use crate::credentials::{RequestBody, SecretString};
    pub use crate::error::{ContextExt, Error, NetworkError, Result};
    pub use crate::http_client::{
        BaseResponseParser, HttpClient, HttpClientBuilder, HttpConfig, HttpExecutor, HttpMethod,
        HttpRequest, HttpResponse, HttpResponseCallback, ResponseParser, StatusClass,
        ThreadScheduler, TlsProvider,
    };
    pub use crate::logging::{LogConfig, LogFormat, LogLevel};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
