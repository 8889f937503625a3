//! HTTP client abstraction layer
//!
//! Turns declarative [`HttpRequest`]s into round trips against the gateway:
//! - [`HttpExecutor`] performs one round trip (TLS, headers, body, timeouts)
//! - [`ResponseParser`] maps the status code and body to a string or an [`Error`](crate::Error)
//! - [`ThreadScheduler`] runs attempts on a background lane and callbacks on a serial main lane
//! - [`HttpClient`] ties them together with a retry policy
//!
//! # Example
//!
//! ```rust,no_run
//! use paygate_core::http_client::{HttpClient, HttpConfig, HttpMethod};
//!
//! # async fn run() -> paygate_core::Result<()> {
//! let client = HttpClient::new(HttpConfig::default())?;
//!
//! let request = client
//!     .request()
//!     .method(HttpMethod::Post)
//!     .base_url("https://api.example.com")
//!     .path("/v1/payment_methods")
//!     .data("{\"nonce\":\"fake-valid-nonce\"}")
//!     .build();
//!
//! client.send(
//!     request,
//!     Some(Box::new(|outcome| match outcome {
//!         Ok(response) => println!("{}", response.body()),
//!         Err(e) => eprintln!("{}", e.report()),
//!     })),
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Request bodies are zeroed right after they are written to the connection
//! and again once the call reaches its terminal outcome.

mod builder;
mod client;
mod config;
mod executor;
mod headers;
mod request;
mod response;
mod retry;
mod scheduler;
mod tls;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;


pub use builder::{HttpClient, HttpClientBuilder};
pub use config::{DEFAULT_TIMEOUT, HttpConfig};
pub use executor::{HttpExecutor, ReqwestExecutor, TLS_UNAVAILABLE_MESSAGE};
pub use request::{
    ACCEPT_ENCODING, ACCEPT_LANGUAGE, DEFAULT_LANGUAGE, HttpMethod, HttpRequest,
    HttpRequestBuilder, language_from_locale, system_language,
};
pub use response::{BaseResponseParser, HttpResponse, ResponseParser, StatusClass, decode_body};
pub use retry::HttpResponseCallback;
pub use scheduler::{MainTask, ThreadScheduler, TokioScheduler};
pub use tls::{PinnedRootsTlsProvider, TlsProvider, WebPkiTlsProvider};
