//! # Paygate
//!
//! Asynchronous HTTP execution layer for a payment gateway SDK.
//!
//! ## Features
//!
//! - **Async/Await**: Built on tokio, with callbacks delivered on a main lane
//! - **Typed failures**: Gateway status codes map to distinct error variants
//! - **Retries**: Fixed-count retry policies with an optional delay
//! - **TLS**: rustls with the Mozilla root store or pinned roots
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use paygate::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let auth = Authorization::from_string("sandbox_tmxhyf7d_dcpspy2brwdjr3qn")?;
//!     let http = HttpClient::new(HttpConfig::default())?;
//!     let configuration = ConfigurationLoader::new(http).load(&auth).await?;
//!     println!("{}", configuration.client_api_url);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// Re-export core types
pub use paygate_core::{
    Error, HttpClient, HttpConfig, HttpMethod, HttpRequest, HttpResponse, HttpResponseCallback,
    Result, RetryPolicy,
};

// Re-export gateway clients
pub use paygate_gateway::{
    Authorization, Configuration, ConfigurationLoader, Environment, GatewayHttpClient,
    GraphQlClient,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use paygate_core::prelude::*;
    pub use paygate_gateway::{
        Authorization, Configuration, ConfigurationLoader, GatewayHttpClient, GraphQlClient,
    };
}
