//! Paygate Gateway
//!
//! Gateway-facing clients built on [`paygate_core`]:
//!
//! - [`Authorization`] parses tokenization keys and client tokens
//! - [`GatewayHttpClient`] talks to the REST client API
//! - [`GraphQlClient`] posts to the GraphQL endpoint and turns `errors`
//!   payloads into typed failures
//! - [`ConfigurationLoader`] fetches and caches the merchant configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use paygate_core::prelude::*;
//! use paygate_gateway::{Authorization, ConfigurationLoader, GatewayHttpClient};
//!
//! # async fn example() -> Result<()> {
//! let auth = Authorization::from_string("sandbox_tmxhyf7d_dcpspy2brwdjr3qn")?;
//! let http = HttpClient::new(HttpConfig::default())?;
//!
//! let configuration = ConfigurationLoader::new(http.clone()).load(&auth).await?;
//! let rest = GatewayHttpClient::new(http, auth, configuration.client_api_url.clone());
//! let response = rest.post_async("v1/payment_methods/credit_cards", "{}").await?;
//! println!("{}", response.body());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]

pub mod authorization;
pub mod configuration;
pub mod graphql;
pub mod rest;

pub use authorization::{Authorization, Environment};
pub use configuration::{Configuration, ConfigurationLoader};
pub use graphql::{GraphQlClient, GraphQlResponseParser, check_graphql_errors};
pub use rest::GatewayHttpClient;
