//! Remote merchant configuration.

use dashmap::DashMap;
use paygate_core::config::RetryPolicy;
use paygate_core::error::{Error, Result};
use paygate_core::http_client::HttpClient;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::authorization::{Authorization, CLIENT_KEY_HEADER};
use crate::rest::authorized_url;

/// Configuration schema version requested from the gateway.
pub const CONFIG_VERSION: &str = "3";

#[derive(Debug, Clone, Deserialize)]
struct GraphQlSection {
    url: String,
}

/// Merchant configuration returned by the gateway.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Root of the client API
    pub client_api_url: String,
    /// `sandbox`, `production`, ...
    pub environment: String,
    /// Merchant the credential belongs to
    pub merchant_id: String,
    #[serde(default, rename = "graphQL")]
    graphql: Option<GraphQlSection>,
    #[serde(skip)]
    raw: String,
}

impl Configuration {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] when required fields are missing.
    pub fn from_json(raw: &str) -> Result<Self> {
        let mut configuration: Configuration = serde_json::from_str(raw)
            .map_err(|e| Error::invalid_argument(format!("Invalid configuration: {e}")))?;
        configuration.raw = raw.to_string();
        Ok(configuration)
    }

    /// GraphQL endpoint, when the merchant has one.
    pub fn graphql_url(&self) -> Option<&str> {
        self.graphql.as_ref().map(|g| g.url.as_str())
    }

    /// The document as received.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// Fetches configuration documents and keeps successful ones in memory.
///
/// Entries are keyed by URL and a hash of the credential; a hit returns
/// without touching the network.
#[derive(Debug, Clone)]
pub struct ConfigurationLoader {
    http: HttpClient,
    cache: Arc<DashMap<(String, u64), Arc<Configuration>>>,
}

impl ConfigurationLoader {
    /// Creates a loader with an empty cache.
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Loads the configuration at the credential's own configuration URL.
    pub async fn load(&self, authorization: &Authorization) -> Result<Arc<Configuration>> {
        let url = authorization.config_url()?;
        self.load_from(&url, authorization).await
    }

    /// Loads the configuration at `config_url`.
    ///
    /// Retries up to three times in total. Failures are not cached.
    #[instrument(name = "load_configuration", skip(self, authorization))]
    pub async fn load_from(
        &self,
        config_url: &str,
        authorization: &Authorization,
    ) -> Result<Arc<Configuration>> {
        let key = (config_url.to_string(), authorization.fingerprint_hash());
        if let Some(cached) = self.cache.get(&key) {
            debug!("Configuration cache hit");
            return Ok(Arc::clone(&cached));
        }

        let mut url = authorized_url(&self.http, "", config_url, authorization)?;
        url.query_pairs_mut().append_pair("configVersion", CONFIG_VERSION);

        let mut builder = self.http.request().path(url.to_string());
        if let Authorization::TokenizationKey { key, .. } = authorization {
            builder = builder.add_header(CLIENT_KEY_HEADER, key.expose_secret());
        }

        let response = self
            .http
            .fetch_with_retry(builder.build(), RetryPolicy::max_3_times())
            .await?;
        let configuration = Arc::new(Configuration::from_json(response.body())?);

        info!(
            merchant_id = %configuration.merchant_id,
            environment = %configuration.environment,
            "Configuration loaded"
        );
        self.cache.insert(key, Arc::clone(&configuration));
        Ok(configuration)
    }

    /// Number of cached documents.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Drops every cached document.
    pub fn clear(&self) {
        self.cache.clear();
    }
}
