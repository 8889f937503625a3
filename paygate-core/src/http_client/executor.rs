use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};

use super::config::HttpConfig;
use super::headers::to_header_map;
use super::request::HttpRequest;
use super::response::{BaseResponseParser, HttpResponse, ResponseParser};
use super::tls::{TlsProvider, WebPkiTlsProvider};

/// Message delivered when HTTPS is requested but no TLS configuration exists.
pub const TLS_UNAVAILABLE_MESSAGE: &str =
    "TLS configuration was not set or failed to initialize";

/// Performs exactly one HTTP round trip.
#[async_trait]
pub trait HttpExecutor: Send + Sync + fmt::Debug {
    /// Sends `request` and parses the reply.
    ///
    /// The request body is zeroed once it has been written.
    async fn execute(&self, request: &mut HttpRequest) -> Result<HttpResponse>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ClientKey {
    https: bool,
    connect_timeout: Duration,
    read_timeout: Duration,
}

/// [`HttpExecutor`] backed by `reqwest`.
///
/// Connections are pooled per (scheme, connect timeout, read timeout); the
/// rustls configuration is built on the first HTTPS request and shared by
/// every HTTPS client afterwards.
pub struct ReqwestExecutor {
    config: HttpConfig,
    tls_provider: Option<Arc<dyn TlsProvider>>,
    tls_config: OnceCell<Arc<rustls::ClientConfig>>,
    clients: DashMap<ClientKey, Client>,
    parser: Arc<dyn ResponseParser>,
}

impl fmt::Debug for ReqwestExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestExecutor")
            .field("tls_provider", &self.tls_provider)
            .field("tls_initialized", &self.tls_config.initialized())
            .field("clients", &self.clients.len())
            .field("parser", &self.parser)
            .finish_non_exhaustive()
    }
}

impl ReqwestExecutor {
    /// Creates an executor trusting the `webpki-roots` bundle and parsing
    /// replies with [`BaseResponseParser`].
    pub fn new(config: HttpConfig) -> Self {
        let parser = BaseResponseParser::new(config.max_response_size).with_verbose(config.verbose);
        Self {
            config,
            tls_provider: Some(Arc::new(WebPkiTlsProvider)),
            tls_config: OnceCell::new(),
            clients: DashMap::new(),
            parser: Arc::new(parser),
        }
    }

    /// Replaces the TLS provider. `None` makes every HTTPS request fail.
    pub fn with_tls_provider(mut self, provider: Option<Arc<dyn TlsProvider>>) -> Self {
        self.tls_provider = provider;
        self
    }

    /// Replaces the response parser.
    pub fn with_parser(mut self, parser: Arc<dyn ResponseParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Configuration this executor was built with.
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    async fn tls_config(&self) -> Result<Arc<rustls::ClientConfig>> {
        let Some(provider) = self.tls_provider.as_ref() else {
            warn!("HTTPS requested without a TLS provider");
            return Err(Error::ssl(TLS_UNAVAILABLE_MESSAGE));
        };

        self.tls_config
            .get_or_try_init(|| async {
                provider.client_config().map(Arc::new).map_err(|e| {
                    warn!(error = %e, "TLS provider failed to build a configuration");
                    Error::ssl(TLS_UNAVAILABLE_MESSAGE)
                })
            })
            .await
            .cloned()
    }

    async fn client_for(&self, key: ClientKey) -> Result<Client> {
        if let Some(client) = self.clients.get(&key) {
            return Ok(client.clone());
        }

        let mut builder = Client::builder()
            .connect_timeout(key.connect_timeout)
            .read_timeout(key.read_timeout)
            .no_gzip()
            .user_agent(&self.config.user_agent);

        if key.https {
            let tls = self.tls_config().await?;
            builder = builder.use_preconfigured_tls((*tls).clone());
        }

        let client = builder
            .build()
            .map_err(|e| Error::network(format!("Failed to build HTTP client: {e}")))?;

        debug!(
            https = key.https,
            connect_timeout_ms = key.connect_timeout.as_millis(),
            read_timeout_ms = key.read_timeout.as_millis(),
            "Created HTTP client"
        );
        Ok(self.clients.entry(key).or_insert(client).clone())
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    #[instrument(
        name = "http_execute",
        skip(self, request),
        fields(method = %request.method(), url)
    )]
    async fn execute(&self, request: &mut HttpRequest) -> Result<HttpResponse> {
        let url = request.validate()?;
        tracing::Span::current().record("url", url.as_str());

        let https = match url.scheme() {
            "https" => true,
            "http" => false,
            other => {
                return Err(Error::malformed_request(format!(
                    "Unsupported URL scheme '{other}'"
                )));
            }
        };

        let client = self
            .client_for(ClientKey {
                https,
                connect_timeout: request.connect_timeout(),
                read_timeout: request.read_timeout(),
            })
            .await?;

        let headers = to_header_map(request)?;
        let mut builder = client
            .request(request.method().to_reqwest(), url)
            .headers(headers);

        if request.method().writes_body()
            && let Some(body) = request.body()
        {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.expose_secret().to_vec());
            request.dispose();
        }

        let started_at = Utc::now();
        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "HTTP request failed");
            Error::from(e)
        })?;

        let body = self.parser.parse(response).await?;
        let finished_at = Utc::now();

        let timed = HttpResponse::new(body, started_at, finished_at);
        debug!(duration_ms = timed.duration().as_millis(), "HTTP round trip complete");
        Ok(timed)
    }
}
