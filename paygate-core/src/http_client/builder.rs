use crate::error::Result;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use super::config::HttpConfig;
use super::executor::{HttpExecutor, ReqwestExecutor};
use super::request::{HttpRequest, HttpRequestBuilder};
use super::response::ResponseParser;
use super::scheduler::{ThreadScheduler, TokioScheduler};
use super::tls::{TlsProvider, WebPkiTlsProvider};

/// Asynchronous HTTP client.
///
/// Cheap to clone; clones share the executor, the scheduler and the
/// configuration.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    executor: Arc<dyn HttpExecutor>,
    scheduler: Arc<dyn ThreadScheduler>,
    config: HttpConfig,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("executor", &self.inner.executor)
            .field("scheduler", &self.inner.scheduler)
            .field("config", &self.inner.config)
            .finish()
    }
}

impl HttpClient {
    /// Creates a client with the default executor and scheduler.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate or if no
    /// Tokio runtime is running.
    pub fn new(config: HttpConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Starts building a client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Returns a reference to current HTTP configuration.
    pub fn config(&self) -> &HttpConfig {
        &self.inner.config
    }

    /// Starts a request seeded with this client's language and timeouts.
    pub fn request(&self) -> HttpRequestBuilder {
        let config = &self.inner.config;
        HttpRequest::builder_with_language(config.accept_language.clone())
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
    }

    pub(crate) fn executor(&self) -> &Arc<dyn HttpExecutor> {
        &self.inner.executor
    }

    pub(crate) fn scheduler(&self) -> &Arc<dyn ThreadScheduler> {
        &self.inner.scheduler
    }
}

/// Builder for [`HttpClient`].
///
/// # Example
///
/// ```rust,no_run
/// use paygate_core::http_client::{HttpClient, HttpConfig};
///
/// # async fn run() -> paygate_core::Result<()> {
/// let client = HttpClient::builder()
///     .config(HttpConfig {
///         accept_language: "fr".to_string(),
///         ..Default::default()
///     })
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct HttpClientBuilder {
    config: HttpConfig,
    executor: Option<Arc<dyn HttpExecutor>>,
    scheduler: Option<Arc<dyn ThreadScheduler>>,
    parser: Option<Arc<dyn ResponseParser>>,
    tls_provider: Option<Arc<dyn TlsProvider>>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            config: HttpConfig::default(),
            executor: None,
            scheduler: None,
            parser: None,
            tls_provider: Some(Arc::new(WebPkiTlsProvider)),
        }
    }
}

impl fmt::Debug for HttpClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClientBuilder")
            .field("config", &self.config)
            .field("executor", &self.executor)
            .field("scheduler", &self.scheduler)
            .field("parser", &self.parser)
            .field("tls_provider", &self.tls_provider)
            .finish()
    }
}

impl HttpClientBuilder {
    /// Sets the configuration.
    pub fn config(mut self, config: HttpConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses a custom executor. Parser and TLS settings are then ignored.
    pub fn executor(mut self, executor: Arc<dyn HttpExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Uses a custom scheduler.
    pub fn scheduler(mut self, scheduler: Arc<dyn ThreadScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Uses a custom response parser for the default executor.
    pub fn parser(mut self, parser: Arc<dyn ResponseParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Sets the TLS provider for the default executor. `None` leaves HTTPS
    /// unavailable.
    pub fn tls_provider(mut self, provider: Option<Arc<dyn TlsProvider>>) -> Self {
        self.tls_provider = provider;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate, or if the
    /// default scheduler is needed and no Tokio runtime is running.
    pub fn build(self) -> Result<HttpClient> {
        let validation = self.config.validate()?;
        for warning in &validation.warnings {
            warn!(warning = %warning, "HTTP configuration warning");
        }

        let executor = match self.executor {
            Some(executor) => executor,
            None => {
                let mut executor = ReqwestExecutor::new(self.config.clone())
                    .with_tls_provider(self.tls_provider);
                if let Some(parser) = self.parser {
                    executor = executor.with_parser(parser);
                }
                Arc::new(executor)
            }
        };

        let scheduler = match self.scheduler {
            Some(scheduler) => scheduler,
            None => Arc::new(TokioScheduler::new(self.config.max_concurrent_requests)?),
        };

        Ok(HttpClient {
            inner: Arc::new(ClientInner {
                executor,
                scheduler,
                config: self.config,
            }),
        })
    }
}
