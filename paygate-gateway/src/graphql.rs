//! GraphQL endpoint client.
//!
//! GraphQL failures arrive as HTTP 200 with an `errors` array, so the client
//! runs its own parser on top of the status mapping.

use async_trait::async_trait;
use paygate_core::error::{Error, Result};
use paygate_core::http_client::{
    BaseResponseParser, HttpClient, HttpConfig, HttpMethod, HttpRequest, HttpResponse,
    HttpResponseCallback, ResponseParser, StatusClass,
};
use reqwest::Response;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::authorization::Authorization;

/// API version pinned on every GraphQL request.
pub const GATEWAY_VERSION: &str = "2018-03-06";

/// Message for GraphQL errors without a known class.
pub const UNEXPECTED_GRAPHQL_MESSAGE: &str = "An unexpected error occurred";

/// Legacy code the gateway uses for authorization failures.
const LEGACY_AUTHORIZATION_CODE: &str = "50000";

/// Converts a 200 body carrying GraphQL `errors` into a typed error.
///
/// The first entry decides:
/// - `extensions.errorClass == "VALIDATION"` gives [`Error::UnprocessableEntity`] with the whole body
/// - `extensions.legacyCode == "50000"` gives [`Error::Authorization`] with the entry's message
/// - anything else gives [`Error::UnexpectedStatus`]
///
/// Bodies that are not JSON, or have no errors, pass through.
pub fn check_graphql_errors(body: &str) -> Result<()> {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return Ok(());
    };
    let Some(first) = json
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
    else {
        return Ok(());
    };

    let extensions = first.get("extensions");
    let error_class = extensions
        .and_then(|e| e.get("errorClass"))
        .and_then(Value::as_str);
    let legacy_code = extensions
        .and_then(|e| e.get("legacyCode"))
        .and_then(|code| match code {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

    if error_class == Some("VALIDATION") {
        return Err(Error::unprocessable_entity(body));
    }
    if legacy_code.as_deref() == Some(LEGACY_AUTHORIZATION_CODE) {
        let message = first
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Err(Error::authorization(message));
    }
    Err(Error::unexpected_status(200, UNEXPECTED_GRAPHQL_MESSAGE))
}

/// [`ResponseParser`] for the GraphQL endpoint.
#[derive(Debug, Clone, Default)]
pub struct GraphQlResponseParser {
    base: BaseResponseParser,
}

impl GraphQlResponseParser {
    /// Creates a parser that refuses bodies over `max_response_size` bytes.
    pub fn new(max_response_size: usize) -> Self {
        Self {
            base: BaseResponseParser::new(max_response_size),
        }
    }
}

#[async_trait]
impl ResponseParser for GraphQlResponseParser {
    async fn parse(&self, response: Response) -> Result<String> {
        let status = response.status().as_u16();
        if StatusClass::from_status(status) != StatusClass::Success {
            return self.base.parse(response).await;
        }

        let body = self.base.read_body(response).await?;
        if let Err(e) = check_graphql_errors(&body) {
            warn!(status, error = %e, "GraphQL request returned errors");
            return Err(e);
        }
        Ok(body)
    }
}

/// Client for the gateway's GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    http: HttpClient,
    url: String,
    authorization: Arc<Authorization>,
}

impl GraphQlClient {
    /// Creates a client whose executor parses GraphQL errors.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not validate or no Tokio runtime is
    /// running.
    pub fn new(
        authorization: Authorization,
        url: impl Into<String>,
        config: HttpConfig,
    ) -> Result<Self> {
        let parser = Arc::new(GraphQlResponseParser::new(config.max_response_size));
        let http = HttpClient::builder().config(config).parser(parser).build()?;
        Ok(Self::with_http_client(http, authorization, url))
    }

    /// Wraps an existing client. Its executor should already parse GraphQL
    /// errors.
    pub fn with_http_client(
        http: HttpClient,
        authorization: Authorization,
        url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            url: url.into(),
            authorization: Arc::new(authorization),
        }
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Builds the POST for a GraphQL payload.
    pub fn build_request(&self, payload: &str) -> HttpRequest {
        self.http
            .request()
            .method(HttpMethod::Post)
            .path(self.url.as_str())
            .add_header("User-Agent", self.http.config().user_agent.clone())
            .add_header(
                "Authorization",
                format!("Bearer {}", self.authorization.bearer()),
            )
            .add_header("Gateway-Version", GATEWAY_VERSION)
            .data(payload)
            .build()
    }

    /// Sends `payload`; `callback` receives the outcome on the main lane.
    #[instrument(name = "graphql_post", skip(self, payload, callback))]
    pub fn post(&self, payload: &str, callback: Option<HttpResponseCallback>) {
        debug!(url = %self.url, "Sending GraphQL request");
        self.http.send(self.build_request(payload), callback);
    }

    /// Sends `payload` and awaits the outcome.
    #[instrument(name = "graphql_post_async", skip(self, payload))]
    pub async fn post_async(&self, payload: &str) -> Result<HttpResponse> {
        self.http.fetch(self.build_request(payload)).await
    }
}
