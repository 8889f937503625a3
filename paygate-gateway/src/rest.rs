//! Client API over REST.

use paygate_core::error::{Error, Result};
use paygate_core::http_client::{
    HttpClient, HttpMethod, HttpRequest, HttpResponse, HttpResponseCallback,
};
use reqwest::Url;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

use crate::authorization::{Authorization, CLIENT_KEY_HEADER, FINGERPRINT_FIELD};

/// Resolves `path` against `base_url` and attaches the credential as a query
/// parameter when it is a client token.
pub(crate) fn authorized_url(
    http: &HttpClient,
    base_url: &str,
    path: &str,
    authorization: &Authorization,
) -> Result<Url> {
    let mut url = http.request().base_url(base_url).path(path).build().url()?;
    if let Authorization::ClientToken {
        authorization_fingerprint,
        ..
    } = authorization
    {
        url.query_pairs_mut()
            .append_pair(FINGERPRINT_FIELD, authorization_fingerprint.expose_secret());
    }
    Ok(url)
}

/// Adds the fingerprint of a client token to a JSON object body.
pub(crate) fn authorized_body(body: &str, authorization: &Authorization) -> Result<String> {
    let Authorization::ClientToken {
        authorization_fingerprint,
        ..
    } = authorization
    else {
        return Ok(body.to_string());
    };

    let mut json: Value = serde_json::from_str(body)
        .map_err(|e| Error::invalid_argument(format!("Request body is not JSON: {e}")))?;
    let object = json
        .as_object_mut()
        .ok_or_else(|| Error::invalid_argument("Request body must be a JSON object"))?;
    object.insert(
        FINGERPRINT_FIELD.to_string(),
        Value::String(authorization_fingerprint.expose_secret().to_string()),
    );
    Ok(json.to_string())
}

/// REST client for the gateway's client API.
///
/// Tokenization keys travel in the `Client-Key` header. Client tokens travel
/// as an `authorizationFingerprint` query parameter on GET and as a field of
/// the JSON body on POST.
#[derive(Debug, Clone)]
pub struct GatewayHttpClient {
    http: HttpClient,
    authorization: Arc<Authorization>,
    base_url: String,
}

impl GatewayHttpClient {
    /// Creates a client rooted at `base_url`.
    pub fn new(http: HttpClient, authorization: Authorization, base_url: impl Into<String>) -> Self {
        Self {
            http,
            authorization: Arc::new(authorization),
            base_url: base_url.into(),
        }
    }

    /// The credential used for every request.
    pub fn authorization(&self) -> &Authorization {
        &self.authorization
    }

    /// Root URL relative paths resolve against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds an authorized request.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedRequest`] when the URL cannot be resolved and
    /// [`Error::InvalidArgument`] when a client token has to be added to a
    /// body that is not a JSON object.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&str>,
    ) -> Result<HttpRequest> {
        let authorization = self.authorization.as_ref();
        let mut builder = self
            .http
            .request()
            .method(method)
            .add_header("User-Agent", self.http.config().user_agent.clone());

        builder = match method {
            HttpMethod::Get | HttpMethod::Delete => builder.path(
                authorized_url(&self.http, &self.base_url, path, authorization)?.to_string(),
            ),
            HttpMethod::Post | HttpMethod::Put => builder.base_url(&self.base_url).path(path),
        };

        if let Authorization::TokenizationKey { key, .. } = authorization {
            builder = builder.add_header(CLIENT_KEY_HEADER, key.expose_secret());
        }
        if let Some(body) = body {
            builder = builder.data(authorized_body(body, authorization)?);
        }
        Ok(builder.build())
    }

    /// Sends a GET; `callback` receives the outcome on the main lane.
    ///
    /// # Errors
    ///
    /// Request construction errors are returned directly and the callback
    /// is not invoked.
    #[instrument(name = "gateway_get", skip(self, callback))]
    pub fn get(&self, path: &str, callback: Option<HttpResponseCallback>) -> Result<()> {
        let request = self.build_request(HttpMethod::Get, path, None)?;
        self.http.send(request, callback);
        Ok(())
    }

    /// Sends a POST with a JSON body; `callback` receives the outcome on the
    /// main lane.
    ///
    /// # Errors
    ///
    /// Request construction errors are returned directly and the callback
    /// is not invoked.
    #[instrument(name = "gateway_post", skip(self, body, callback))]
    pub fn post(
        &self,
        path: &str,
        body: &str,
        callback: Option<HttpResponseCallback>,
    ) -> Result<()> {
        let request = self.build_request(HttpMethod::Post, path, Some(body))?;
        self.http.send(request, callback);
        Ok(())
    }

    /// Sends a POST and awaits the outcome.
    #[instrument(name = "gateway_post_async", skip(self, body))]
    pub async fn post_async(&self, path: &str, body: &str) -> Result<HttpResponse> {
        let request = self.build_request(HttpMethod::Post, path, Some(body))?;
        self.http.fetch(request).await
    }
}
