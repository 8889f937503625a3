use crate::credentials::RequestBody;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use reqwest::Url;
use std::fmt;
use std::time::Duration;

use super::config::DEFAULT_TIMEOUT;

/// Header always seeded on a new request.
pub const ACCEPT_ENCODING: &str = "accept-encoding";
/// Header always seeded on a new request.
pub const ACCEPT_LANGUAGE: &str = "accept-language";
/// Language used when the system locale is unknown or unusable.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Language subtag of a locale identifier such as `fr-CA`, `pt_BR.UTF-8`
/// or `sr-Latn-RS`. `None` for `C`, `POSIX` and anything that is not a
/// two or three letter code.
pub fn language_from_locale(locale: &str) -> Option<String> {
    let language = locale
        .trim()
        .split(['-', '_', '.', '@'])
        .next()?
        .to_ascii_lowercase();
    let valid = (2..=3).contains(&language.len())
        && language.chars().all(|c| c.is_ascii_alphabetic());
    valid.then_some(language)
}

/// Language of the current system locale, or [`DEFAULT_LANGUAGE`].
pub fn system_language() -> String {
    sys_locale::get_locale()
        .as_deref()
        .and_then(language_from_locale)
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

/// HTTP methods understood by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    /// GET, never carries a body
    #[default]
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// The method name as sent on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether a body set on the request is written to the connection.
    pub const fn writes_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative description of one HTTP call.
///
/// Built once with [`HttpRequest::builder`], then treated as read-only by
/// the executor. The only mutation after building is [`HttpRequest::dispose`],
/// which zeroes the body in place.
///
/// # Example
///
/// ```rust
/// use paygate_core::http_client::{HttpMethod, HttpRequest};
///
/// let request = HttpRequest::builder()
///     .method(HttpMethod::Post)
///     .base_url("https://api.example.com/")
///     .path("/v1/things?expand=all")
///     .data("{\"a\":1}")
///     .add_header("Authorization", "Bearer token")
///     .build();
///
/// assert_eq!(
///     request.url().unwrap().as_str(),
///     "https://api.example.com/v1/things?expand=all"
/// );
/// assert_eq!(request.header("accept-encoding"), Some("gzip"));
/// ```
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: HttpMethod,
    base_url: Option<String>,
    path: Option<String>,
    body: Option<RequestBody>,
    headers: IndexMap<String, String>,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl Default for HttpRequest {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl HttpRequest {
    /// Starts a request whose `Accept-Language` is the system locale's
    /// language.
    pub fn builder() -> HttpRequestBuilder {
        HttpRequestBuilder::new(system_language())
    }

    /// Starts a request with the given `Accept-Language`.
    pub fn builder_with_language(language: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(language)
    }

    /// The HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The base URL, if one was set.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// The path (or absolute URL), if one was set.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// The body, if one was set.
    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Headers in insertion order; names are lowercase.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Looks up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Read timeout.
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Resolves the URL this request targets.
    ///
    /// An absolute `path` (scheme and host) is used as given and the base
    /// URL is ignored. Like every [`Url`], it comes back in normalized form:
    /// scheme and host are lowercased and an empty path becomes `/`, so
    /// `https://x.com` resolves to `https://x.com/`. Otherwise the base URL and path are joined with
    /// exactly one `/`, whatever slashes either side carries; query and
    /// fragment on the path are preserved.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedRequest`] when the path is relative and the base URL
    /// is missing or empty, or when the joined string is not a valid URL.
    pub fn url(&self) -> Result<Url> {
        let path = self.path.as_deref().unwrap_or_default();
        if let Some(absolute) = parse_absolute(path) {
            return Ok(absolute);
        }

        let base = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|base| !base.is_empty())
            .ok_or_else(|| {
                Error::malformed_request("Base URL is missing and path is not an absolute URL")
            })?;

        let joined = format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined)
            .map_err(|e| Error::malformed_request(format!("Invalid URL '{joined}': {e}")))
    }

    /// Checks the request can be dispatched and returns its URL.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] without a path, otherwise whatever
    /// [`HttpRequest::url`] returns.
    pub fn validate(&self) -> Result<Url> {
        if self.path.is_none() {
            return Err(Error::invalid_argument("Path is required"));
        }
        self.url()
    }

    /// Zeroes the body in place. No-op without a body; safe to call twice.
    pub fn dispose(&mut self) {
        if let Some(body) = self.body.as_mut() {
            body.dispose();
        }
    }
}

fn parse_absolute(path: &str) -> Option<Url> {
    Url::parse(path).ok().filter(|url| !url.cannot_be_a_base())
}

/// Builder for [`HttpRequest`].
///
/// Every setter consumes and returns the builder so calls can be chained.
#[derive(Debug, Clone)]
pub struct HttpRequestBuilder {
    request: HttpRequest,
}

impl HttpRequestBuilder {
    fn new(language: impl Into<String>) -> Self {
        let mut headers = IndexMap::new();
        headers.insert(ACCEPT_ENCODING.to_string(), "gzip".to_string());
        headers.insert(ACCEPT_LANGUAGE.to_string(), language.into());

        Self {
            request: HttpRequest {
                method: HttpMethod::Get,
                base_url: None,
                path: None,
                body: None,
                headers,
                connect_timeout: DEFAULT_TIMEOUT,
                read_timeout: DEFAULT_TIMEOUT,
            },
        }
    }

    /// Sets the HTTP method.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.request.method = method;
        self
    }

    /// Sets the base URL relative paths are joined to.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.request.base_url = Some(base_url.into());
        self
    }

    /// Sets the path, or an absolute URL that overrides the base URL.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.request.path = Some(path.into());
        self
    }

    /// Sets the body, UTF-8 encoded.
    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.request.body = Some(RequestBody::from(data.into()));
        self
    }

    /// Adds a header. Names are case-insensitive; adding an existing name
    /// replaces its value but keeps its position.
    pub fn add_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.request
            .headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.request.connect_timeout = timeout;
        self
    }

    /// Sets the read timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.request.read_timeout = timeout;
        self
    }

    /// Finishes the request.
    pub fn build(self) -> HttpRequest {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(base: &str, path: &str) -> String {
        HttpRequest::builder()
            .base_url(base)
            .path(path)
            .build()
            .url()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_defaults() {
        let request = HttpRequest::builder().build();
        assert_eq!(request.method(), HttpMethod::Get);
        assert_eq!(request.connect_timeout(), Duration::from_millis(30_000));
        assert_eq!(request.read_timeout(), Duration::from_millis(30_000));
        assert!(request.body().is_none());

        let language = system_language();
        let headers: Vec<_> = request.headers().collect();
        assert_eq!(
            headers,
            vec![("accept-encoding", "gzip"), ("accept-language", language.as_str())]
        );
    }

    #[test]
    fn test_language_from_locale() {
        assert_eq!(language_from_locale("fr-CA").as_deref(), Some("fr"));
        assert_eq!(language_from_locale("pt_BR.UTF-8").as_deref(), Some("pt"));
        assert_eq!(language_from_locale("DE").as_deref(), Some("de"));
        assert_eq!(language_from_locale("sr-Latn-RS").as_deref(), Some("sr"));
        assert_eq!(language_from_locale("haw").as_deref(), Some("haw"));
        assert!(language_from_locale("C").is_none());
        assert!(language_from_locale("POSIX").is_none());
        assert!(language_from_locale("").is_none());
        assert!(language_from_locale("12-34").is_none());
    }

    #[test]
    fn test_system_language_is_a_language_subtag() {
        let language = system_language();
        assert_eq!(language_from_locale(&language), Some(language.clone()));
        if let Some(expected) = sys_locale::get_locale().as_deref().and_then(language_from_locale) {
            assert_eq!(language, expected);
        } else {
            assert_eq!(language, DEFAULT_LANGUAGE);
        }
    }

    #[test]
    fn test_absolute_path_is_normalized() {
        let request = HttpRequest::builder()
            .base_url("https://ignored.example")
            .path("HTTPS://X.com")
            .build();
        assert_eq!(request.url().unwrap().as_str(), "https://x.com/");
    }

    #[test]
    fn test_builder_with_language() {
        let request = HttpRequest::builder_with_language("fr").build();
        assert_eq!(request.header("Accept-Language"), Some("fr"));
    }

    #[test]
    fn test_add_header_keeps_order_and_uniqueness() {
        let request = HttpRequest::builder()
            .add_header("Authorization", "Bearer a")
            .add_header("X-Trace", "1")
            .add_header("AUTHORIZATION", "Bearer b")
            .build();

        let names: Vec<_> = request.headers().map(|(k, _)| k).collect();
        assert_eq!(
            names,
            vec!["accept-encoding", "accept-language", "authorization", "x-trace"]
        );
        assert_eq!(request.header("authorization"), Some("Bearer b"));
    }

    #[test]
    fn test_url_join_with_query_and_fragment() {
        assert_eq!(
            joined("https://x.com/api/", "/v1/y?z=1#f"),
            "https://x.com/api/v1/y?z=1#f"
        );
    }

    #[test]
    fn test_url_join_slash_variants() {
        let expected = "https://api.example.com/v1/things";
        assert_eq!(joined("https://api.example.com", "v1/things"), expected);
        assert_eq!(joined("https://api.example.com/", "v1/things"), expected);
        assert_eq!(joined("https://api.example.com", "/v1/things"), expected);
        assert_eq!(joined("https://api.example.com/", "/v1/things"), expected);
    }

    #[test]
    fn test_absolute_path_ignores_base_url() {
        assert_eq!(
            joined("https://ignored.example.com/api", "https://other.example.com/v1/x"),
            "https://other.example.com/v1/x"
        );

        let request = HttpRequest::builder()
            .path("http://localhost:8080/config?v=3")
            .build();
        assert_eq!(
            request.url().unwrap().as_str(),
            "http://localhost:8080/config?v=3"
        );
    }

    #[test]
    fn test_missing_base_url_is_malformed() {
        let request = HttpRequest::builder().path("v1/things").build();
        assert!(matches!(request.url(), Err(Error::MalformedRequest(_))));

        let request = HttpRequest::builder().base_url("  ").path("v1/things").build();
        assert!(matches!(request.url(), Err(Error::MalformedRequest(_))));
    }

    #[test]
    fn test_validate_requires_path() {
        let request = HttpRequest::builder()
            .base_url("https://api.example.com")
            .build();
        assert!(matches!(request.validate(), Err(Error::InvalidArgument(_))));
        assert!(request.url().is_ok());
    }

    #[test]
    fn test_host_port_path_is_not_absolute() {
        let request = HttpRequest::builder()
            .base_url("https://api.example.com")
            .path("localhost:8080/x")
            .build();
        assert_eq!(
            request.url().unwrap().as_str(),
            "https://api.example.com/localhost:8080/x"
        );
    }

    #[test]
    fn test_unparsable_join_is_malformed() {
        let request = HttpRequest::builder()
            .base_url("not a url")
            .path("v1")
            .build();
        assert!(matches!(request.url(), Err(Error::MalformedRequest(_))));
    }

    #[test]
    fn test_dispose_zeroes_body() {
        let mut request = HttpRequest::builder()
            .method(HttpMethod::Post)
            .data("{\"a\":1}")
            .build();

        request.dispose();
        assert_eq!(request.body().unwrap().expose_secret(), &[0u8; 7]);

        request.dispose();
        assert_eq!(request.body().unwrap().len(), 7);
        assert!(request.body().unwrap().is_disposed());
    }

    #[test]
    fn test_dispose_without_body_is_noop() {
        let mut request = HttpRequest::builder().build();
        request.dispose();
        assert!(request.body().is_none());
    }

    #[test]
    fn test_method_properties() {
        assert!(HttpMethod::Post.writes_body());
        assert!(HttpMethod::Put.writes_body());
        assert!(!HttpMethod::Get.writes_body());
        assert!(!HttpMethod::Delete.writes_body());
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }
}
