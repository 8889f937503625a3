use crate::error::{Error, NetworkError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use reqwest::Response;
use reqwest::header::CONTENT_ENCODING;
use std::fmt;
use std::io::Read;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

const BODY_PREVIEW_SIZE: usize = 200;

/// Successful outcome of one round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    body: String,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl HttpResponse {
    /// Creates a response from a decoded body and its timing.
    pub fn new(body: impl Into<String>, started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> Self {
        Self {
            body: body.into(),
            started_at,
            finished_at,
        }
    }

    /// The decoded response body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Consumes the response, returning the body.
    pub fn into_body(self) -> String {
        self.body
    }

    /// When the connection was opened.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the body had been fully read.
    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// Elapsed wall time between [`started_at`](Self::started_at) and
    /// [`finished_at`](Self::finished_at).
    pub fn duration(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }
}

/// Turns a completed HTTP exchange into a body string or a typed error.
///
/// Implementations may read the body at most once.
#[async_trait]
pub trait ResponseParser: Send + Sync + fmt::Debug {
    /// Interprets the status line and body of `response`.
    async fn parse(&self, response: Response) -> Result<String>;
}

/// How a status code is interpreted.
///
/// Every `u16` maps to exactly one class; unlisted codes, 204 included,
/// are [`StatusClass::Unexpected`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 200, 201, 202
    Success,
    /// 400, 422
    UnprocessableEntity,
    /// 401
    Authentication,
    /// 403
    Authorization,
    /// 426
    UpgradeRequired,
    /// 429, body is not read
    RateLimited,
    /// 500
    ServerError,
    /// 503
    ServiceUnavailable,
    /// Everything else
    Unexpected,
}

impl StatusClass {
    /// Classifies a status code.
    pub const fn from_status(status: u16) -> Self {
        match status {
            200..=202 => StatusClass::Success,
            400 | 422 => StatusClass::UnprocessableEntity,
            401 => StatusClass::Authentication,
            403 => StatusClass::Authorization,
            426 => StatusClass::UpgradeRequired,
            429 => StatusClass::RateLimited,
            500 => StatusClass::ServerError,
            503 => StatusClass::ServiceUnavailable,
            _ => StatusClass::Unexpected,
        }
    }

    /// Whether the body has to be read to build the outcome.
    pub const fn reads_body(self) -> bool {
        !matches!(self, StatusClass::RateLimited)
    }

    /// Builds the outcome for `status` from its decoded body.
    ///
    /// Error messages carry the body verbatim.
    pub fn into_result(self, status: u16, body: String) -> Result<String> {
        match self {
            StatusClass::Success => Ok(body),
            StatusClass::UnprocessableEntity => Err(Error::unprocessable_entity(body)),
            StatusClass::Authentication => Err(Error::authentication(body)),
            StatusClass::Authorization => Err(Error::authorization(body)),
            StatusClass::UpgradeRequired => Err(Error::upgrade_required(body)),
            StatusClass::RateLimited => Err(Error::rate_limit()),
            StatusClass::ServerError => Err(Error::server_error(body)),
            StatusClass::ServiceUnavailable => Err(Error::service_unavailable(body)),
            StatusClass::Unexpected => Err(Error::unexpected_status(status, body)),
        }
    }
}

/// Decodes a raw body according to its `Content-Encoding`.
///
/// `gzip` (any case) is inflated; anything else is read as UTF-8 with
/// invalid sequences replaced.
///
/// # Errors
///
/// [`NetworkError::Decode`] when a gzip body is not a valid gzip stream.
///
/// ```rust
/// use paygate_core::http_client::decode_body;
///
/// assert_eq!(decode_body(None, b"plain").unwrap(), "plain");
/// assert_eq!(decode_body(Some("identity"), b"plain").unwrap(), "plain");
/// assert!(decode_body(Some("GZIP"), b"not gzip").is_err());
/// ```
pub fn decode_body(encoding: Option<&str>, bytes: &[u8]) -> Result<String> {
    let is_gzip = encoding.is_some_and(|e| e.trim().eq_ignore_ascii_case("gzip"));
    if !is_gzip {
        return Ok(String::from_utf8_lossy(bytes).into_owned());
    }

    let mut decoded = Vec::with_capacity(bytes.len().saturating_mul(4));
    GzDecoder::new(bytes)
        .read_to_end(&mut decoded)
        .map_err(|e| NetworkError::Decode(format!("invalid gzip stream: {e}")))?;
    Ok(String::from_utf8_lossy(&decoded).into_owned())
}

/// Status-driven parser used by default.
#[derive(Debug, Clone)]
pub struct BaseResponseParser {
    max_response_size: usize,
    verbose: bool,
}

impl Default for BaseResponseParser {
    fn default() -> Self {
        Self::new(10 * 1024 * 1024)
    }
}

impl BaseResponseParser {
    /// Creates a parser that refuses bodies over `max_response_size` bytes.
    pub fn new(max_response_size: usize) -> Self {
        Self {
            max_response_size,
            verbose: false,
        }
    }

    /// Logs a preview of every body at debug level when enabled.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Body size limit in bytes.
    pub fn max_response_size(&self) -> usize {
        self.max_response_size
    }

    /// Reads the whole body under the size limit and decodes it.
    ///
    /// # Errors
    ///
    /// [`NetworkError::ResponseTooLarge`] past the limit, a network error if
    /// the connection fails mid-body, [`NetworkError::Decode`] for bad gzip.
    #[instrument(name = "http_read_body", skip(self, response), fields(status = response.status().as_u16()))]
    pub async fn read_body(&self, response: Response) -> Result<String> {
        let encoding = response
            .headers()
            .get(CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let bytes = self.read_with_limit(response).await?;
        let body = decode_body(encoding.as_deref(), &bytes)?;

        if self.verbose {
            let preview: String = body.chars().take(BODY_PREVIEW_SIZE).collect();
            debug!(
                body_length = body.len(),
                encoding = ?encoding,
                body_preview = %preview,
                "HTTP response body read"
            );
        } else {
            debug!(body_length = body.len(), encoding = ?encoding, "HTTP response body read");
        }
        Ok(body)
    }

    async fn read_with_limit(&self, mut response: Response) -> Result<Vec<u8>> {
        let max_size = self.max_response_size;

        if let Some(content_length) = response.content_length()
            && content_length > max_size as u64
        {
            warn!(
                content_length = content_length,
                max_size = max_size,
                "Response exceeds size limit (Content-Length check)"
            );
            return Err(NetworkError::ResponseTooLarge {
                size: usize::try_from(content_length).unwrap_or(usize::MAX),
                limit: max_size,
            }
            .into());
        }

        #[allow(clippy::cast_possible_truncation)]
        let initial_capacity = response
            .content_length()
            .map_or(16 * 1024, |len| std::cmp::min(len as usize, max_size));
        let mut body = Vec::with_capacity(initial_capacity);

        while let Some(chunk) = response.chunk().await.map_err(|e| {
            error!(error = %e, "Failed to read response chunk");
            Error::from(e)
        })? {
            let accumulated = body.len().saturating_add(chunk.len());
            if accumulated > max_size {
                warn!(
                    accumulated_size = accumulated,
                    max_size = max_size,
                    "Response exceeds size limit during streaming"
                );
                return Err(NetworkError::ResponseTooLarge {
                    size: accumulated,
                    limit: max_size,
                }
                .into());
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}

#[async_trait]
impl ResponseParser for BaseResponseParser {
    #[instrument(name = "http_parse_response", skip(self, response), fields(status = response.status().as_u16()))]
    async fn parse(&self, response: Response) -> Result<String> {
        let status = response.status().as_u16();
        let class = StatusClass::from_status(status);

        if !class.reads_body() {
            warn!(status, "Rate limited by gateway");
            return Err(Error::rate_limit());
        }

        let body = self.read_body(response).await?;
        let result = class.into_result(status, body);
        match &result {
            Ok(_) => debug!(status, "HTTP request succeeded"),
            Err(e) if status >= 500 => error!(status, error = %e, "Gateway server error"),
            Err(e) => info!(status, error = %e, "Gateway rejected request"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RATE_LIMIT_MESSAGE;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn gzip(text: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_status_classification() {
        let cases = [
            (200, StatusClass::Success),
            (201, StatusClass::Success),
            (202, StatusClass::Success),
            (204, StatusClass::Unexpected),
            (400, StatusClass::UnprocessableEntity),
            (422, StatusClass::UnprocessableEntity),
            (401, StatusClass::Authentication),
            (403, StatusClass::Authorization),
            (404, StatusClass::Unexpected),
            (426, StatusClass::UpgradeRequired),
            (429, StatusClass::RateLimited),
            (500, StatusClass::ServerError),
            (502, StatusClass::Unexpected),
            (503, StatusClass::ServiceUnavailable),
        ];
        for (status, class) in cases {
            assert_eq!(StatusClass::from_status(status), class, "status {status}");
        }
    }

    #[test]
    fn test_into_result_keeps_body_verbatim() {
        let err = StatusClass::UnprocessableEntity
            .into_result(422, "{\"error\":\"bad\"}".to_string())
            .unwrap_err();
        assert!(matches!(err, Error::UnprocessableEntity(_)));
        assert_eq!(err.message(), Some("{\"error\":\"bad\"}"));

        let err = StatusClass::Unexpected
            .into_result(418, "teapot".to_string())
            .unwrap_err();
        assert_eq!(err.status_code(), Some(418));
        assert_eq!(err.message(), Some("teapot"));
    }

    #[test]
    fn test_rate_limited_ignores_body() {
        let err = StatusClass::RateLimited
            .into_result(429, "ignored".to_string())
            .unwrap_err();
        assert_eq!(err.to_string(), RATE_LIMIT_MESSAGE);
        assert!(!StatusClass::RateLimited.reads_body());
    }

    #[test]
    fn test_decode_gzip_any_case() {
        let compressed = gzip("{\"ok\":true}");
        assert_eq!(decode_body(Some("gzip"), &compressed).unwrap(), "{\"ok\":true}");
        assert_eq!(decode_body(Some("GZip"), &compressed).unwrap(), "{\"ok\":true}");
    }

    #[test]
    fn test_decode_plain_is_lossy_utf8() {
        assert_eq!(decode_body(None, &[0x68, 0x69, 0xff]).unwrap(), "hi\u{fffd}");
    }

    #[test]
    fn test_decode_bad_gzip_is_decode_error() {
        let err = decode_body(Some("gzip"), b"definitely not gzip").unwrap_err();
        assert!(matches!(err.as_network(), Some(NetworkError::Decode(_))));
    }

    #[test]
    fn test_response_duration() {
        let started = Utc::now();
        let finished = started + chrono::Duration::milliseconds(250);
        let response = HttpResponse::new("ok", started, finished);
        assert_eq!(response.duration(), Duration::from_millis(250));
        assert_eq!(response.body(), "ok");

        let backwards = HttpResponse::new("ok", finished, started);
        assert_eq!(backwards.duration(), Duration::ZERO);
    }
}
