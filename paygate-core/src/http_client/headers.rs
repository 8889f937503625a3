use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::request::HttpRequest;

/// Copies the request's headers into a `HeaderMap`, preserving order.
pub(crate) fn to_header_map(request: &HttpRequest) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in request.headers() {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::malformed_request(format!("Invalid header name '{name}': {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| Error::malformed_request(format!("Invalid value for header '{name}': {e}")))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
