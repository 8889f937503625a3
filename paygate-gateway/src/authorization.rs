//! Merchant credentials accepted by the gateway.
//!
//! Two forms exist:
//! - a tokenization key, `<environment>_<8+ char id>_<merchant id>`, sent as
//!   the `Client-Key` header
//! - a client token, base64-encoded JSON carrying an authorization
//!   fingerprint and the configuration URL

use base64::{Engine as _, engine::general_purpose};
use paygate_core::credentials::SecretString;
use paygate_core::error::{Error, Result};
use reqwest::Url;
use serde::Deserialize;
use std::hash::{DefaultHasher, Hash, Hasher};

/// Header carrying a tokenization key.
pub const CLIENT_KEY_HEADER: &str = "Client-Key";
/// Body field and query parameter carrying a client-token fingerprint.
pub const FINGERPRINT_FIELD: &str = "authorizationFingerprint";

/// Gateway environment a tokenization key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Local gateway
    Development,
    /// Test gateway
    Sandbox,
    /// Live gateway
    Production,
}

impl Environment {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "development" => Some(Environment::Development),
            "sandbox" => Some(Environment::Sandbox),
            "production" => Some(Environment::Production),
            _ => None,
        }
    }

    /// Gateway origin for this environment.
    pub const fn base_url(self) -> &'static str {
        match self {
            Environment::Development => "http://localhost:3000",
            Environment::Sandbox => "https://api.sandbox.paygate.io",
            Environment::Production => "https://api.paygate.io",
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientTokenPayload {
    authorization_fingerprint: String,
    config_url: String,
}

/// A parsed merchant credential.
#[derive(Debug, Clone)]
pub enum Authorization {
    /// Long-lived publishable key.
    TokenizationKey {
        /// The full key
        key: SecretString,
        /// Environment prefix of the key
        environment: Environment,
        /// Merchant id suffix of the key
        merchant_id: String,
    },
    /// Short-lived token minted by the merchant's server.
    ClientToken {
        /// Fingerprint sent with every request
        authorization_fingerprint: SecretString,
        /// Where the remote configuration lives
        config_url: String,
    },
}

impl Authorization {
    /// Parses a tokenization key or a base64 client token.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] when `value` is neither.
    ///
    /// ```rust
    /// use paygate_gateway::Authorization;
    ///
    /// let auth = Authorization::from_string("sandbox_tmxhyf7d_dcpspy2brwdjr3qn").unwrap();
    /// assert!(auth.is_tokenization_key());
    /// assert!(Authorization::from_string("").is_err());
    /// ```
    pub fn from_string(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::invalid_argument("Authorization cannot be empty"));
        }
        if let Some(key) = parse_tokenization_key(value) {
            return Ok(key);
        }
        parse_client_token(value)
    }

    /// True for tokenization keys.
    pub fn is_tokenization_key(&self) -> bool {
        matches!(self, Authorization::TokenizationKey { .. })
    }

    /// The value sent as `Authorization: Bearer <value>`.
    pub fn bearer(&self) -> &str {
        match self {
            Authorization::TokenizationKey { key, .. } => key.expose_secret(),
            Authorization::ClientToken {
                authorization_fingerprint,
                ..
            } => authorization_fingerprint.expose_secret(),
        }
    }

    /// Client API root this credential talks to.
    ///
    /// Client tokens carry no environment, so their root is the
    /// configuration URL without its `/v1/configuration` suffix.
    pub fn client_api_url(&self) -> Result<String> {
        match self {
            Authorization::TokenizationKey {
                environment,
                merchant_id,
                ..
            } => Ok(format!(
                "{}/merchants/{merchant_id}/client_api",
                environment.base_url()
            )),
            Authorization::ClientToken { config_url, .. } => {
                let mut url = Url::parse(config_url).map_err(|e| {
                    Error::invalid_argument(format!("Invalid configuration URL: {e}"))
                })?;
                url.set_query(None);
                url.set_fragment(None);
                let path = url.path().trim_end_matches('/');
                let root = path.strip_suffix("/v1/configuration").unwrap_or(path).to_string();
                url.set_path(&root);
                Ok(url.as_str().trim_end_matches('/').to_string())
            }
        }
    }

    /// Remote configuration URL.
    pub fn config_url(&self) -> Result<String> {
        match self {
            Authorization::TokenizationKey { .. } => {
                Ok(format!("{}/v1/configuration", self.client_api_url()?))
            }
            Authorization::ClientToken { config_url, .. } => Ok(config_url.clone()),
        }
    }

    /// Hash of the credential, for cache keys that must not hold the secret.
    pub(crate) fn fingerprint_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.bearer().hash(&mut hasher);
        hasher.finish()
    }
}

fn parse_tokenization_key(value: &str) -> Option<Authorization> {
    let mut parts = value.splitn(3, '_');
    let environment = Environment::parse(parts.next()?)?;
    let id = parts.next()?;
    let merchant_id = parts.next()?;

    let is_word = |s: &str| s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if id.len() < 8 || !is_word(id) || merchant_id.is_empty() || !is_word(merchant_id) {
        return None;
    }

    Some(Authorization::TokenizationKey {
        key: SecretString::new(value),
        environment,
        merchant_id: merchant_id.to_string(),
    })
}

fn parse_client_token(value: &str) -> Result<Authorization> {
    let decoded = general_purpose::STANDARD
        .decode(value)
        .map_err(|_| Error::invalid_argument("Authorization is not a tokenization key or client token"))?;
    let payload: ClientTokenPayload = serde_json::from_slice(&decoded)
        .map_err(|e| Error::invalid_argument(format!("Client token is malformed: {e}")))?;

    if payload.authorization_fingerprint.is_empty() {
        return Err(Error::invalid_argument(
            "Client token has no authorization fingerprint",
        ));
    }

    Ok(Authorization::ClientToken {
        authorization_fingerprint: SecretString::new(payload.authorization_fingerprint),
        config_url: payload.config_url,
    })
}
