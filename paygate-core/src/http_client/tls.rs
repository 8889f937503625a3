//! TLS configuration sources for HTTPS connections.

use crate::error::{Error, Result};
use rustls::pki_types::CertificateDer;
use rustls::{ClientConfig, RootCertStore};
use std::fmt;
use std::sync::Arc;

/// Supplies the rustls configuration used for HTTPS requests.
///
/// Called lazily, at most once per executor, when the first HTTPS request
/// is dispatched.
pub trait TlsProvider: Send + Sync + fmt::Debug {
    /// Builds the client configuration.
    fn client_config(&self) -> Result<ClientConfig>;
}

fn config_with_roots(roots: RootCertStore) -> Result<ClientConfig> {
    let config =
        ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()
            .map_err(|e| Error::ssl(format!("Unsupported TLS protocol versions: {e}")))?
            .with_root_certificates(roots)
            .with_no_client_auth();
    Ok(config)
}

/// Trusts the Mozilla root program bundled by `webpki-roots`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebPkiTlsProvider;

impl TlsProvider for WebPkiTlsProvider {
    fn client_config(&self) -> Result<ClientConfig> {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        config_with_roots(roots)
    }
}

/// Trusts only the given DER-encoded certificates.
///
/// Used to pin gateway endpoints to a known set of roots.
#[derive(Clone)]
pub struct PinnedRootsTlsProvider {
    certificates: Vec<Vec<u8>>,
}

impl PinnedRootsTlsProvider {
    /// Creates a provider from DER certificates.
    pub fn new(certificates: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self {
            certificates: certificates.into_iter().collect(),
        }
    }
}

impl fmt::Debug for PinnedRootsTlsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinnedRootsTlsProvider")
            .field("certificates", &self.certificates.len())
            .finish()
    }
}

impl TlsProvider for PinnedRootsTlsProvider {
    fn client_config(&self) -> Result<ClientConfig> {
        if self.certificates.is_empty() {
            return Err(Error::ssl("No pinned certificates configured"));
        }

        let mut roots = RootCertStore::empty();
        for (index, der) in self.certificates.iter().enumerate() {
            roots
                .add(CertificateDer::from(der.clone()))
                .map_err(|e| Error::ssl(format!("Pinned certificate {index} rejected: {e}")))?;
        }
        config_with_roots(roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;

    #[test]
    fn test_webpki_provider_builds() {
        let config = WebPkiTlsProvider.client_config().unwrap();
        assert!(config.alpn_protocols.is_empty());
    }

    #[test]
    fn test_pinned_provider_rejects_garbage() {
        let provider = PinnedRootsTlsProvider::new([b"not a certificate".to_vec()]);
        let err = provider.client_config().unwrap_err();
        assert!(matches!(err.as_network(), Some(NetworkError::Ssl(_))));
    }

    #[test]
    fn test_pinned_provider_requires_certificates() {
        let provider = PinnedRootsTlsProvider::new(Vec::<Vec<u8>>::new());
        assert!(provider.client_config().is_err());
        assert_eq!(format!("{provider:?}"), "PinnedRootsTlsProvider { certificates: 0 }");
    }
}
