//! Secret-bearing buffers with automatic memory zeroization.
//!
//! Authorization values and request payloads (card numbers, CVVs, client
//! tokens) are held in these types so they are overwritten with zeros as
//! soon as they are no longer needed.
//!
//! # Example
//!
//! ```rust
//! use paygate_core::credentials::RequestBody;
//!
//! let mut body = RequestBody::from("{\"number\":\"4111111111111111\"}");
//! assert_eq!(format!("{body:?}"), "[REDACTED 29 bytes]");
//!
//! body.dispose();
//! assert!(body.expose_secret().iter().all(|b| *b == 0));
//! assert_eq!(body.len(), 29);
//! ```

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string that is zeroed when dropped and redacted when printed.
///
/// Used for tokenization keys, client-token fingerprints and bearer values.
#[derive(Clone, Zeroize, ZeroizeOnDrop, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    /// Creates a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret value.
    ///
    /// Use the reference immediately; do not copy it into long-lived state.
    #[inline]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Returns the length of the secret string.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the secret string is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Request payload bytes.
///
/// [`RequestBody::dispose`] overwrites the buffer in place, keeping its
/// length, so a disposed body of N bytes reads back as N zero bytes. The
/// buffer is also zeroed on drop, including every clone.
#[derive(Clone, Zeroize, ZeroizeOnDrop, PartialEq, Eq)]
pub struct RequestBody(Vec<u8>);

impl RequestBody {
    /// Creates a body from raw bytes.
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self(value.into())
    }

    /// Returns the body bytes.
    #[inline]
    pub fn expose_secret(&self) -> &[u8] {
        &self.0
    }

    /// Overwrites every byte with zero. Idempotent.
    pub fn dispose(&mut self) {
        self.0.as_mut_slice().zeroize();
    }

    /// True once every byte is zero (an empty body counts as disposed).
    pub fn is_disposed(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Returns the length of the body in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the body is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED {} bytes]", self.0.len())
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(v: Vec<u8>) -> Self {
        Self::new(v)
    }
}

impl From<&str> for RequestBody {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl From<String> for RequestBody {
    fn from(s: String) -> Self {
        Self::new(s.into_bytes())
    }
}
