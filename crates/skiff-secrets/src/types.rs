//! Core types for secret retrieval.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A secret value protected in memory.
///
/// Backed by a `SecretString`, so the value is zeroed on drop and `Debug`
/// output never contains it. Equality is constant-time.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretValue {
    #[zeroize(skip)]
    inner: SecretString,
}

impl SecretValue {
    /// Wrap a string value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: SecretString::from(value.into()),
        }
    }

    /// Expose the secret for use.
    ///
    /// The returned reference must not be logged or stored.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.inner.expose_secret()
    }

    /// Whether the value is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.expose_secret().is_empty()
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl PartialEq for SecretValue {
    fn eq(&self, other: &Self) -> bool {
        let a = self.inner.expose_secret().as_bytes();
        let b = other.inner.expose_secret().as_bytes();

        if a.len() != b.len() {
            return false;
        }

        a.ct_eq(b).into()
    }
}

impl Eq for SecretValue {}

/// A stored secret as returned by the store: full name (prefix included)
/// and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretEntry {
    /// The name as stored.
    pub name: String,
    /// The secret value.
    pub value: SecretValue,
}

impl SecretEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(name: impl Into<String>, value: SecretValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Opaque continuation token handed out by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageToken(String);

impl PageToken {
    /// Wrap a token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One page of a filtered listing.
#[derive(Debug, Clone)]
pub struct SecretPage {
    /// Entries on this page.
    pub entries: Vec<SecretEntry>,
    /// Continuation token; `None` on the final page.
    pub next: Option<PageToken>,
}

impl SecretPage {
    /// Whether this is the final page.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}
