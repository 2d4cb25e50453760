//! Error types for secret retrieval.

use crate::traits::StoreError;

/// Result type alias using [`SecretsError`].
pub type SecretsResult<T> = Result<T, SecretsError>;

/// Errors that can occur during secret retrieval.
///
/// Bulk and single retrieval fail with distinct kinds so callers can tell a
/// broken aggregation run apart from one missing secret.
#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    /// A page retrieval failed during bulk aggregation.
    ///
    /// Results accumulated from earlier pages are discarded; no partial
    /// mapping is ever returned.
    #[error("failed to fetch secrets with prefix {prefix:?}")]
    BulkFetch {
        /// The configured name prefix.
        prefix: String,
        /// Underlying store error.
        #[source]
        source: StoreError,
    },

    /// A single named secret could not be retrieved.
    #[error("failed to fetch secret {name}")]
    SingleFetch {
        /// The fully-qualified (prefixed) secret name.
        name: String,
        /// Underlying store error.
        #[source]
        source: StoreError,
    },

    /// Two stored names collapsed to the same key after prefix stripping.
    ///
    /// Store names are unique, so this indicates a misbehaving store; it is
    /// reported rather than silently overwriting an entry.
    #[error("duplicate secret key {key:?} under prefix {prefix:?}")]
    DuplicateKey {
        /// The configured name prefix.
        prefix: String,
        /// The colliding key after prefix stripping.
        key: String,
    },

    /// The store returned a name outside the requested prefix.
    #[error("secret name {name:?} does not start with prefix {prefix:?}")]
    UnexpectedName {
        /// The configured name prefix.
        prefix: String,
        /// The offending stored name.
        name: String,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl SecretsError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
