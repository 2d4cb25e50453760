//! Trait for secret store implementations.

use async_trait::async_trait;

use crate::types::{PageToken, SecretPage, SecretValue};

/// Error reported by a secret store client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// No secret exists under the given name.
    #[error("secret not found: {0}")]
    NotFound(String),

    /// The request never produced a usable response.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Trait for secret store implementations.
///
/// The aggregator drives retrieval through this trait; transport, auth, and
/// retries belong to implementations. Pagination is cursor-based: each page
/// carries a continuation token until the listing is exhausted.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch one page of secrets whose stored names start with `prefix`.
    ///
    /// `cursor` is the continuation token from the previous page, or `None`
    /// for the first page. The returned page's `next` is `None` once the
    /// listing is exhausted.
    async fn batch_get(
        &self,
        prefix: &str,
        page_size: usize,
        cursor: Option<&PageToken>,
    ) -> Result<SecretPage, StoreError>;

    /// Fetch a single secret by its full stored name.
    async fn get(&self, name: &str) -> Result<SecretValue, StoreError>;
}
