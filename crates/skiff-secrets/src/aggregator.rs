//! Prefix-filtered, paginated secret aggregation.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::AggregatorConfig;
use crate::error::{SecretsError, SecretsResult};
use crate::traits::{SecretStore, StoreError};
use crate::types::{PageToken, SecretPage, SecretValue};

/// Default page size for batch retrieval.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Aggregates prefix-filtered secrets into a flat name → value mapping.
///
/// Constructed per retrieval run with a store handle and a name prefix. The
/// exposed keys are always the stored names with the prefix stripped from
/// the front; an empty prefix leaves names unchanged.
pub struct SecretAggregator {
    store: Arc<dyn SecretStore>,
    prefix: String,
    page_size: usize,
}

impl SecretAggregator {
    /// Create an aggregator with the default page size.
    #[must_use]
    pub fn new(store: Arc<dyn SecretStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the page size for batch retrieval. Clamped to at least one.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Create an aggregator from configuration.
    #[must_use]
    pub fn from_config(store: Arc<dyn SecretStore>, config: &AggregatorConfig) -> Self {
        Self::new(store, config.prefix.clone()).with_page_size(config.page_size)
    }

    /// The configured name prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Fetch every secret under the prefix, keyed by the name remainder.
    ///
    /// Pagination is exhausted before returning; no partial-page result is
    /// ever handed to the caller. A failure on any page aborts the whole
    /// run and discards everything accumulated so far.
    pub async fn fetch_all(&self) -> SecretsResult<BTreeMap<String, SecretValue>> {
        let mut result = BTreeMap::new();
        let mut cursor = PageCursor::start();

        while let Some(page) = cursor
            .next(self.store.as_ref(), &self.prefix, self.page_size)
            .await
            .map_err(|source| SecretsError::BulkFetch {
                prefix: self.prefix.clone(),
                source,
            })?
        {
            debug!(
                prefix = %self.prefix,
                entries = page.entries.len(),
                last = page.is_last(),
                "fetched secrets page"
            );

            for entry in page.entries {
                let Some(key) = entry.name.strip_prefix(&self.prefix) else {
                    return Err(SecretsError::UnexpectedName {
                        prefix: self.prefix.clone(),
                        name: entry.name,
                    });
                };

                if result.insert(key.to_owned(), entry.value).is_some() {
                    return Err(SecretsError::DuplicateKey {
                        prefix: self.prefix.clone(),
                        key: key.to_owned(),
                    });
                }
            }
        }

        info!(
            prefix = %self.prefix,
            count = result.len(),
            "secret aggregation complete"
        );

        Ok(result)
    }

    /// Fetch a single secret stored as `prefix + key`.
    pub async fn fetch_one(&self, key: &str) -> SecretsResult<SecretValue> {
        let name = format!("{}{}", self.prefix, key);

        self.store
            .get(&name)
            .await
            .map_err(|source| SecretsError::SingleFetch { name, source })
    }
}

impl std::fmt::Debug for SecretAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretAggregator")
            .field("prefix", &self.prefix)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

/// Cursor over the finite sequence of pages of one aggregation run.
///
/// Each `fetch_all` call drives a fresh cursor, so exhaustion is explicit:
/// `next` returns `None` exactly once, after the store stops handing out
/// continuation tokens.
#[derive(Debug, Default)]
struct PageCursor {
    token: Option<PageToken>,
    exhausted: bool,
}

impl PageCursor {
    fn start() -> Self {
        Self::default()
    }

    async fn next(
        &mut self,
        store: &dyn SecretStore,
        prefix: &str,
        page_size: usize,
    ) -> Result<Option<SecretPage>, StoreError> {
        if self.exhausted {
            return Ok(None);
        }

        let page = store.batch_get(prefix, page_size, self.token.as_ref()).await?;
        self.token = page.next.clone();
        self.exhausted = self.token.is_none();

        Ok(Some(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySecretStore;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    /// Delegates to an inner store while counting page requests, and can be
    /// scripted to fail a specific page.
    struct CountingStore {
        inner: MemorySecretStore,
        calls: AtomicUsize,
        fail_on_call: Option<usize>,
    }

    impl CountingStore {
        fn new(inner: MemorySecretStore) -> Self {
            Self {
                inner,
                calls: AtomicUsize::new(0),
                fail_on_call: None,
            }
        }

        fn failing_on(inner: MemorySecretStore, call: usize) -> Self {
            Self {
                inner,
                calls: AtomicUsize::new(0),
                fail_on_call: Some(call),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SecretStore for CountingStore {
        async fn batch_get(
            &self,
            prefix: &str,
            page_size: usize,
            cursor: Option<&PageToken>,
        ) -> Result<SecretPage, StoreError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on_call == Some(call) {
                return Err(StoreError::Transport("connection reset".to_owned()));
            }
            self.inner.batch_get(prefix, page_size, cursor).await
        }

        async fn get(&self, name: &str) -> Result<SecretValue, StoreError> {
            self.inner.get(name).await
        }
    }

    async fn seeded_store(names: &[&str]) -> MemorySecretStore {
        let store = MemorySecretStore::new();
        for name in names {
            store
                .insert(*name, SecretValue::new(format!("value-of-{name}")))
                .await;
        }
        store
    }

    #[tokio::test]
    async fn fetch_all_strips_prefix_and_ignores_other_names() {
        let store = seeded_store(&["test/a", "test/b", "other/c"]).await;
        let aggregator = SecretAggregator::new(Arc::new(store), "test/");

        let secrets = aggregator.fetch_all().await.unwrap();

        let keys: Vec<_> = secrets.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(secrets["a"].expose(), "value-of-test/a");
        assert_eq!(secrets["b"].expose(), "value-of-test/b");
    }

    #[tokio::test]
    async fn empty_prefix_keys_equal_stored_names() {
        let store = seeded_store(&["alpha", "beta"]).await;
        let aggregator = SecretAggregator::new(Arc::new(store), "");

        let secrets = aggregator.fetch_all().await.unwrap();

        let keys: Vec<_> = secrets.keys().map(String::as_str).collect();
        assert_eq!(keys, ["alpha", "beta"]);
    }

    #[tokio::test]
    async fn fetch_all_exhausts_pagination() {
        let store = MemorySecretStore::new();
        for i in 0..25 {
            store
                .insert(format!("app/key{i:02}"), SecretValue::new(format!("v{i}")))
                .await;
        }
        let counting = Arc::new(CountingStore::new(store));
        let aggregator =
            SecretAggregator::new(Arc::clone(&counting) as Arc<dyn SecretStore>, "app/")
                .with_page_size(5);

        let secrets = aggregator.fetch_all().await.unwrap();

        assert_eq!(secrets.len(), 25);
        assert_eq!(secrets["key00"].expose(), "v0");
        assert_eq!(secrets["key24"].expose(), "v24");
        // 25 entries at page size 5 is exactly five continuation requests.
        assert_eq!(counting.calls(), 5);
    }

    #[tokio::test]
    async fn page_failure_discards_partial_results() {
        let store = seeded_store(&["app/a", "app/b", "app/c", "app/d"]).await;
        let counting = Arc::new(CountingStore::failing_on(store, 2));
        let aggregator =
            SecretAggregator::new(Arc::clone(&counting) as Arc<dyn SecretStore>, "app/")
                .with_page_size(2);

        let err = aggregator.fetch_all().await.unwrap_err();

        assert!(matches!(
            err,
            SecretsError::BulkFetch { ref prefix, .. } if prefix == "app/"
        ));
        assert_eq!(counting.calls(), 2);
    }

    #[tokio::test]
    async fn duplicate_key_after_stripping_is_an_error() {
        /// A store that hands the same name out on two pages.
        struct DuplicatingStore;

        #[async_trait]
        impl SecretStore for DuplicatingStore {
            async fn batch_get(
                &self,
                _prefix: &str,
                _page_size: usize,
                cursor: Option<&PageToken>,
            ) -> Result<SecretPage, StoreError> {
                let entry = crate::types::SecretEntry::new("app/dup", SecretValue::new("v"));
                Ok(SecretPage {
                    entries: vec![entry],
                    next: cursor
                        .is_none()
                        .then(|| PageToken::new("again")),
                })
            }

            async fn get(&self, name: &str) -> Result<SecretValue, StoreError> {
                Err(StoreError::NotFound(name.to_owned()))
            }
        }

        let aggregator = SecretAggregator::new(Arc::new(DuplicatingStore), "app/");

        let err = aggregator.fetch_all().await.unwrap_err();
        assert!(matches!(
            err,
            SecretsError::DuplicateKey { ref key, .. } if key == "dup"
        ));
    }

    #[tokio::test]
    async fn name_outside_prefix_is_an_error() {
        /// A store that ignores the filter it was given.
        struct LeakyStore;

        #[async_trait]
        impl SecretStore for LeakyStore {
            async fn batch_get(
                &self,
                _prefix: &str,
                _page_size: usize,
                _cursor: Option<&PageToken>,
            ) -> Result<SecretPage, StoreError> {
                let entry =
                    crate::types::SecretEntry::new("elsewhere/x", SecretValue::new("v"));
                Ok(SecretPage {
                    entries: vec![entry],
                    next: None,
                })
            }

            async fn get(&self, name: &str) -> Result<SecretValue, StoreError> {
                Err(StoreError::NotFound(name.to_owned()))
            }
        }

        let aggregator = SecretAggregator::new(Arc::new(LeakyStore), "app/");

        let err = aggregator.fetch_all().await.unwrap_err();
        assert!(matches!(
            err,
            SecretsError::UnexpectedName { ref name, .. } if name == "elsewhere/x"
        ));
    }

    #[tokio::test]
    async fn fetch_one_prepends_prefix() {
        let store = seeded_store(&["test/a"]).await;
        let aggregator = SecretAggregator::new(Arc::new(store), "test/");

        let value = aggregator.fetch_one("a").await.unwrap();
        assert_eq!(value.expose(), "value-of-test/a");
    }

    #[tokio::test]
    async fn fetch_one_missing_names_fully_qualified_key() {
        let store = seeded_store(&["test/a"]).await;
        let aggregator = SecretAggregator::new(Arc::new(store), "test/");

        let err = aggregator.fetch_one("missing").await.unwrap_err();

        assert!(matches!(
            err,
            SecretsError::SingleFetch { ref name, .. } if name == "test/missing"
        ));
        assert!(err.to_string().contains("test/missing"));
    }
}
