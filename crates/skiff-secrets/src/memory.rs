//! In-memory secret store for testing and local development.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::traits::{SecretStore, StoreError};
use crate::types::{PageToken, SecretEntry, SecretPage, SecretValue};

/// In-memory secret store.
///
/// Names are kept sorted, so pagination is deterministic: the continuation
/// token is the last name of the previous page and each page resumes
/// strictly after it. Secrets are not persisted across restarts.
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    data: Arc<RwLock<BTreeMap<String, SecretValue>>>,
}

impl MemorySecretStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a secret under its full name.
    pub async fn insert(&self, name: impl Into<String>, value: SecretValue) {
        let name = name.into();
        let mut data = self.data.write().await;
        data.insert(name.clone(), value);

        tracing::debug!(secret.name = %name, "secret stored");
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn batch_get(
        &self,
        prefix: &str,
        page_size: usize,
        cursor: Option<&PageToken>,
    ) -> Result<SecretPage, StoreError> {
        let data = self.data.read().await;

        // Take one extra entry to learn whether another page follows.
        let mut entries: Vec<SecretEntry> = data
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .filter(|(name, _)| cursor.map_or(true, |c| name.as_str() > c.as_str()))
            .take(page_size + 1)
            .map(|(name, value)| SecretEntry::new(name.clone(), value.clone()))
            .collect();

        let next = if entries.len() > page_size {
            entries.pop();
            entries.last().map(|e| PageToken::new(e.name.clone()))
        } else {
            None
        };

        Ok(SecretPage { entries, next })
    }

    async fn get(&self, name: &str) -> Result<SecretValue, StoreError> {
        let data = self.data.read().await;
        data.get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with(names: &[&str]) -> MemorySecretStore {
        let store = MemorySecretStore::new();
        for name in names {
            store.insert(*name, SecretValue::new("value")).await;
        }
        store
    }

    #[tokio::test]
    async fn get_returns_stored_value() {
        let store = MemorySecretStore::new();
        store.insert("app/token", SecretValue::new("abc123")).await;

        let value = store.get("app/token").await.unwrap();
        assert_eq!(value.expose(), "abc123");
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = MemorySecretStore::new();

        let err = store.get("app/missing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(name) if name == "app/missing"));
    }

    #[tokio::test]
    async fn batch_get_filters_by_prefix() {
        let store = store_with(&["app/a", "app/b", "other/c"]).await;

        let page = store.batch_get("app/", 10, None).await.unwrap();
        let names: Vec<_> = page.entries.iter().map(|e| e.name.as_str()).collect();

        assert_eq!(names, ["app/a", "app/b"]);
        assert!(page.is_last());
    }

    #[tokio::test]
    async fn batch_get_paginates_in_sorted_order() {
        let store = store_with(&["app/c", "app/a", "app/d", "app/b", "app/e"]).await;

        let first = store.batch_get("app/", 2, None).await.unwrap();
        let names: Vec<_> = first.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["app/a", "app/b"]);
        let token = first.next.expect("more pages expected");

        let second = store.batch_get("app/", 2, Some(&token)).await.unwrap();
        let names: Vec<_> = second.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["app/c", "app/d"]);
        let token = second.next.expect("more pages expected");

        let third = store.batch_get("app/", 2, Some(&token)).await.unwrap();
        let names: Vec<_> = third.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["app/e"]);
        assert!(third.is_last());
    }

    #[tokio::test]
    async fn exact_page_boundary_has_no_extra_page() {
        let store = store_with(&["app/a", "app/b"]).await;

        let page = store.batch_get("app/", 2, None).await.unwrap();
        assert_eq!(page.entries.len(), 2);
        assert!(page.is_last());
    }
}
