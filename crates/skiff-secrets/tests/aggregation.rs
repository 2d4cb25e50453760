//! Aggregation against the in-memory store across many pages.

use std::sync::Arc;

use skiff_secrets::{MemorySecretStore, SecretAggregator, SecretValue, SecretsError};

#[tokio::test]
async fn large_prefix_scan_returns_the_full_union() {
    let store = MemorySecretStore::new();
    for i in 0..42 {
        store
            .insert(
                format!("prod/shop/secret-{i:02}"),
                SecretValue::new(format!("value-{i}")),
            )
            .await;
    }
    // Neighbouring prefixes must not leak into the result.
    store
        .insert("prod/blog/secret-00", SecretValue::new("other"))
        .await;
    store
        .insert("staging/shop/secret-00", SecretValue::new("other"))
        .await;

    let aggregator =
        SecretAggregator::new(Arc::new(store), "prod/shop/").with_page_size(7);

    let secrets = aggregator.fetch_all().await.unwrap();

    assert_eq!(secrets.len(), 42);
    for i in 0..42 {
        let key = format!("secret-{i:02}");
        assert_eq!(secrets[&key].expose(), format!("value-{i}"));
    }
}

#[tokio::test]
async fn fetch_one_and_fetch_all_agree() {
    let store = MemorySecretStore::new();
    store
        .insert("prod/shop/db-password", SecretValue::new("hunter2"))
        .await;

    let aggregator = SecretAggregator::new(Arc::new(store), "prod/shop/");

    let all = aggregator.fetch_all().await.unwrap();
    let one = aggregator.fetch_one("db-password").await.unwrap();

    assert_eq!(all["db-password"], one);
}

#[tokio::test]
async fn missing_single_secret_error_carries_full_name() {
    let store = MemorySecretStore::new();
    let aggregator = SecretAggregator::new(Arc::new(store), "prod/shop/");

    let err = aggregator.fetch_one("nope").await.unwrap_err();

    let SecretsError::SingleFetch { name, .. } = err else {
        panic!("expected single-fetch error");
    };
    assert_eq!(name, "prod/shop/nope");
}
