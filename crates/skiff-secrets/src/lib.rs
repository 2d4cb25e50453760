//! Secret retrieval for Skiff deployments.
//!
//! This crate aggregates named secrets from an external secret store:
//! prefix-filtered, cursor-paginated batch retrieval assembled into a flat
//! name → value mapping with the prefix stripped, plus single-secret
//! lookup. Values are protected in memory via the `secrecy` and `zeroize`
//! crates and never appear in `Debug` output or logs.
//!
//! # Guarantees
//!
//! - `fetch_all` exhausts pagination before returning; a failure on any
//!   page aborts the whole run and no partial mapping is ever returned.
//! - Exposed keys are always the stored names with the configured prefix
//!   stripped from the front; a key collision or an out-of-prefix name is
//!   reported as an error, never silently merged.
//! - Nothing is cached: every call goes to the store.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use skiff_secrets::SecretAggregator;
//!
//! let aggregator = SecretAggregator::new(store, "prod/shop/");
//!
//! // {"db-password": ..., "api-token": ...} for stored names
//! // "prod/shop/db-password", "prod/shop/api-token".
//! let secrets = aggregator.fetch_all().await?;
//! let token = aggregator.fetch_one("api-token").await?;
//! ```

#![forbid(unsafe_code)]

pub mod aggregator;
pub mod config;
pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

// Re-export commonly used types at the crate root
pub use aggregator::{DEFAULT_PAGE_SIZE, SecretAggregator};
pub use config::AggregatorConfig;
pub use error::{SecretsError, SecretsResult};
pub use memory::MemorySecretStore;
pub use traits::{SecretStore, StoreError};
pub use types::{PageToken, SecretEntry, SecretPage, SecretValue};
