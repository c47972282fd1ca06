//! Key-value adapter.
//!
//! Two concrete stores satisfy [`KvStore`]:
//!
//! - [`SqlKvStore`] - the managed store, a `kv_entries` table; every error propagates
//! - [`LocalFileStore`] - `<dir>/<key>.json` files for development; failures are
//!   logged and reported as absent data or [`PutOutcome::Discarded`]
//!
//! [`KvBackend`] wraps whichever one is configured so callers never branch on it.

mod local;
mod managed;

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use local::LocalFileStore;
pub use managed::SqlKvStore;

/// Key holding the stores map.
pub const STORES_KEY: &str = "stores";
/// Key holding footer links grouped by category.
pub const FOOTER_LINKS_KEY: &str = "footerLinks";
/// Key holding the admin accounts list.
pub const ADMINS_KEY: &str = "admins";

/// Errors from a key-value store.
#[derive(Debug, Error)]
pub enum KvError {
    #[error("invalid key '{0}': keys may only contain letters, digits, '-' and '_'")]
    InvalidKey(String),

    #[error("kv database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("kv serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("write to '{0}' was discarded by the local store")]
    Discarded(String),
}

/// Result of a write.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The value is durably stored.
    Persisted,
    /// The store could not write and dropped the value (development stores only).
    Discarded,
}

impl PutOutcome {
    /// `Discarded` if either write was discarded.
    pub const fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::Persisted, Self::Persisted) => Self::Persisted,
            _ => Self::Discarded,
        }
    }

    /// Turn a discarded write of `key` into an error.
    ///
    /// # Errors
    ///
    /// Returns `KvError::Discarded` for `PutOutcome::Discarded`.
    pub fn require_persisted(self, key: &str) -> Result<(), KvError> {
        match self {
            Self::Persisted => Ok(()),
            Self::Discarded => Err(KvError::Discarded(key.to_string())),
        }
    }
}

/// Minimal key-value contract.
pub trait KvStore: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, KvError>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &str)
    -> impl Future<Output = Result<PutOutcome, KvError>> + Send;
}

/// Reject keys that could escape a directory or a key namespace.
pub(crate) fn validate_key(key: &str) -> Result<(), KvError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(KvError::InvalidKey(key.to_string()))
    }
}

/// The configured key-value store.
#[derive(Debug, Clone)]
pub enum KvBackend {
    Managed(SqlKvStore),
    LocalFiles(LocalFileStore),
}

impl KvBackend {
    /// Whether failures are swallowed instead of propagated.
    #[must_use]
    pub const fn is_soft(&self) -> bool {
        matches!(self, Self::LocalFiles(_))
    }

    /// Read and deserialize a JSON value.
    ///
    /// Local files that do not parse are logged and treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `KvError` if the managed store fails or holds invalid JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, KvError> {
        let Some(raw) = self.get(key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) if self.is_soft() => {
                tracing::warn!(key, error = %e, "Ignoring unparseable local kv value");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Serialize and store a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `KvError` if serialization fails or the managed store fails.
    pub async fn put_json<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<PutOutcome, KvError> {
        let raw = if self.is_soft() {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        let outcome = self.put(key, &raw).await?;
        if outcome == PutOutcome::Discarded {
            tracing::warn!(key, "Local kv write discarded");
        }
        Ok(outcome)
    }

    /// Check that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `KvError::Database` if the managed store cannot be queried.
    pub async fn ping(&self) -> Result<(), KvError> {
        match self {
            Self::Managed(store) => store.ping().await,
            Self::LocalFiles(_) => Ok(()),
        }
    }
}

impl KvStore for KvBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        match self {
            Self::Managed(store) => store.get(key).await,
            Self::LocalFiles(store) => store.get(key).await,
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<PutOutcome, KvError> {
        match self {
            Self::Managed(store) => store.put(key, value).await,
            Self::LocalFiles(store) => store.put(key, value).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::db::test_support::kv_pool;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("stores").is_ok());
        assert!(validate_key("footer_links-2").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("a/b").is_err());
        assert!(validate_key("stores.json").is_err());
    }

    #[tokio::test]
    async fn test_get_json_soft_on_garbage_local_file() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("stores.json"), "{not json")
            .await
            .unwrap();
        let kv = KvBackend::LocalFiles(LocalFileStore::new(dir.path()));

        let value: Option<BTreeMap<String, String>> = kv.get_json(STORES_KEY).await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_get_json_strict_on_garbage_managed_value() {
        let store = SqlKvStore::new(kv_pool().await);
        let _ = store.put(STORES_KEY, "{not json").await.unwrap();
        let kv = KvBackend::Managed(store);

        let result: Result<Option<BTreeMap<String, String>>, _> = kv.get_json(STORES_KEY).await;
        assert!(matches!(result, Err(KvError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_put_json_then_get_json() {
        let kv = KvBackend::Managed(SqlKvStore::new(kv_pool().await));
        let mut value = BTreeMap::new();
        value.insert("amazon".to_string(), "Amazon".to_string());

        let outcome = kv.put_json(STORES_KEY, &value).await.unwrap();
        assert_eq!(outcome, PutOutcome::Persisted);

        let read: Option<BTreeMap<String, String>> = kv.get_json(STORES_KEY).await.unwrap();
        assert_eq!(read, Some(value));
    }
}
