//! Storage layer.
//!
//! [`Storage`] is chosen once at startup from [`StorageBackend`] and owns
//! every read and write the routes perform. Both backends share the save
//! orchestration in [`save`].

pub mod keyvalue;
pub mod kv;
pub mod relational;
pub mod save;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stores_deals_core::{
    AdminDocument, AdminRole, AggregateDocument, NewStore, SavePayload, StoreDetail, StoreMap,
};

use crate::config::{KvBackendConfig, StorageBackend};
use crate::db;

pub use keyvalue::KvStorage;
pub use kv::{KvBackend, KvError, KvStore, LocalFileStore, PutOutcome, SqlKvStore};
pub use relational::RelationalStorage;
use relational::rows::StoreSummary;

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("{0}")]
    Kv(#[from] KvError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("data corruption: {0}")]
    DataCorruption(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

/// An admin account including the password hash.
///
/// This is also the on-disk shape of entries under the `admins` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRecord {
    #[serde(default)]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: AdminRole,
}

impl From<AdminRecord> for AdminDocument {
    fn from(record: AdminRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            role: record.role,
        }
    }
}

/// Input for creating an admin account.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub username: String,
    /// PHC-format password hash.
    pub password_hash: String,
    pub role: AdminRole,
}

/// The admin store listing, whose shape depends on the backend.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StoreListing {
    /// Relational: summaries ordered by name.
    Rows(Vec<StoreSummary>),
    /// Key-value: the raw stores map.
    Map(StoreMap),
}

impl StoreListing {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Rows(rows) => rows.len(),
            Self::Map(map) => map.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The active storage backend.
#[derive(Debug)]
pub enum Storage {
    KeyValue(KvStorage),
    Relational(RelationalStorage),
}

impl Storage {
    /// Open the configured backend.
    ///
    /// Migrations are not applied here; run them with `deals-cli migrate`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if a database pool cannot be created.
    pub async fn connect(backend: &StorageBackend) -> Result<Self, StorageError> {
        let storage = match backend {
            StorageBackend::Relational { database_url } => {
                let pool = db::create_pool(database_url).await?;
                Self::Relational(RelationalStorage::new(pool))
            }
            StorageBackend::KeyValue(KvBackendConfig::Managed { url }) => {
                let pool = db::create_pool(url).await?;
                Self::KeyValue(KvStorage::new(KvBackend::Managed(SqlKvStore::new(pool))))
            }
            StorageBackend::KeyValue(KvBackendConfig::LocalFiles { dir }) => Self::KeyValue(
                KvStorage::new(KvBackend::LocalFiles(LocalFileStore::new(dir.clone()))),
            ),
        };

        tracing::info!(backend = storage.name(), "Storage connected");
        Ok(storage)
    }

    /// Apply whichever migrations the backend needs. Local files need none.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Migration` if a migration fails.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        match self {
            Self::Relational(storage) => db::migrate_relational(storage.pool()).await?,
            Self::KeyValue(storage) => {
                if let KvBackend::Managed(store) = storage.kv() {
                    db::migrate_kv(store.pool()).await?;
                }
            }
        }
        Ok(())
    }

    /// Short backend name for logs and health output.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Relational(_) => "relational",
            Self::KeyValue(storage) => match storage.kv() {
                KvBackend::Managed(_) => "kv",
                KvBackend::LocalFiles(_) => "local",
            },
        }
    }

    /// The aggregate document served by `GET /api/data`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn load_document(&self) -> Result<AggregateDocument, StorageError> {
        match self {
            Self::KeyValue(storage) => storage.load_document().await,
            Self::Relational(storage) => storage.load_document().await,
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn list_stores(&self) -> Result<StoreListing, StorageError> {
        match self {
            Self::KeyValue(storage) => storage.list_stores().await.map(StoreListing::Map),
            Self::Relational(storage) => storage.list_stores().await.map(StoreListing::Rows),
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn get_store(&self, id: &str) -> Result<Option<StoreDetail>, StorageError> {
        match self {
            Self::KeyValue(storage) => storage.get_store(id).await,
            Self::Relational(storage) => storage.get_store(id).await,
        }
    }

    /// Create a store and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn create_store(&self, store: NewStore) -> Result<String, StorageError> {
        match self {
            Self::KeyValue(storage) => storage.create_store(store).await,
            Self::Relational(storage) => storage.create_store(store).await,
        }
    }

    /// Persist an admin save.
    ///
    /// Only the local development store reports `PutOutcome::Discarded`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn save(&self, payload: &SavePayload) -> Result<PutOutcome, StorageError> {
        match self {
            Self::KeyValue(storage) => storage.save(payload).await,
            Self::Relational(storage) => {
                storage.save(payload).await?;
                Ok(PutOutcome::Persisted)
            }
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn find_admin(&self, username: &str) -> Result<Option<AdminRecord>, StorageError> {
        match self {
            Self::KeyValue(storage) => storage.find_admin(username).await,
            Self::Relational(storage) => storage.find_admin(username).await,
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the username is taken.
    pub async fn create_admin(&self, admin: NewAdmin) -> Result<String, StorageError> {
        match self {
            Self::KeyValue(storage) => storage.create_admin(admin).await,
            Self::Relational(storage) => storage.create_admin(admin).await,
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend does not answer.
    pub async fn ping(&self) -> Result<(), StorageError> {
        match self {
            Self::KeyValue(storage) => storage.ping().await,
            Self::Relational(storage) => storage.ping().await,
        }
    }
}
