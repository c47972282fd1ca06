//! Key-value backend: the whole document lives under three keys.

use tokio::sync::Mutex;
use uuid::Uuid;

use stores_deals_core::{
    AdminDocument, AggregateDocument, DealDocument, FooterLinkDocument, FooterLinkMap, NewStore,
    SavePayload, StoreDetail, StoreDocument, StoreMap,
};

use super::kv::{ADMINS_KEY, FOOTER_LINKS_KEY, KvBackend, PutOutcome, STORES_KEY};
use super::save::{SaveWriter, save_document};
use super::{AdminRecord, NewAdmin, StorageError};

/// Storage over a [`KvBackend`].
///
/// Read-modify-write operations are serialised by an in-process lock. Nothing
/// guards against a second process writing the same keys.
#[derive(Debug)]
pub struct KvStorage {
    kv: KvBackend,
    write_lock: Mutex<()>,
}

impl KvStorage {
    #[must_use]
    pub fn new(kv: KvBackend) -> Self {
        Self {
            kv,
            write_lock: Mutex::new(()),
        }
    }

    /// The underlying key-value store.
    #[must_use]
    pub const fn kv(&self) -> &KvBackend {
        &self.kv
    }

    /// Read the three keys. Absent keys become empty collections.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Kv` if the managed store fails.
    pub async fn load_document(&self) -> Result<AggregateDocument, StorageError> {
        let (stores, footer_links, admins) = tokio::try_join!(
            self.kv.get_json::<StoreMap>(STORES_KEY),
            self.kv.get_json::<FooterLinkMap>(FOOTER_LINKS_KEY),
            self.read_admins(),
        )?;

        Ok(AggregateDocument {
            stores: stores.unwrap_or_default(),
            footer_links: footer_links.unwrap_or_default(),
            admins: admins.into_iter().map(AdminDocument::from).collect(),
        })
    }

    /// The raw stores map.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Kv` if the managed store fails.
    pub async fn list_stores(&self) -> Result<StoreMap, StorageError> {
        Ok(self.read_stores().await?)
    }

    /// The store saved under `key`, deals included.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Kv` if the managed store fails.
    pub async fn get_store(&self, key: &str) -> Result<Option<StoreDetail>, StorageError> {
        let mut stores = self.read_stores().await?;
        Ok(stores.remove(key).map(|store| StoreDetail {
            id: key.to_string(),
            store,
        }))
    }

    /// Add a store under a fresh `store-<uuid>` key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Kv` if the managed store fails or the local
    /// store discards the write.
    pub async fn create_store(&self, new_store: NewStore) -> Result<String, StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut stores = self.read_stores().await?;
        let id = loop {
            let candidate = format!("store-{}", Uuid::new_v4().simple());
            if !stores.contains_key(&candidate) {
                break candidate;
            }
            tracing::warn!(store_id = %candidate, "Generated store id collided, retrying");
        };

        stores.insert(id.clone(), new_store.into());
        self.kv
            .put_json(STORES_KEY, &stores)
            .await?
            .require_persisted(STORES_KEY)?;

        tracing::info!(store_id = %id, "Store created");
        Ok(id)
    }

    /// Overwrite each collection present in `payload`.
    ///
    /// The two keys are written one after the other; a failure between them
    /// leaves the first write in place. A local store that cannot write
    /// reports `PutOutcome::Discarded` instead of failing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Kv` if a write to the managed store fails.
    pub async fn save(&self, payload: &SavePayload) -> Result<PutOutcome, StorageError> {
        let _guard = self.write_lock.lock().await;
        save_document(KvSaveWriter::for_payload(&self.kv, payload), payload).await
    }

    /// Look up an admin with their password hash.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Kv` if the managed store fails.
    pub async fn find_admin(&self, username: &str) -> Result<Option<AdminRecord>, StorageError> {
        let admins = self.read_admins().await?;
        Ok(admins.into_iter().find(|a| a.username == username))
    }

    /// Append an admin to the `admins` key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the username is taken.
    /// Returns `StorageError::Kv` if the managed store fails or the local
    /// store discards the write.
    pub async fn create_admin(&self, admin: NewAdmin) -> Result<String, StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut admins = self.read_admins().await?;
        if admins.iter().any(|a| a.username == admin.username) {
            return Err(StorageError::Conflict(format!(
                "username '{}' already exists",
                admin.username
            )));
        }

        let id = format!("admin-{}", Uuid::new_v4().simple());
        admins.push(AdminRecord {
            id: id.clone(),
            username: admin.username,
            password: admin.password_hash,
            role: admin.role,
        });
        self.kv
            .put_json(ADMINS_KEY, &admins)
            .await?
            .require_persisted(ADMINS_KEY)?;

        Ok(id)
    }

    /// Check that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Kv` if the managed store cannot be queried.
    pub async fn ping(&self) -> Result<(), StorageError> {
        Ok(self.kv.ping().await?)
    }

    async fn read_stores(&self) -> Result<StoreMap, StorageError> {
        Ok(self
            .kv
            .get_json::<StoreMap>(STORES_KEY)
            .await?
            .unwrap_or_default())
    }

    async fn read_admins(&self) -> Result<Vec<AdminRecord>, super::kv::KvError> {
        Ok(self
            .kv
            .get_json::<Vec<AdminRecord>>(ADMINS_KEY)
            .await?
            .unwrap_or_default())
    }
}

/// Stages a save in memory, then writes each touched key once.
struct KvSaveWriter<'a> {
    kv: &'a KvBackend,
    stores: Option<StoreMap>,
    footer_links: Option<FooterLinkMap>,
}

impl<'a> KvSaveWriter<'a> {
    /// Start with an empty collection for each one present in `payload`, so
    /// that it replaces the stored value wholesale.
    fn for_payload(kv: &'a KvBackend, payload: &SavePayload) -> Self {
        Self {
            kv,
            stores: payload.stores.as_ref().map(|_| StoreMap::new()),
            footer_links: payload.footer_links.as_ref().map(|_| FooterLinkMap::new()),
        }
    }
}

impl SaveWriter for KvSaveWriter<'_> {
    type StoreHandle = String;

    async fn upsert_store(
        &mut self,
        key: &str,
        store: &StoreDocument,
    ) -> Result<String, StorageError> {
        let stores = self.stores.get_or_insert_default();
        stores.insert(
            key.to_string(),
            StoreDocument {
                deals: Vec::new(),
                ..store.clone()
            },
        );
        Ok(key.to_string())
    }

    async fn replace_deals(
        &mut self,
        store: &String,
        deals: &[DealDocument],
    ) -> Result<(), StorageError> {
        let entry = self
            .stores
            .as_mut()
            .and_then(|stores| stores.get_mut(store))
            .ok_or_else(|| StorageError::DataCorruption(format!("store '{store}' not staged")))?;
        entry.deals = deals.to_vec();
        Ok(())
    }

    async fn replace_links(
        &mut self,
        category: &str,
        links: &[FooterLinkDocument],
    ) -> Result<(), StorageError> {
        self.footer_links
            .get_or_insert_default()
            .insert(category.to_string(), links.to_vec());
        Ok(())
    }

    async fn commit(self) -> Result<PutOutcome, StorageError> {
        let mut outcome = PutOutcome::Persisted;
        if let Some(stores) = &self.stores {
            outcome = outcome.and(self.kv.put_json(STORES_KEY, stores).await?);
            tracing::debug!(stores = stores.len(), "Wrote stores");
        }
        if let Some(footer_links) = &self.footer_links {
            outcome = outcome.and(self.kv.put_json(FOOTER_LINKS_KEY, footer_links).await?);
            tracing::debug!(categories = footer_links.len(), "Wrote footer links");
        }
        Ok(outcome)
    }

    /// Nothing was written before commit, so there is nothing to undo.
    async fn rollback(self) -> Result<(), StorageError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use stores_deals_core::{AdminRole, Importance};

    use super::*;
    use crate::db::test_support::kv_pool;
    use crate::storage::kv::{KvError, LocalFileStore, SqlKvStore};

    async fn managed() -> KvStorage {
        KvStorage::new(KvBackend::Managed(SqlKvStore::new(kv_pool().await)))
    }

    fn flash_deal_payload() -> SavePayload {
        let mut stores = StoreMap::new();
        stores.insert(
            "amazon".to_string(),
            StoreDocument {
                name: "Amazon".to_string(),
                logo: "/assets/amazon.png".to_string(),
                bg_color: "from-yellow-400 to-yellow-500".to_string(),
                color: "#000".to_string(),
                active: true,
                deals: vec![DealDocument {
                    id: "1".to_string(),
                    title: "Flash Deal".to_string(),
                    description: "Up to 70% off".to_string(),
                    importance: Importance::High,
                    link: "https://amazon.com".to_string(),
                    active: true,
                }],
            },
        );
        SavePayload {
            stores: Some(stores),
            footer_links: None,
        }
    }

    #[tokio::test]
    async fn test_empty_store_yields_empty_document() {
        let storage = managed().await;
        let document = storage.load_document().await.unwrap();
        assert_eq!(document, AggregateDocument::default());
    }

    #[tokio::test]
    async fn test_amazon_flash_deal_round_trip() {
        let storage = managed().await;
        let payload = flash_deal_payload();

        assert_eq!(storage.save(&payload).await.unwrap(), PutOutcome::Persisted);
        let document = storage.load_document().await.unwrap();

        assert_eq!(Some(document.stores), payload.stores);
        assert!(document.footer_links.is_empty());
    }

    #[tokio::test]
    async fn test_save_overwrites_stores_wholesale() {
        let storage = managed().await;
        let _ = storage.save(&flash_deal_payload()).await.unwrap();

        let mut stores = StoreMap::new();
        stores.insert("temu".to_string(), StoreDocument::default());
        let _ = storage
            .save(&SavePayload {
                stores: Some(stores),
                footer_links: None,
            })
            .await
            .unwrap();

        let document = storage.load_document().await.unwrap();
        assert_eq!(document.stores.keys().collect::<Vec<_>>(), ["temu"]);
    }

    #[tokio::test]
    async fn test_empty_stores_leave_footer_links_untouched() {
        let storage = managed().await;
        let mut footer_links = FooterLinkMap::new();
        footer_links.insert(
            "legal".to_string(),
            vec![FooterLinkDocument {
                id: "1".to_string(),
                title: "Privacy Policy".to_string(),
                link: "/privacy-policy".to_string(),
                active: true,
            }],
        );
        let _ = storage
            .save(&SavePayload {
                stores: None,
                footer_links: Some(footer_links.clone()),
            })
            .await
            .unwrap();

        let _ = storage
            .save(&SavePayload {
                stores: Some(StoreMap::new()),
                footer_links: None,
            })
            .await
            .unwrap();

        let document = storage.load_document().await.unwrap();
        assert!(document.stores.is_empty());
        assert_eq!(document.footer_links, footer_links);
    }

    #[tokio::test]
    async fn test_create_store_ids_are_distinct() {
        let storage = managed().await;
        let new_store = || NewStore {
            name: "Shein".to_string(),
            active: true,
            ..Default::default()
        };

        let (first, second) = tokio::join!(
            storage.create_store(new_store()),
            storage.create_store(new_store())
        );
        let (first, second) = (first.unwrap(), second.unwrap());

        assert_ne!(first, second);
        assert!(first.starts_with("store-"));
        // Both survive the read-modify-write
        assert_eq!(storage.list_stores().await.unwrap().len(), 2);
        let detail = storage.get_store(&second).await.unwrap().unwrap();
        assert_eq!(detail.id, second);
        assert_eq!(detail.store.name, "Shein");
    }

    #[tokio::test]
    async fn test_get_store_missing() {
        let storage = managed().await;
        assert!(storage.get_store("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_admins_hidden_password_and_conflict() {
        let storage = managed().await;
        let admin = || NewAdmin {
            username: "root".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role: AdminRole::SuperAdmin,
        };
        storage.create_admin(admin()).await.unwrap();
        assert!(matches!(
            storage.create_admin(admin()).await,
            Err(StorageError::Conflict(_))
        ));

        let document = storage.load_document().await.unwrap();
        assert_eq!(document.admins.len(), 1);
        assert_eq!(document.admins[0].username, "root");

        let record = storage.find_admin("root").await.unwrap().unwrap();
        assert_eq!(record.password, "$argon2id$stub");
        assert!(storage.find_admin("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_local_files_round_trip_and_layout() {
        let dir = tempfile::tempdir().unwrap();
        let storage = KvStorage::new(KvBackend::LocalFiles(LocalFileStore::new(dir.path())));

        let outcome = storage.save(&flash_deal_payload()).await.unwrap();

        assert_eq!(outcome, PutOutcome::Persisted);
        assert!(dir.path().join("stores.json").exists());
        assert!(!dir.path().join("footerLinks.json").exists());
        let document = storage.load_document().await.unwrap();
        assert_eq!(document.stores["amazon"].deals[0].title, "Flash Deal");
    }

    #[tokio::test]
    async fn test_local_files_unwritable_dir_is_soft() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the data directory should be
        let blocker = dir.path().join("dev-data");
        tokio::fs::write(&blocker, "").await.unwrap();
        let storage = KvStorage::new(KvBackend::LocalFiles(LocalFileStore::new(&blocker)));

        let outcome = storage.save(&flash_deal_payload()).await.unwrap();
        assert_eq!(outcome, PutOutcome::Discarded);
        assert!(storage.load_document().await.unwrap().stores.is_empty());
    }

    #[tokio::test]
    async fn test_local_files_unwritable_dir_fails_creates() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("dev-data");
        tokio::fs::write(&blocker, "").await.unwrap();
        let storage = KvStorage::new(KvBackend::LocalFiles(LocalFileStore::new(&blocker)));

        let created = storage
            .create_store(NewStore {
                name: "Temu".to_string(),
                active: true,
                ..Default::default()
            })
            .await;
        assert!(matches!(
            created,
            Err(StorageError::Kv(KvError::Discarded(ref key))) if key == STORES_KEY
        ));
        assert!(storage.list_stores().await.unwrap().is_empty());

        let admin = storage
            .create_admin(NewAdmin {
                username: "root".to_string(),
                password_hash: "$argon2id$stub".to_string(),
                role: AdminRole::Admin,
            })
            .await;
        assert!(matches!(admin, Err(StorageError::Kv(KvError::Discarded(_)))));
        assert!(storage.find_admin("root").await.unwrap().is_none());
    }
}
