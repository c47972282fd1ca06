//! Relational backend: stores, deals, footer links and admins in SQL tables.

pub mod format;
pub mod rows;
mod writer;

use sqlx::SqlitePool;

use stores_deals_core::{
    AdminDocument, AggregateDocument, NewStore, SavePayload, StoreDetail, StoreDocument, StoreId,
};

use self::format::{deal_document, format_footer_links, format_stores, store_document};
use self::rows::{
    AdminCredentialRow, AdminRow, CategoryRow, DealRow, LinkRow, StoreRow, StoreSummary,
};
use super::save::{SaveWriter, save_document};
use super::{AdminRecord, NewAdmin, StorageError};

pub use writer::RelationalSaveWriter;

const STORE_COLUMNS: &str = "id, slug, name, logo, bg_color, color, active, created_at, updated_at";
const DEAL_COLUMNS: &str = "id, store_id, title, description, importance, link, active";

/// Storage over the relational schema.
#[derive(Debug, Clone)]
pub struct RelationalStorage {
    pool: SqlitePool,
}

impl RelationalStorage {
    /// Wrap a pool whose database has the relational migrations applied.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Build the aggregate document from active rows.
    ///
    /// The five reads are independent and run concurrently.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if any query fails.
    pub async fn load_document(&self) -> Result<AggregateDocument, StorageError> {
        let stores_sql = format!("SELECT {STORE_COLUMNS} FROM stores WHERE active = 1 ORDER BY id");
        let deals_sql = format!("SELECT {DEAL_COLUMNS} FROM deals WHERE active = 1 ORDER BY id");

        let (stores, deals, categories, links, admins) = tokio::try_join!(
            sqlx::query_as::<_, StoreRow>(&stores_sql).fetch_all(&self.pool),
            sqlx::query_as::<_, DealRow>(&deals_sql).fetch_all(&self.pool),
            sqlx::query_as::<_, CategoryRow>(
                "SELECT id, name FROM footer_link_categories ORDER BY id"
            )
            .fetch_all(&self.pool),
            sqlx::query_as::<_, LinkRow>(
                "SELECT id, category_id, title, link, active FROM footer_links WHERE active = 1 ORDER BY id"
            )
            .fetch_all(&self.pool),
            sqlx::query_as::<_, AdminRow>("SELECT id, username, role FROM admins ORDER BY id")
                .fetch_all(&self.pool),
        )?;

        tracing::debug!(
            stores = stores.len(),
            deals = deals.len(),
            categories = categories.len(),
            links = links.len(),
            admins = admins.len(),
            "Loaded relational document"
        );

        Ok(AggregateDocument {
            stores: format_stores(&stores, &deals),
            footer_links: format_footer_links(&categories, &links),
            admins: admins
                .into_iter()
                .map(|row| AdminDocument {
                    id: row.id.to_string(),
                    username: row.username,
                    role: row.role,
                })
                .collect(),
        })
    }

    /// All stores, active or not, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the query fails.
    pub async fn list_stores(&self) -> Result<Vec<StoreSummary>, StorageError> {
        let rows = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(StoreSummary::from).collect())
    }

    /// One store with all its deals (inactive included), deals ordered by title.
    ///
    /// `key` is either the row id or the slug the store was saved under.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if a query fails.
    pub async fn get_store(&self, key: &str) -> Result<Option<StoreDetail>, StorageError> {
        let id = StoreId::parse_key(key);
        let store_sql = format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = ? OR slug = ?");

        let Some(row) = sqlx::query_as::<_, StoreRow>(&store_sql)
            .bind(id)
            .bind(id.is_none().then_some(key))
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let deals = sqlx::query_as::<_, DealRow>(&format!(
            "SELECT {DEAL_COLUMNS} FROM deals WHERE store_id = ? ORDER BY title"
        ))
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        let mut document = store_document(&row);
        document.deals = deals.iter().map(deal_document).collect();
        Ok(Some(StoreDetail {
            id: row.document_key(),
            store: document,
        }))
    }

    /// Insert a store and its deals in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if any insert fails; nothing is written.
    pub async fn create_store(&self, new_store: NewStore) -> Result<String, StorageError> {
        let store: StoreDocument = new_store.into();
        let mut writer = RelationalSaveWriter::begin(&self.pool).await?;

        let created = async {
            let id = writer.insert_store(None, None, &store).await?;
            writer.replace_deals(&id, &store.deals).await?;
            Ok::<_, StorageError>(id)
        }
        .await;

        match created {
            Ok(id) => {
                let _ = writer.commit().await?;
                tracing::info!(store_id = %id, deals = store.deals.len(), "Store created");
                Ok(id.to_string())
            }
            Err(err) => {
                if let Err(rollback_err) = writer.rollback().await {
                    tracing::error!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Apply an admin save in one transaction.
    ///
    /// # Errors
    ///
    /// Returns the first failing statement's error; the transaction is rolled back.
    pub async fn save(&self, payload: &SavePayload) -> Result<(), StorageError> {
        let writer = RelationalSaveWriter::begin(&self.pool).await?;
        save_document(writer, payload).await.map(|_committed| ())
    }

    /// Look up an admin with their password hash.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the query fails.
    pub async fn find_admin(&self, username: &str) -> Result<Option<AdminRecord>, StorageError> {
        let row = sqlx::query_as::<_, AdminCredentialRow>(
            "SELECT id, username, password, role FROM admins WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| AdminRecord {
            id: r.id.to_string(),
            username: r.username,
            password: r.password,
            role: r.role,
        }))
    }

    /// Insert an admin account.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the username is taken.
    /// Returns `StorageError::Database` for other database errors.
    pub async fn create_admin(&self, admin: NewAdmin) -> Result<String, StorageError> {
        let result = sqlx::query("INSERT INTO admins (username, password, role) VALUES (?, ?, ?)")
            .bind(&admin.username)
            .bind(&admin.password_hash)
            .bind(admin.role)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return StorageError::Conflict(format!(
                        "username '{}' already exists",
                        admin.username
                    ));
                }
                StorageError::Database(e)
            })?;

        Ok(result.last_insert_rowid().to_string())
    }

    /// Check database connectivity.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the database cannot be queried.
    pub async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
