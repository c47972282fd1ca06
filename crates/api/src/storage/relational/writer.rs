//! Transactional writer for the relational tables.

use sqlx::{Sqlite, SqlitePool, Transaction};

use stores_deals_core::{
    DealDocument, FooterLinkDocument, LinkCategoryId, StoreDocument, StoreId,
};

use crate::storage::{PutOutcome, StorageError};
use crate::storage::save::SaveWriter;

/// Stages store, deal and footer-link writes in one transaction.
///
/// Dropping the writer without committing rolls the transaction back.
pub struct RelationalSaveWriter {
    tx: Transaction<'static, Sqlite>,
}

impl RelationalSaveWriter {
    /// Open a transaction on `pool`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if no connection can be acquired.
    pub async fn begin(pool: &SqlitePool) -> Result<Self, StorageError> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }

    /// Insert a new store row and return its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Database` if the insert fails.
    pub async fn insert_store(
        &mut self,
        id: Option<StoreId>,
        slug: Option<&str>,
        store: &StoreDocument,
    ) -> Result<StoreId, StorageError> {
        let result = sqlx::query(
            r"
            INSERT INTO stores (id, slug, name, logo, bg_color, color, active)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(id)
        .bind(slug)
        .bind(&store.name)
        .bind(&store.logo)
        .bind(&store.bg_color)
        .bind(&store.color)
        .bind(i64::from(store.active))
        .execute(&mut *self.tx)
        .await?;

        Ok(StoreId::new(result.last_insert_rowid()))
    }

    async fn category_id(&mut self, name: &str) -> Result<LinkCategoryId, StorageError> {
        let existing = sqlx::query_scalar::<_, LinkCategoryId>(
            "SELECT id FROM footer_link_categories WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;

        if let Some(id) = existing {
            return Ok(id);
        }

        tracing::info!(category = name, "Creating footer link category");
        let result = sqlx::query("INSERT INTO footer_link_categories (name) VALUES (?)")
            .bind(name)
            .execute(&mut *self.tx)
            .await?;

        Ok(LinkCategoryId::new(result.last_insert_rowid()))
    }
}

impl SaveWriter for RelationalSaveWriter {
    type StoreHandle = StoreId;

    /// Update the row named by `key`, else insert one.
    ///
    /// Numeric keys name the row id and keep it on insert. Any other key is
    /// stored as the row's slug, so saving the same key again updates the
    /// same row.
    async fn upsert_store(
        &mut self,
        key: &str,
        store: &StoreDocument,
    ) -> Result<StoreId, StorageError> {
        let id = StoreId::parse_key(key);
        let slug = id.is_none().then_some(key);

        let updated = sqlx::query_scalar::<_, StoreId>(
            r"
            UPDATE stores
            SET name = ?, logo = ?, bg_color = ?, color = ?, active = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ? OR slug = ?
            RETURNING id
            ",
        )
        .bind(&store.name)
        .bind(&store.logo)
        .bind(&store.bg_color)
        .bind(&store.color)
        .bind(i64::from(store.active))
        .bind(id)
        .bind(slug)
        .fetch_optional(&mut *self.tx)
        .await?;

        match updated {
            Some(id) => Ok(id),
            None => self.insert_store(id, slug, store).await,
        }
    }

    async fn replace_deals(
        &mut self,
        store: &StoreId,
        deals: &[DealDocument],
    ) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM deals WHERE store_id = ?")
            .bind(*store)
            .execute(&mut *self.tx)
            .await?;

        for deal in deals {
            sqlx::query(
                r"
                INSERT INTO deals (store_id, title, description, importance, link, active)
                VALUES (?, ?, ?, ?, ?, ?)
                ",
            )
            .bind(*store)
            .bind(&deal.title)
            .bind(&deal.description)
            .bind(deal.importance)
            .bind(&deal.link)
            .bind(i64::from(deal.active))
            .execute(&mut *self.tx)
            .await?;
        }

        Ok(())
    }

    async fn replace_links(
        &mut self,
        category: &str,
        links: &[FooterLinkDocument],
    ) -> Result<(), StorageError> {
        let category_id = self.category_id(category).await?;

        sqlx::query("DELETE FROM footer_links WHERE category_id = ?")
            .bind(category_id)
            .execute(&mut *self.tx)
            .await?;

        for link in links {
            sqlx::query(
                r"
                INSERT INTO footer_links (category_id, title, link, active)
                VALUES (?, ?, ?, ?)
                ",
            )
            .bind(category_id)
            .bind(&link.title)
            .bind(&link.link)
            .bind(i64::from(link.active))
            .execute(&mut *self.tx)
            .await?;
        }

        Ok(())
    }

    async fn commit(self) -> Result<PutOutcome, StorageError> {
        self.tx.commit().await?;
        Ok(PutOutcome::Persisted)
    }

    async fn rollback(self) -> Result<(), StorageError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
