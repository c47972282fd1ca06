//! Flat row types read from the relational tables.
//!
//! Boolean flags are kept as the stored 0/1 integers; the formatter coerces
//! them on the way out.

use chrono::NaiveDateTime;
use serde::Serialize;

use stores_deals_core::{
    AdminId, AdminRole, DealId, FooterLinkId, Importance, LinkCategoryId, StoreId,
};

/// A row of `stores`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreRow {
    pub id: StoreId,
    /// Document key the store was saved under, when it is not the id.
    pub slug: Option<String>,
    pub name: String,
    pub logo: String,
    pub bg_color: String,
    pub color: String,
    pub active: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A row of `deals`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DealRow {
    pub id: DealId,
    pub store_id: StoreId,
    pub title: String,
    pub description: String,
    pub importance: Importance,
    pub link: String,
    pub active: i64,
}

/// A row of `footer_link_categories`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: LinkCategoryId,
    pub name: String,
}

/// A row of `footer_links`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LinkRow {
    pub id: FooterLinkId,
    pub category_id: LinkCategoryId,
    pub title: String,
    pub link: String,
    pub active: i64,
}

/// Public columns of `admins`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminRow {
    pub id: AdminId,
    pub username: String,
    pub role: AdminRole,
}

/// `admins` including the password hash, for login only.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminCredentialRow {
    pub id: AdminId,
    pub username: String,
    pub password: String,
    pub role: AdminRole,
}

/// A store as listed by `GET /api/admin/stores` on the relational backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    pub id: StoreId,
    /// Key accepted by `GET /api/admin/stores/{id}` and used in the document.
    pub key: String,
    pub name: String,
    pub logo: String,
    pub bg_color: String,
    pub color: String,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl StoreRow {
    /// The key this store is published under in the document.
    #[must_use]
    pub fn document_key(&self) -> String {
        self.slug.clone().unwrap_or_else(|| self.id.to_string())
    }
}

impl From<StoreRow> for StoreSummary {
    fn from(row: StoreRow) -> Self {
        Self {
            id: row.id,
            key: row.document_key(),
            name: row.name,
            logo: row.logo,
            bg_color: row.bg_color,
            color: row.color,
            active: row.active != 0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
