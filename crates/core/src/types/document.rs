//! Aggregate document shapes exchanged with the front end.
//!
//! Field names are camelCase on the wire (`bgColor`, `footerLinks`). Incoming
//! documents are lenient: missing text fields default to empty strings, a
//! missing importance defaults to `medium`, and a missing `active` flag is
//! `false`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::status::{AdminRole, Importance};

/// Stores keyed by their document key.
pub type StoreMap = BTreeMap<String, StoreDocument>;

/// Footer links grouped by category name.
pub type FooterLinkMap = BTreeMap<String, Vec<FooterLinkDocument>>;

/// A store and its ordered deals.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub logo: String,
    /// Background gradient style token.
    #[serde(default)]
    pub bg_color: String,
    /// Accent color style token.
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub deals: Vec<DealDocument>,
}

/// A single deal belonging to a store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DealDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub importance: Importance,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub active: bool,
}

/// A footer link inside a named category.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FooterLinkDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub active: bool,
}

/// Public view of an admin account. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminDocument {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub role: AdminRole,
}

/// The combined document served by `GET /api/data`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateDocument {
    #[serde(default)]
    pub stores: StoreMap,
    #[serde(default)]
    pub footer_links: FooterLinkMap,
    #[serde(default)]
    pub admins: Vec<AdminDocument>,
}

/// Body of `POST /api/admin/save`.
///
/// Each collection is optional; a collection that is absent (or `null`) is
/// left untouched by the save.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    #[serde(default)]
    pub stores: Option<StoreMap>,
    #[serde(default)]
    pub footer_links: Option<FooterLinkMap>,
}

/// Body of `POST /api/admin/stores`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStore {
    pub name: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub bg_color: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub deals: Vec<DealDocument>,
}

impl From<NewStore> for StoreDocument {
    fn from(store: NewStore) -> Self {
        Self {
            name: store.name,
            logo: store.logo,
            bg_color: store.bg_color,
            color: store.color,
            active: store.active,
            deals: store.deals,
        }
    }
}

/// A single store as returned by `GET /api/admin/stores/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDetail {
    pub id: String,
    #[serde(flatten)]
    pub store: StoreDocument,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_store_document_uses_camel_case() {
        let store = StoreDocument {
            name: "Temu".to_string(),
            bg_color: "from-orange-500 to-orange-600".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&store).unwrap();
        assert_eq!(value["bgColor"], "from-orange-500 to-orange-600");
        assert!(value.get("bg_color").is_none());
    }

    #[test]
    fn test_deal_defaults_are_lenient() {
        let deal: DealDocument = serde_json::from_value(json!({ "title": "Flash Deal" })).unwrap();
        assert_eq!(deal.title, "Flash Deal");
        assert_eq!(deal.importance, Importance::Medium);
        assert!(deal.description.is_empty());
        assert!(!deal.active);
    }

    #[test]
    fn test_save_payload_null_collections_are_absent() {
        let payload: SavePayload =
            serde_json::from_value(json!({ "stores": {}, "footerLinks": null })).unwrap();
        assert_eq!(payload.stores, Some(StoreMap::new()));
        assert_eq!(payload.footer_links, None);
    }

    #[test]
    fn test_admin_document_ignores_password_field() {
        let admin: AdminDocument = serde_json::from_value(json!({
            "id": "1",
            "username": "root",
            "password": "hunter2",
            "role": "super_admin"
        }))
        .unwrap();
        assert_eq!(admin.role, AdminRole::SuperAdmin);
        let value = serde_json::to_value(&admin).unwrap();
        assert!(value.get("password").is_none());
    }

    #[test]
    fn test_store_detail_flattens_document() {
        let detail = StoreDetail {
            id: "amazon".to_string(),
            store: StoreDocument {
                name: "Amazon".to_string(),
                ..Default::default()
            },
        };
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["id"], "amazon");
        assert_eq!(value["name"], "Amazon");
        assert!(value["deals"].as_array().unwrap().is_empty());
    }
}
