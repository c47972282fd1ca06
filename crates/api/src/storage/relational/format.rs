//! Relational rows to nested document shapes.
//!
//! Pure functions; no database access.

use std::collections::BTreeMap;

use stores_deals_core::{
    DealDocument, FooterLinkDocument, FooterLinkMap, StoreDocument, StoreId, StoreMap,
};

use super::rows::{CategoryRow, DealRow, LinkRow, StoreRow};

/// Join stores with their deals, keyed by document key.
///
/// The key is the slug a store was saved under, or its id for stores that
/// never had one.
/// Each store gets the deals whose `store_id` matches, in input order. Deals
/// whose store is not among `stores` (for example because it was filtered
/// out as inactive) are dropped.
#[must_use]
pub fn format_stores(stores: &[StoreRow], deals: &[DealRow]) -> StoreMap {
    let mut by_id: BTreeMap<StoreId, (String, StoreDocument)> = stores
        .iter()
        .map(|row| (row.id, (row.document_key(), store_document(row))))
        .collect();

    for deal in deals {
        if let Some((_, store)) = by_id.get_mut(&deal.store_id) {
            store.deals.push(deal_document(deal));
        }
    }

    by_id.into_values().collect()
}

/// Group links under their category name.
///
/// Every category appears, even without links. Links referencing an unknown
/// category are dropped.
#[must_use]
pub fn format_footer_links(categories: &[CategoryRow], links: &[LinkRow]) -> FooterLinkMap {
    let mut formatted: FooterLinkMap = categories
        .iter()
        .map(|category| (category.name.clone(), Vec::new()))
        .collect();

    for link in links {
        let Some(category) = categories.iter().find(|c| c.id == link.category_id) else {
            continue;
        };
        if let Some(entries) = formatted.get_mut(&category.name) {
            entries.push(link_document(link));
        }
    }

    formatted
}

/// A store row without its deals.
#[must_use]
pub fn store_document(row: &StoreRow) -> StoreDocument {
    StoreDocument {
        name: row.name.clone(),
        logo: normalize_logo_path(&row.logo),
        bg_color: row.bg_color.clone(),
        color: row.color.clone(),
        active: row.active != 0,
        deals: Vec::new(),
    }
}

#[must_use]
pub fn deal_document(row: &DealRow) -> DealDocument {
    DealDocument {
        id: row.id.to_string(),
        title: row.title.clone(),
        description: row.description.clone(),
        importance: row.importance,
        link: row.link.clone(),
        active: row.active != 0,
    }
}

#[must_use]
pub fn link_document(row: &LinkRow) -> FooterLinkDocument {
    FooterLinkDocument {
        id: row.id.to_string(),
        title: row.title.clone(),
        link: row.link.clone(),
        active: row.active != 0,
    }
}

/// Make a stored logo reference absolute.
///
/// `amazon.png` becomes `/assets/amazon.png`, `assets/amazon.png` becomes
/// `/assets/amazon.png`, and absolute paths or URLs pass through.
#[must_use]
pub fn normalize_logo_path(logo: &str) -> String {
    if logo.is_empty() || logo.starts_with('/') || logo.contains("://") {
        logo.to_string()
    } else if logo.contains("assets/") {
        format!("/{logo}")
    } else {
        format!("/assets/{logo}")
    }
}
