//! Whole-document save orchestration.
//!
//! Both backends persist a [`SavePayload`] through the same sequence:
//! upsert each store, replace its deals, replace the links of each footer
//! category, then commit. Any failure rolls the writer back and the original
//! error is returned.

use std::future::Future;

use stores_deals_core::{DealDocument, FooterLinkDocument, SavePayload, StoreDocument};

use super::{PutOutcome, StorageError};

/// Backend-specific sink driven by [`save_document`].
pub trait SaveWriter: Send {
    /// How the writer refers to a store after upserting it.
    type StoreHandle: Send + Sync;

    /// Update the store stored under `key`, or create it.
    ///
    /// Deals on `store` are ignored here; they are written by [`Self::replace_deals`].
    fn upsert_store(
        &mut self,
        key: &str,
        store: &StoreDocument,
    ) -> impl Future<Output = Result<Self::StoreHandle, StorageError>> + Send;

    /// Delete every deal of the store and insert `deals` in order.
    fn replace_deals(
        &mut self,
        store: &Self::StoreHandle,
        deals: &[DealDocument],
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Delete every link of the category and insert `links` in order.
    fn replace_links(
        &mut self,
        category: &str,
        links: &[FooterLinkDocument],
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Make every staged change visible.
    ///
    /// Only the local development store may report `PutOutcome::Discarded`.
    fn commit(self) -> impl Future<Output = Result<PutOutcome, StorageError>> + Send;

    /// Discard every staged change.
    fn rollback(self) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Apply `payload` through `writer` with all-or-nothing semantics.
///
/// Collections absent from the payload are not touched.
///
/// # Errors
///
/// Returns the first error raised while applying the payload (after rolling
/// back), or the commit error.
pub async fn save_document<W: SaveWriter>(
    mut writer: W,
    payload: &SavePayload,
) -> Result<PutOutcome, StorageError> {
    match apply(&mut writer, payload).await {
        Ok(()) => writer.commit().await,
        Err(err) => {
            tracing::warn!(error = %err, "Save failed, rolling back");
            if let Err(rollback_err) = writer.rollback().await {
                tracing::error!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

async fn apply<W: SaveWriter>(writer: &mut W, payload: &SavePayload) -> Result<(), StorageError> {
    if let Some(stores) = &payload.stores {
        for (key, store) in stores {
            let handle = writer.upsert_store(key, store).await?;
            writer.replace_deals(&handle, &store.deals).await?;
        }
    }

    if let Some(footer_links) = &payload.footer_links {
        for (category, links) in footer_links {
            writer.replace_links(category, links).await?;
        }
    }

    Ok(())
}
