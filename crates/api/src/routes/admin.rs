//! Admin routes.
//!
//! The save route takes the whole edited document; there is no per-entity
//! update or delete. Entries disappear by being left out of a save.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use stores_deals_core::{NewStore, SavePayload};

use super::ApiJson;
use crate::error::{AppError, Result};
use crate::services::AdminAuth;
use crate::state::AppState;
use crate::storage::PutOutcome;

/// Warning returned when the local development store could not write a save.
pub const DISCARDED_SAVE_WARNING: &str =
    "Local storage is not writable; changes were not persisted";

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Persist the stores and/or footer links in the body.
#[instrument(skip(state, payload), fields(
    stores = payload.stores.as_ref().map(|s| s.len()),
    categories = payload.footer_links.as_ref().map(|f| f.len()),
))]
pub async fn save(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SavePayload>,
) -> Result<Json<Value>> {
    match state.storage().save(&payload).await? {
        PutOutcome::Persisted => {
            tracing::info!("Document saved");
            Ok(Json(json!({ "success": true })))
        }
        PutOutcome::Discarded => {
            tracing::warn!("Document save discarded by local storage");
            Ok(Json(json!({ "success": true, "warning": DISCARDED_SAVE_WARNING })))
        }
    }
}

/// List every store, active or not.
#[instrument(skip(state))]
pub async fn list_stores(State(state): State<AppState>) -> Result<Json<Value>> {
    let stores = state.storage().list_stores().await?;
    Ok(Json(json!({ "success": true, "stores": stores })))
}

/// One store with all its deals.
#[instrument(skip(state))]
pub async fn get_store(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let store = state
        .storage()
        .get_store(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store not found".to_string()))?;
    Ok(Json(json!({ "success": true, "store": store })))
}

/// Create a store with its deals.
#[instrument(skip(state, store), fields(name = %store.name))]
pub async fn create_store(
    State(state): State<AppState>,
    ApiJson(store): ApiJson<NewStore>,
) -> Result<Json<Value>> {
    let store_id = state.storage().create_store(store).await?;
    Ok(Json(json!({ "success": true, "storeId": store_id })))
}

/// Check admin credentials.
#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<LoginForm>,
) -> Result<Json<Value>> {
    let admin = AdminAuth::new(state.storage())
        .login(&form.username, &form.password)
        .await?;
    Ok(Json(json!({ "success": true, "admin": admin })))
}

/// Key-value setup happens offline.
pub async fn init_kv() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Use the `deals-cli migrate kv` command to initialize the KV store",
    }))
}

/// Schema setup happens offline.
pub async fn init_db() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Use the `deals-cli migrate relational` command to initialize the database",
    }))
}
