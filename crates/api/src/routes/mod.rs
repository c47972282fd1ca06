//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /api/data                - Aggregate document (stores, footer links, admins)
//!
//! # Admin
//! POST /api/admin/save          - Persist edited stores and/or footer links
//! GET  /api/admin/stores        - List stores
//! POST /api/admin/stores        - Create a store
//! GET  /api/admin/stores/{id}   - One store with all its deals
//! POST /api/admin/login         - Check admin credentials
//! POST /api/admin/init-kv       - Points at `deals-cli migrate kv`
//! POST /api/admin/init-db       - Points at `deals-cli migrate relational`
//!
//! # Everything else
//! /api/*                        - 404 JSON envelope
//! /*                            - Static front end, or a plain-text welcome
//! ```

pub mod admin;
pub mod data;
pub mod site;

use axum::{
    Router,
    extract::FromRequest,
    routing::{get, post},
};

use crate::error::AppError;
use crate::state::AppState;

/// JSON body extractor whose rejection is the API error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Create the admin routes router.
///
/// Every route falls back to the API 404 for unsupported methods.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/save", post(admin::save).fallback(api_not_found))
        .route(
            "/stores",
            get(admin::list_stores)
                .post(admin::create_store)
                .fallback(api_not_found),
        )
        .route(
            "/stores/{id}",
            get(admin::get_store).fallback(api_not_found),
        )
        .route("/login", post(admin::login).fallback(api_not_found))
        .route("/init-kv", post(admin::init_kv).fallback(api_not_found))
        .route("/init-db", post(admin::init_db).fallback(api_not_found))
}

/// Create the `/api` router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/data", get(data::get_data).fallback(api_not_found))
        .nest("/admin", admin_routes())
        .fallback(api_not_found)
}

/// Create all routes: the API plus the non-API fallback.
pub fn routes(state: &AppState) -> Router<AppState> {
    let router = Router::new().nest("/api", api_routes());

    match &state.config().static_dir {
        Some(dir) => router.fallback_service(site::static_files(dir)),
        None => router
            .route("/", get(site::welcome))
            .fallback(site::not_found),
    }
}

/// Fallback for unknown API paths and unsupported methods.
async fn api_not_found() -> AppError {
    AppError::NotFound("API endpoint not found".to_string())
}
