//! Non-API paths.

use std::path::Path;

use axum::http::StatusCode;
use tower_http::services::ServeDir;

/// Body of `/` when no front end is bundled.
pub const WELCOME_TEXT: &str = "Welcome to stores.deals API. Web app is served separately.";

/// Serve the built front end from `dir`.
pub fn static_files(dir: &Path) -> ServeDir {
    tracing::info!(dir = %dir.display(), "Serving static files");
    ServeDir::new(dir)
}

pub async fn welcome() -> &'static str {
    WELCOME_TEXT
}

pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}
