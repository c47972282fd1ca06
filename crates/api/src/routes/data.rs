//! Public data route.

use axum::{Json, extract::State};
use tracing::instrument;

use stores_deals_core::AggregateDocument;

use crate::error::Result;
use crate::state::AppState;

/// Serve the aggregate document the front end renders from.
#[instrument(skip(state), fields(backend = state.storage().name()))]
pub async fn get_data(State(state): State<AppState>) -> Result<Json<AggregateDocument>> {
    let document = state.storage().load_document().await?;
    Ok(Json(document))
}
