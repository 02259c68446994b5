//! Cache maintenance handler

use super::CacheClearedResponse;
use crate::api::AppState;
use axum::{Json, extract::State};

/// DELETE /api/aggregate/cache - Drop every memoized aggregate
#[utoipa::path(
    delete,
    path = "/api/aggregate/cache",
    tag = "cache",
    responses(
        (status = 200, description = "Cache cleared", body = CacheClearedResponse)
    )
)]
pub async fn clear_cache(State(state): State<AppState>) -> Json<CacheClearedResponse> {
    let cleared = state.engine.cache().clear().await;
    tracing::info!(cleared, "Result cache cleared");
    Json(CacheClearedResponse { cleared })
}
