use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::monitor;
use crate::routes::errors;
use crate::state::AppState;

pub async fn clear_nav(State(state): State<AppState>) -> axum::response::Response {
    let removed = state.nav_cache().clear();
    tracing::info!(removed, "nav cache cleared");
    (StatusCode::OK, Json(json!({ "removed": removed }))).into_response()
}

pub async fn invalidate_nav(
    State(state): State<AppState>,
    Path(fund_code): Path<String>,
) -> axum::response::Response {
    match monitor::invalidate_nav(&state, &fund_code) {
        Ok(removed) => {
            tracing::info!(fund_code = %fund_code, removed, "nav cache invalidated");
            (
                StatusCode::OK,
                Json(json!({ "fund_code": fund_code.trim(), "removed": removed })),
            )
                .into_response()
        }
        Err(e) => errors::fetch_error_response(&state, "清除缓存失败", &e),
    }
}
