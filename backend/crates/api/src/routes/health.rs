use axum::{Json, http::StatusCode, response::IntoResponse};

use crate::state::{AppState, HealthResponse};

pub async fn health(state: axum::extract::State<AppState>) -> impl IntoResponse {
    let body = HealthResponse {
        status: "ok",
        nav_cache_entries: state.nav_cache().len(),
        nav_cache_ttl_secs: state.nav_cache().ttl().num_seconds(),
    };

    (StatusCode::OK, Json(body))
}
