use axum::Router;

use crate::state::AppState;

pub mod cache;
pub mod errors;
pub mod funds;
pub mod health;
pub mod scan;
pub mod sources;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", axum::routing::get(health::health))
        .route("/api/sources", axum::routing::get(sources::list))
        .route("/api/sources/health", axum::routing::get(sources::health))
        .route(
            "/api/funds/{fund_code}/quote",
            axum::routing::get(funds::quote),
        )
        .route("/api/funds/{fund_code}/nav", axum::routing::get(funds::nav))
        .route(
            "/api/funds/{fund_code}/premium",
            axum::routing::get(funds::premium),
        )
        .route(
            "/api/funds/{fund_code}/iopv",
            axum::routing::get(funds::iopv),
        )
        .route("/api/scan", axum::routing::post(scan::scan))
        .route("/api/cache/nav", axum::routing::delete(cache::clear_nav))
        .route(
            "/api/cache/nav/{fund_code}",
            axum::routing::delete(cache::invalidate_nav),
        )
}
