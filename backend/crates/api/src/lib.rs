pub mod advisory;
pub mod cache;
pub mod config;
pub mod eastmoney;
pub mod error;
pub mod market;
pub mod monitor;
pub mod nav;
pub mod premium;
pub mod routes;
pub mod sina;
pub mod state;

use axum::Router;

pub fn app(state: state::AppState) -> Router {
    Router::new()
        .merge(routes::router())
        .with_state(state)
}
