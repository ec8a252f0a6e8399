use std::net::SocketAddr;

use api::{app, state::AppState};
use axum::http::HeaderValue;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 初始化配置（文件 + env 覆盖）
    let config = api::config::ConfigStore::load();
    if let Some(path) = config.path() {
        tracing::info!(path = %path.display(), "config loaded");
    }

    let client = match api::eastmoney::build_client(config.http_timeout_secs()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "failed to build http client");
            std::process::exit(1);
        }
    };

    let port = config.port();
    let state = AppState::new(config, client);

    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_headers(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any);

    let app = app(state).layer(TraceLayer::new_for_http()).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "lof premium monitor listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind listener");
    axum::serve(listener, app).await.expect("serve");
}
