#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use api::cache::Clock;
use api::config::ConfigStore;
use api::state::AppState;

pub type Hits = Arc<Mutex<HashMap<String, usize>>>;

pub struct MockUpstream {
    pub base_url: String,
    pub hits: Hits,
}

impl MockUpstream {
    pub fn hits(&self, path: &str) -> usize {
        self.hits
            .lock()
            .expect("hits lock")
            .get(path)
            .copied()
            .unwrap_or_default()
    }
}

fn record(hits: &Hits, path: String) {
    *hits.lock().expect("hits lock").entry(path).or_default() += 1;
}

fn text(body: &str) -> Response {
    (StatusCode::OK, body.to_string()).into_response()
}

async fn sina_quote(State(hits): State<Hits>, Path(segment): Path<String>) -> Response {
    record(&hits, format!("/{segment}"));
    let symbol = segment.trim_start_matches("list=");
    match symbol {
        "sz161226" => text(
            "var hq_str_sz161226=\"国投白银LOF,1.000,0.990,1.010,1.020,0.985,1.009,1.010,123456\";\n",
        ),
        "sh501018" => text(
            "var hq_str_sh501018=\"南方原油LOF,0.000,0.966,0.000,0.000,0.000,0.000,0.000,0\";\n",
        ),
        "sz160723" => text(
            "var hq_str_sz160723=\"嘉实原油LOF,0.800,0.790,0.800,0.810,0.780,0.799,0.800,1000\";\n",
        ),
        "nf_SC0" => text(
            "var hq_str_nf_SC0=\"原油连续,150000,104.0,106.0,103.5,0,104.9,105.1,105.0,100.5,98.0,100.0,5,6\";\n",
        ),
        "nf_ZERO" => text(
            "var hq_str_nf_ZERO=\"零结算,150000,0,0,0,0,0,0,105.0,0,0,0,0,0\";\n",
        ),
        other => text(&format!("var hq_str_{other}=\"\";\n")),
    }
}

async fn fundgz(State(hits): State<Hits>, Path(file): Path<String>) -> Response {
    record(&hits, format!("/js/{file}"));
    match file.as_str() {
        "161226.js" => text(
            r#"jsonpgz({"fundcode":"161226","name":"国投瑞银白银期货(LOF)A","jzrq":"2026-02-12","dwjz":"1.0000","gsz":"1.0123","gszzl":"1.23","gztime":"2026-02-13 15:00"});"#,
        ),
        "501018.js" => text(
            r#"jsonpgz({"fundcode":"501018","name":"南方原油(QDII-FOF-LOF)A","jzrq":"2026-02-12","dwjz":"0.9660","gsz":"","gszzl":"","gztime":""});"#,
        ),
        "164701.js" => text(
            r#"jsonpgz({"fundcode":"164701","name":"汇添富黄金及贵金属(QDII-LOF-FOF)A","jzrq":"2026-02-12","dwjz":"","gsz":"","gszzl":"","gztime":""});"#,
        ),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn pingzhong(State(hits): State<Hits>, Path(file): Path<String>) -> Response {
    record(&hits, format!("/pingzhongdata/{file}"));
    match file.as_str() {
        // 2026-02-12 / 2026-02-13 00:00 +08:00
        "161226.js" => text(
            r#"/*fund*/var fS_name = "国投瑞银白银期货(LOF)A";var Data_netWorthTrend = [{"x":1770825600000,"y":0.9880,"equityReturn":-0.5,"unitMoney":""},{"x":1770912000000,"y":1.0,"equityReturn":1.21,"unitMoney":""}];/*累计净值走势*/var Data_ACWorthTrend = [[1770825600000,2.1],[1770912000000,2.2]];"#,
        ),
        "501018.js" => text("var fS_name = \"南方原油\";var Data_grandTotal = [];"),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn spawn_upstream() -> MockUpstream {
    let hits: Hits = Arc::new(Mutex::new(HashMap::new()));
    let app = Router::new()
        .route("/{quote}", get(sina_quote))
        .route("/js/{file}", get(fundgz))
        .route("/pingzhongdata/{file}", get(pingzhong))
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    MockUpstream {
        base_url: format!("http://{addr}"),
        hits,
    }
}

pub fn config_for(upstream: &MockUpstream) -> ConfigStore {
    let config = ConfigStore::in_memory();
    config.set_string("sina_base_url", Some(upstream.base_url.clone()));
    config.set_string("fundgz_base_url", Some(upstream.base_url.clone()));
    config.set_string("pingzhong_base_url", Some(upstream.base_url.clone()));
    config
}

pub fn state_for(upstream: &MockUpstream) -> AppState {
    AppState::new(config_for(upstream), reqwest::Client::new())
}

pub fn state_with_clock(upstream: &MockUpstream, clock: Arc<dyn Clock>) -> AppState {
    AppState::with_clock(config_for(upstream), reqwest::Client::new(), clock)
}

pub async fn body_json(res: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json")
}
