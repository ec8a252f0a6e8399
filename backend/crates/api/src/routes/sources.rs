use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::time::Instant;

use crate::error::FetchError;
use crate::market;
use crate::nav::{self, NavSource};
use crate::sina::{self, QuoteMode};
use crate::state::AppState;

/// 健康探测固定使用的基金代码
const PROBE_FUND_CODE: &str = "161226";

#[derive(Debug, Serialize)]
pub struct SourceItem {
    pub name: String,
    pub kind: &'static str,
}

pub async fn list() -> impl IntoResponse {
    let mut items: Vec<SourceItem> = nav::BUILTIN_SOURCES
        .iter()
        .map(|name| SourceItem {
            name: name.to_string(),
            kind: "nav",
        })
        .collect();
    items.push(SourceItem {
        name: "sina".to_string(),
        kind: "quote",
    });

    (StatusCode::OK, Json(items))
}

#[derive(Debug, Serialize)]
pub struct SourceHealthItem {
    pub name: String,
    pub ok: bool,
    pub latency_ms: Option<u128>,
    pub error: Option<String>,
}

fn health_item(name: &str, start: Instant, check: Result<(), FetchError>) -> SourceHealthItem {
    let latency_ms = Some(start.elapsed().as_millis());
    match check {
        Ok(()) => SourceHealthItem {
            name: name.to_string(),
            ok: true,
            latency_ms,
            error: None,
        },
        Err(e) => SourceHealthItem {
            name: name.to_string(),
            ok: false,
            latency_ms,
            error: Some(e.to_string()),
        },
    }
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    // 只做上游连通性 + 可解析性探测，不走 NAV 缓存。
    let names = ["sina", nav::SOURCE_HISTORY, nav::SOURCE_JSONP];

    if !state.config().get_bool("sources_health_probe", true) {
        let result: Vec<SourceHealthItem> = names
            .iter()
            .map(|name| SourceHealthItem {
                name: name.to_string(),
                ok: false,
                latency_ms: None,
                error: Some("健康探测已禁用".to_string()),
            })
            .collect();
        return (StatusCode::OK, Json(result));
    }

    let endpoints = state.config().nav_endpoints();
    let mut result: Vec<SourceHealthItem> = Vec::with_capacity(names.len());

    let start = Instant::now();
    let check = async {
        let code = market::parse_market_code(PROBE_FUND_CODE)?;
        sina::fetch_fund_quote(
            state.client(),
            &state.config().sina_base_url(),
            &code,
            QuoteMode::Raw,
        )
        .await
        .map(|_| ())
    }
    .await;
    result.push(health_item("sina", start, check));

    for source in [NavSource::History, NavSource::Jsonp] {
        let start = Instant::now();
        let check = nav::fetch_nav(state.client(), &endpoints, source, PROBE_FUND_CODE)
            .await
            .map(|_| ());
        result.push(health_item(source.as_str(), start, check));
    }

    (StatusCode::OK, Json(result))
}
