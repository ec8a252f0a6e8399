use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::monitor::{self, ScanRequest};
use crate::nav;
use crate::routes::errors;
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct ScanBody {
    #[serde(default)]
    pub fund_codes: Vec<String>,
    pub source: Option<String>,
    pub fee_rate: Option<Decimal>,
}

pub async fn scan(
    State(state): State<AppState>,
    body: Option<Json<ScanBody>>,
) -> axum::response::Response {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let source = match body.source.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(s) => match nav::normalize_source_name(s) {
            Some(v) => Some(v),
            None => return errors::bad_request(format!("未知的净值来源: {s}")),
        },
    };

    let req = ScanRequest {
        fund_codes: body.fund_codes,
        source,
        fee_rate: body.fee_rate,
    };
    match monitor::run_scan(&state, &req).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => errors::fetch_error_response(&state, "批量扫描失败", &e),
    }
}
