use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use std::fmt::Display;

use crate::error::FetchError;
use crate::state::AppState;

pub fn masked_message(state: &AppState, public_message: &'static str, err: impl Display) -> String {
    if state.config().debug() {
        format!("{public_message}: {err}")
    } else {
        public_message.to_string()
    }
}

pub fn bad_request(message: impl Into<String>) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message.into(), "kind": "invalid_input" })),
    )
        .into_response()
}

/// 参数错误 → 400（原样提示）；上游失败 → 502（非 debug 模式只给公开文案）。
pub fn fetch_error_response(
    state: &AppState,
    public_message: &'static str,
    err: &FetchError,
) -> axum::response::Response {
    if err.is_client_error() {
        tracing::info!(kind = err.kind(), error = %err, "rejected request");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": err.to_string(), "kind": err.kind() })),
        )
            .into_response();
    }

    tracing::error!(kind = err.kind(), error = %err, "upstream fetch failed");
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({
            "error": masked_message(state, public_message, err),
            "kind": err.kind(),
        })),
    )
        .into_response()
}

pub fn parse_decimal_param(
    name: &str,
    raw: Option<&str>,
) -> Result<Option<Decimal>, axum::response::Response> {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    s.parse::<Decimal>()
        .map(Some)
        .map_err(|_| bad_request(format!("{name} 不是有效数字: {s}")))
}

pub fn parse_date_param(
    name: &str,
    raw: Option<&str>,
) -> Result<Option<NaiveDate>, axum::response::Response> {
    let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| bad_request(format!("{name} 需要 YYYY-MM-DD 格式: {s}")))
}
