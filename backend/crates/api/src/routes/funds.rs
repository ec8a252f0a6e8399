use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::market;
use crate::monitor::{self, IopvRequest, NavSelection, NavView, PremiumRequest, PriceView};
use crate::nav;
use crate::routes::errors;
use crate::sina::QuoteMode;
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct QuoteQuery {
    pub mode: Option<String>,
}

pub async fn quote(
    State(state): State<AppState>,
    Path(fund_code): Path<String>,
    Query(q): Query<QuoteQuery>,
) -> axum::response::Response {
    let Some(mode) = QuoteMode::parse(q.mode.as_deref().unwrap_or("")) else {
        return errors::bad_request("mode 只支持 raw / batch");
    };
    let code = match market::parse_market_code(&fund_code) {
        Ok(c) => c,
        Err(e) => return errors::fetch_error_response(&state, "获取行情失败", &e),
    };

    match monitor::fetch_price(&state, &code, mode).await {
        Ok(price) => (StatusCode::OK, Json(PriceView::from(&price))).into_response(),
        Err(e) => errors::fetch_error_response(&state, "获取行情失败", &e),
    }
}

/// 净值来源相关的通用查询参数
#[derive(Debug, Deserialize, Default)]
pub struct NavQuery {
    pub source: Option<String>,
    pub nav: Option<String>,
    pub nav_date: Option<String>,
}

impl NavQuery {
    fn selection(&self) -> Result<NavSelection, axum::response::Response> {
        let source = match self.source.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => None,
            Some(s) => match nav::normalize_source_name(s) {
                Some(v) => Some(v),
                None => return Err(errors::bad_request(format!("未知的净值来源: {s}"))),
            },
        };
        Ok(NavSelection {
            source,
            manual_nav: errors::parse_decimal_param("nav", self.nav.as_deref())?,
            manual_date: errors::parse_date_param("nav_date", self.nav_date.as_deref())?,
        })
    }
}

pub async fn nav(
    State(state): State<AppState>,
    Path(fund_code): Path<String>,
    Query(q): Query<NavQuery>,
) -> axum::response::Response {
    let selection = match q.selection() {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match monitor::resolve_nav(&state, &fund_code, &selection).await {
        Ok(resolved) => (StatusCode::OK, Json(NavView::from(&resolved))).into_response(),
        Err(e) => errors::fetch_error_response(&state, "获取净值失败", &e),
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct PremiumQuery {
    #[serde(flatten)]
    pub nav: NavQuery,
    pub fee_rate: Option<String>,
}

pub async fn premium(
    State(state): State<AppState>,
    Path(fund_code): Path<String>,
    Query(q): Query<PremiumQuery>,
) -> axum::response::Response {
    let selection = match q.nav.selection() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let fee_rate = match errors::parse_decimal_param("fee_rate", q.fee_rate.as_deref()) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let req = PremiumRequest {
        fund_code,
        nav: selection,
        fee_rate,
    };
    match monitor::premium_report(&state, &req).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => errors::fetch_error_response(&state, "计算溢价失败", &e),
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct IopvQuery {
    #[serde(flatten)]
    pub nav: NavQuery,
    pub fee_rate: Option<String>,
    pub futures: Option<String>,
    /// 仓位百分比（0-100）
    pub position_ratio: Option<String>,
}

pub async fn iopv(
    State(state): State<AppState>,
    Path(fund_code): Path<String>,
    Query(q): Query<IopvQuery>,
) -> axum::response::Response {
    let selection = match q.nav.selection() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let fee_rate = match errors::parse_decimal_param("fee_rate", q.fee_rate.as_deref()) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let position_ratio =
        match errors::parse_decimal_param("position_ratio", q.position_ratio.as_deref()) {
            Ok(v) => v.map(|pct| pct / Decimal::ONE_HUNDRED),
            Err(resp) => return resp,
        };

    let req = IopvRequest {
        fund_code,
        nav: selection,
        futures_symbol: q.futures,
        position_ratio,
        fee_rate,
    };
    match monitor::iopv_report(&state, &req).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => errors::fetch_error_response(&state, "估算 IOPV 失败", &e),
    }
}
