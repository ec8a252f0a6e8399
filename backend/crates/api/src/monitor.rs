//! 一次"查询"的完整流程：抓价 → 取净值 → 计算 → 给出提示。

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::advisory::{self, Advisory};
use crate::error::FetchError;
use crate::market::{self, MarketCode};
use crate::nav::{self, NavRecord, NavSource};
use crate::premium::{self, PremiumQuote, display_nav, display_price, display_rate};
use crate::sina::{self, PriceRecord, QuoteMode, TradingStatus};
use crate::state::AppState;

#[derive(Debug, Clone, Default)]
pub struct NavSelection {
    /// `None` 时：给了手工净值就是 manual，否则走配置的默认来源
    pub source: Option<NavSource>,
    pub manual_nav: Option<Decimal>,
    pub manual_date: Option<NaiveDate>,
}

impl NavSelection {
    pub fn manual(nav: Decimal) -> Self {
        Self {
            source: Some(NavSource::Manual),
            manual_nav: Some(nav),
            manual_date: None,
        }
    }

    pub fn source(source: NavSource) -> Self {
        Self {
            source: Some(source),
            ..Self::default()
        }
    }

    fn effective_source(&self, default: NavSource) -> NavSource {
        match (self.source, self.manual_nav) {
            (Some(s), _) => s,
            (None, Some(_)) => NavSource::Manual,
            (None, None) => default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedNav {
    pub record: NavRecord,
    pub from_cache: bool,
}

pub async fn resolve_nav(
    state: &AppState,
    fund_code: &str,
    selection: &NavSelection,
) -> Result<ResolvedNav, FetchError> {
    let code = market::bare_fund_code(fund_code)?;
    let source = selection.effective_source(state.config().default_nav_source());

    if source == NavSource::Manual {
        let nav = selection
            .manual_nav
            .ok_or_else(|| FetchError::InvalidInput("manual 来源需要提供 nav".to_string()))?;
        let record = NavRecord::manual(&code, nav, selection.manual_date)
            .map_err(|_| FetchError::InvalidInput("nav 必须大于 0".to_string()))?;
        return Ok(ResolvedNav {
            record,
            from_cache: false,
        });
    }

    let key = (source, code.clone());
    if let Some(record) = state.nav_cache().get(&key) {
        tracing::debug!(fund_code = %code, source = source.as_str(), "nav cache hit");
        return Ok(ResolvedNav {
            record,
            from_cache: true,
        });
    }
    tracing::debug!(fund_code = %code, source = source.as_str(), "nav cache miss");

    let endpoints = state.config().nav_endpoints();
    let record = nav::fetch_nav(state.client(), &endpoints, source, &code).await?;
    state.nav_cache().insert(key, record.clone());

    Ok(ResolvedNav {
        record,
        from_cache: false,
    })
}

/// 同一基金所有来源的缓存一起失效。
pub fn invalidate_nav(state: &AppState, fund_code: &str) -> Result<usize, FetchError> {
    let code = market::bare_fund_code(fund_code)?;
    Ok(state.nav_cache().invalidate_where(|(_, c)| *c == code))
}

pub async fn fetch_price(
    state: &AppState,
    code: &MarketCode,
    mode: QuoteMode,
) -> Result<PriceRecord, FetchError> {
    sina::fetch_fund_quote(state.client(), &state.config().sina_base_url(), code, mode).await
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceView {
    pub fund_code: String,
    pub name: String,
    pub price: String,
    pub prev_close: String,
    pub status: TradingStatus,
}

impl From<&PriceRecord> for PriceView {
    fn from(p: &PriceRecord) -> Self {
        Self {
            fund_code: p.fund_code.clone(),
            name: p.name.clone(),
            price: display_price(p.price),
            prev_close: display_price(p.prev_close),
            status: p.status,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NavView {
    pub fund_code: String,
    pub nav: String,
    pub nav_date: Option<String>,
    pub source: NavSource,
    pub from_cache: bool,
}

impl From<&ResolvedNav> for NavView {
    fn from(r: &ResolvedNav) -> Self {
        Self {
            fund_code: r.record.fund_code.clone(),
            nav: display_nav(r.record.nav),
            nav_date: r.record.nav_date.map(|d| d.to_string()),
            source: r.record.source,
            from_cache: r.from_cache,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PremiumView {
    pub fee_rate: String,
    pub premium_rate: String,
    pub arbitrage_space: String,
    pub advisory: Advisory,
    pub message: String,
}

fn premium_view(state: &AppState, quote: &PremiumQuote, fee_rate: Decimal) -> PremiumView {
    let advisory = advisory::classify(quote, &state.config().alert_thresholds());
    PremiumView {
        fee_rate: display_rate(fee_rate),
        premium_rate: display_rate(quote.premium_rate),
        arbitrage_space: display_rate(quote.arbitrage_space),
        advisory,
        message: advisory::message(advisory, quote),
    }
}

#[derive(Debug, Clone)]
pub struct PremiumRequest {
    pub fund_code: String,
    pub nav: NavSelection,
    pub fee_rate: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PremiumReport {
    pub quote: PriceView,
    pub nav: NavView,
    #[serde(flatten)]
    pub premium: PremiumView,
}

/// 净值已保证为正，计算返回 `None` 只代表数值溢出。
fn out_of_range() -> FetchError {
    FetchError::InvalidInput("数值超出可计算范围".to_string())
}

pub async fn premium_report(
    state: &AppState,
    req: &PremiumRequest,
) -> Result<PremiumReport, FetchError> {
    let code = market::parse_market_code(&req.fund_code)?;
    let fee_rate = req.fee_rate.unwrap_or_else(|| state.config().fee_rate());

    // 先处理净值：手工净值参数错误不依赖行情是否可用
    let nav = resolve_nav(state, &req.fund_code, &req.nav).await?;
    let price = fetch_price(state, &code, QuoteMode::Raw).await?;
    let quote =
        premium::evaluate(price.price, nav.record.nav, fee_rate).ok_or_else(out_of_range)?;

    Ok(PremiumReport {
        quote: PriceView::from(&price),
        nav: NavView::from(&nav),
        premium: premium_view(state, &quote, fee_rate),
    })
}

#[derive(Debug, Clone)]
pub struct IopvRequest {
    pub fund_code: String,
    pub nav: NavSelection,
    pub futures_symbol: Option<String>,
    /// 比例（0.9 表示 90% 仓位），会被夹到配置区间内
    pub position_ratio: Option<Decimal>,
    pub fee_rate: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FuturesView {
    pub symbol: String,
    pub name: String,
    pub current: String,
    pub settle: String,
    pub change_pct: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IopvReport {
    pub quote: PriceView,
    pub nav: NavView,
    pub futures: FuturesView,
    pub position_ratio: String,
    pub estimated_nav: String,
    /// 相对昨日官方净值的静态溢价率
    pub static_premium_rate: Option<String>,
    #[serde(flatten)]
    pub premium: PremiumView,
}

pub async fn iopv_report(state: &AppState, req: &IopvRequest) -> Result<IopvReport, FetchError> {
    let code = market::parse_market_code(&req.fund_code)?;
    let config = state.config();
    let fee_rate = req.fee_rate.unwrap_or_else(|| config.fee_rate());
    let symbol = req
        .futures_symbol
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| config.default_futures_symbol());
    let ratio = premium::clamp_position_ratio(
        req.position_ratio
            .unwrap_or_else(|| config.default_position_ratio()),
        config.position_range(),
    );

    let nav = resolve_nav(state, &req.fund_code, &req.nav).await?;
    let price = fetch_price(state, &code, QuoteMode::Raw).await?;
    let futures =
        sina::fetch_futures_quote(state.client(), &config.sina_base_url(), &symbol).await?;

    if futures.settle.is_zero() {
        return Err(FetchError::MissingField("futures_settle"));
    }
    let change_pct = premium::futures_change_pct(futures.current, futures.settle)
        .ok_or_else(out_of_range)?;
    let estimated_nav =
        premium::estimate_nav(nav.record.nav, change_pct, ratio).ok_or_else(out_of_range)?;
    let quote = premium::evaluate(price.price, estimated_nav, fee_rate).ok_or_else(out_of_range)?;
    let static_premium_rate = premium::premium_rate(price.price, nav.record.nav).map(display_rate);

    tracing::info!(
        fund_code = %code,
        futures = %futures.symbol,
        change_pct = %change_pct.round_dp(4),
        estimated_nav = %estimated_nav.round_dp(4),
        "iopv estimated"
    );

    Ok(IopvReport {
        quote: PriceView::from(&price),
        nav: NavView::from(&nav),
        futures: FuturesView {
            symbol: futures.symbol,
            name: futures.name,
            current: futures.current.normalize().to_string(),
            settle: futures.settle.normalize().to_string(),
            change_pct: display_rate(change_pct),
        },
        position_ratio: display_rate(ratio),
        estimated_nav: display_nav(estimated_nav),
        static_premium_rate,
        premium: premium_view(state, &quote, fee_rate),
    })
}

#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// 空表示扫描配置里的 watchlist
    pub fund_codes: Vec<String>,
    pub source: Option<NavSource>,
    pub fee_rate: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanRow {
    pub fund_code: String,
    pub name: String,
    pub price: Option<String>,
    pub status: TradingStatus,
    pub nav: Option<String>,
    pub nav_date: Option<String>,
    pub premium_rate: Option<String>,
    pub arbitrage_space: Option<String>,
    pub advisory: Option<Advisory>,
    pub error: Option<String>,
    #[serde(skip)]
    sort_key: Option<Decimal>,
}

impl ScanRow {
    /// 行情未取到之前状态为 `Error`，取到后以行情状态为准。
    fn pending(fund_code: &str) -> Self {
        Self {
            fund_code: fund_code.trim().to_string(),
            name: String::new(),
            price: None,
            status: TradingStatus::Error,
            nav: None,
            nav_date: None,
            premium_rate: None,
            arbitrage_space: None,
            advisory: None,
            error: None,
            sort_key: None,
        }
    }

    fn failed(mut self, err: &FetchError) -> Self {
        tracing::warn!(fund_code = %self.fund_code, error = %err, "scan item failed");
        self.error = Some(err.to_string());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub source: NavSource,
    pub fee_rate: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub rows: Vec<ScanRow>,
}

async fn scan_one(state: &AppState, input: &str, source: NavSource, fee_rate: Decimal) -> ScanRow {
    let row = ScanRow::pending(input);
    let code = match market::parse_market_code(input) {
        Ok(c) => c,
        Err(e) => return row.failed(&e),
    };
    let mut row = ScanRow {
        fund_code: code.symbol(),
        ..row
    };

    let price = match fetch_price(state, &code, QuoteMode::Batch).await {
        Ok(p) => p,
        Err(e) => return row.failed(&e),
    };
    row.name = price.name.clone();
    row.price = Some(display_price(price.price));
    row.status = price.status;

    let nav = match resolve_nav(state, &code.code, &NavSelection::source(source)).await {
        Ok(n) => n,
        Err(e) => return row.failed(&e),
    };
    row.nav = Some(display_nav(nav.record.nav));
    row.nav_date = nav.record.nav_date.map(|d| d.to_string());

    let Some(quote) = premium::evaluate(price.price, nav.record.nav, fee_rate) else {
        return row.failed(&out_of_range());
    };
    row.premium_rate = Some(display_rate(quote.premium_rate));
    row.arbitrage_space = Some(display_rate(quote.arbitrage_space));
    row.advisory = Some(advisory::classify(
        &quote,
        &state.config().alert_thresholds(),
    ));
    row.sort_key = Some(quote.premium_rate);
    row
}

/// 逐只顺序扫描（不并发）；单只失败只影响该行。
pub async fn run_scan(state: &AppState, req: &ScanRequest) -> Result<ScanReport, FetchError> {
    let source = req
        .source
        .unwrap_or_else(|| state.config().default_nav_source());
    if source == NavSource::Manual {
        return Err(FetchError::InvalidInput(
            "批量扫描不支持 manual 净值来源".to_string(),
        ));
    }
    let fee_rate = req.fee_rate.unwrap_or_else(|| state.config().fee_rate());

    let codes: Vec<String> = if req.fund_codes.is_empty() {
        state.config().watchlist()
    } else {
        req.fund_codes
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    };
    if codes.is_empty() {
        return Err(FetchError::InvalidInput("基金列表为空".to_string()));
    }

    let total = codes.len();
    let mut rows: Vec<ScanRow> = Vec::with_capacity(total);
    for (i, code) in codes.iter().enumerate() {
        tracing::info!(index = i + 1, total, fund_code = %code, "scan progress");
        rows.push(scan_one(state, code, source, fee_rate).await);
    }

    // 溢价率从高到低，失败行排在最后（稳定排序保持原顺序）
    rows.sort_by(|a, b| match (a.sort_key, b.sort_key) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let failed = rows.iter().filter(|r| r.error.is_some()).count();
    Ok(ScanReport {
        source,
        fee_rate: display_rate(fee_rate),
        total,
        succeeded: total - failed,
        failed,
        rows,
    })
}
