use reqwest::header::REFERER;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::FetchError;
use crate::market::MarketCode;

pub const SINA_REFERER: &str = "http://finance.sina.com.cn";

const FIELD_NAME: usize = 0;
const FIELD_PREV_CLOSE: usize = 2;
const FIELD_PRICE: usize = 3;
const FIELD_FUTURES_CURRENT: usize = 8;
const FIELD_FUTURES_SETTLE: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TradingStatus {
    Trading,
    /// 现价为 0：尚未开盘或当日无成交。
    NoTrade,
    /// 行情抓取失败（仅出现在批量扫描结果中）
    Error,
}

/// 现价为 0 时的处理口径。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuoteMode {
    /// 原样返回现价（单基金查询）。
    #[default]
    Raw,
    /// 用昨收替代 0 价并标记 `NoTrade`（批量扫描）。
    Batch,
}

impl QuoteMode {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "" | "raw" => Some(QuoteMode::Raw),
            "batch" | "scan" => Some(QuoteMode::Batch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub fund_code: String,
    pub name: String,
    pub price: Decimal,
    pub prev_close: Decimal,
    pub status: TradingStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuturesQuote {
    pub symbol: String,
    pub name: String,
    pub current: Decimal,
    pub settle: Decimal,
}

pub fn quote_url(base_url: &str, symbol: &str) -> String {
    format!("{}/list={symbol}", base_url.trim_end_matches('/'))
}

/// 取出 `var hq_str_xxx="a,b,c";` 中引号内的逗号分隔字段。
pub fn extract_quote_fields(text: &str) -> Result<Vec<&str>, FetchError> {
    let start = text
        .find("=\"")
        .ok_or_else(|| FetchError::malformed("缺少 =\" 分隔符"))?
        + 2;
    let tail = &text[start..];
    let end = tail
        .find('"')
        .ok_or_else(|| FetchError::malformed("行情字符串未闭合"))?;
    let payload = tail[..end].trim();
    if payload.is_empty() {
        return Err(FetchError::malformed("行情为空，代码可能不存在"));
    }
    Ok(payload.split(',').map(str::trim).collect())
}

fn decimal_field(fields: &[&str], idx: usize, name: &'static str) -> Result<Decimal, FetchError> {
    let raw = fields.get(idx).copied().unwrap_or("");
    if raw.is_empty() {
        return Err(FetchError::MissingField(name));
    }
    Decimal::from_str_exact(raw).map_err(|e| FetchError::malformed(format!("{name} 解析失败: {e}")))
}

pub fn parse_fund_quote(
    fund_code: &str,
    text: &str,
    mode: QuoteMode,
) -> Result<PriceRecord, FetchError> {
    let fields = extract_quote_fields(text)?;
    if fields.len() <= FIELD_PRICE {
        return Err(FetchError::malformed(format!(
            "行情字段不足: {} 个",
            fields.len()
        )));
    }

    let name = fields[FIELD_NAME].to_string();
    let prev_close = decimal_field(&fields, FIELD_PREV_CLOSE, "prev_close")?;
    let raw_price = decimal_field(&fields, FIELD_PRICE, "price")?;

    let (price, status) = match (raw_price.is_zero(), mode) {
        (false, _) => (raw_price, TradingStatus::Trading),
        (true, QuoteMode::Batch) => (prev_close, TradingStatus::NoTrade),
        (true, QuoteMode::Raw) => (raw_price, TradingStatus::NoTrade),
    };

    Ok(PriceRecord {
        fund_code: fund_code.to_string(),
        name,
        price,
        prev_close,
        status,
    })
}

pub fn parse_futures_quote(symbol: &str, text: &str) -> Result<FuturesQuote, FetchError> {
    let fields = extract_quote_fields(text)?;
    if fields.len() <= FIELD_FUTURES_SETTLE {
        return Err(FetchError::malformed(format!(
            "期货行情字段不足: {} 个",
            fields.len()
        )));
    }

    Ok(FuturesQuote {
        symbol: symbol.to_string(),
        name: fields[FIELD_NAME].to_string(),
        current: decimal_field(&fields, FIELD_FUTURES_CURRENT, "futures_current")?,
        settle: decimal_field(&fields, FIELD_FUTURES_SETTLE, "futures_settle")?,
    })
}

/// 期货 symbol 原样透传（如 `nf_SC0`、`hf_CL`），只做字符集校验。
pub fn normalize_futures_symbol(input: &str) -> Result<String, FetchError> {
    let s = input.trim();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(FetchError::InvalidCode(s.to_string()));
    }
    Ok(s.to_string())
}

async fn fetch_quote_text(
    client: &reqwest::Client,
    base_url: &str,
    symbol: &str,
) -> Result<String, FetchError> {
    let text = client
        .get(quote_url(base_url, symbol))
        .header(REFERER, SINA_REFERER)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(text)
}

pub async fn fetch_fund_quote(
    client: &reqwest::Client,
    base_url: &str,
    code: &MarketCode,
    mode: QuoteMode,
) -> Result<PriceRecord, FetchError> {
    let symbol = code.symbol();
    let text = fetch_quote_text(client, base_url, &symbol).await?;
    parse_fund_quote(&symbol, &text, mode)
}

pub async fn fetch_futures_quote(
    client: &reqwest::Client,
    base_url: &str,
    symbol: &str,
) -> Result<FuturesQuote, FetchError> {
    let symbol = normalize_futures_symbol(symbol)?;
    let text = fetch_quote_text(client, base_url, &symbol).await?;
    parse_futures_quote(&symbol, &text)
}
