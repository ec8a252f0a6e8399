use std::str::FromStr;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use regex::Regex;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::error::FetchError;

const TZ_OFFSET_SECONDS: i64 = 8 * 60 * 60; // Asia/Shanghai fixed offset (+08:00)

#[derive(Debug, Clone, PartialEq)]
pub struct NavPoint {
    pub nav_date: NaiveDate,
    pub unit_nav: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FundGzNav {
    pub nav: Decimal,
    pub nav_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct FundGzPayload {
    dwjz: Option<String>,
    jzrq: Option<String>,
}

pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"),
    );
    headers.insert(
        REFERER,
        HeaderValue::from_static("https://fund.eastmoney.com/"),
    );

    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs.max(1)))
        // 使用接近浏览器的 UA，降低被上游拦截概率
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36")
        .default_headers(headers)
        .build()
}

pub fn pingzhong_url(base_url: &str, fund_code: &str) -> String {
    format!(
        "{}/pingzhongdata/{}.js",
        base_url.trim_end_matches('/'),
        fund_code.trim()
    )
}

pub fn fundgz_url(base_url: &str, fund_code: &str) -> String {
    format!("{}/js/{}.js", base_url.trim_end_matches('/'), fund_code.trim())
}

fn extract_jsonpgz_payload(text: &str) -> Option<&str> {
    let text = text.trim();
    let start = text.find("jsonpgz(")? + "jsonpgz(".len();

    let tail = text[start..].trim_end();
    let end = if tail.ends_with(");") {
        tail.len().saturating_sub(2)
    } else if tail.ends_with(')') {
        tail.len().saturating_sub(1)
    } else {
        tail.rfind(')')?
    };

    let payload = tail[..end].trim();
    if payload.is_empty() {
        None
    } else {
        Some(payload)
    }
}

/// 把 JSON 数字/字符串转成 Decimal；数字走十进制文本，避免 f64 二进制误差。
fn json_decimal(v: &Value) -> Option<Decimal> {
    match v {
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Decimal::from_str_exact(t).ok()
            }
        }
        Value::Number(n) => {
            let t = n.to_string();
            Decimal::from_str(&t)
                .or_else(|_| Decimal::from_scientific(&t))
                .ok()
        }
        _ => None,
    }
}

/// 毫秒时间戳按北京时间落到自然日。
pub fn epoch_ms_to_nav_date(x_ms: i64) -> Option<NaiveDate> {
    let ts = Utc.timestamp_millis_opt(x_ms).single()?;
    Some((ts + Duration::seconds(TZ_OFFSET_SECONDS)).date_naive())
}

pub fn parse_net_worth_trend(text: &str) -> Result<Vec<NavPoint>, FetchError> {
    let re = Regex::new(r"(?s)var\s+Data_netWorthTrend\s*=\s*(\[.*?\]);")
        .map_err(|e| FetchError::malformed(e.to_string()))?;
    let json_str = re
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| FetchError::malformed("缺少 Data_netWorthTrend"))?;

    let data: Value = serde_json::from_str(json_str)
        .map_err(|e| FetchError::malformed(format!("Data_netWorthTrend JSON 解析失败: {e}")))?;
    let arr = data
        .as_array()
        .ok_or_else(|| FetchError::malformed("Data_netWorthTrend 不是数组"))?;

    let mut out: Vec<NavPoint> = Vec::with_capacity(arr.len());
    for item in arr {
        let Some(obj) = item.as_object() else {
            continue;
        };
        let Some(x_ms) = obj.get("x").and_then(|v| v.as_i64()) else {
            continue;
        };
        let Some(unit_nav) = obj.get("y").and_then(json_decimal) else {
            continue;
        };
        let Some(nav_date) = epoch_ms_to_nav_date(x_ms) else {
            continue;
        };
        out.push(NavPoint { nav_date, unit_nav });
    }

    Ok(out)
}

/// 上游按时间升序给出，最后一个元素即最新净值。
pub fn latest_nav_point(text: &str) -> Result<NavPoint, FetchError> {
    parse_net_worth_trend(text)?
        .pop()
        .ok_or(FetchError::MissingField("Data_netWorthTrend"))
}

pub fn parse_fundgz_nav(text: &str) -> Result<FundGzNav, FetchError> {
    let json_str =
        extract_jsonpgz_payload(text).ok_or_else(|| FetchError::malformed("缺少 jsonpgz(...) 包装"))?;
    let payload: FundGzPayload = serde_json::from_str(json_str)
        .map_err(|e| FetchError::malformed(format!("jsonpgz JSON 解析失败: {e}")))?;

    let dwjz = payload
        .dwjz
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(FetchError::MissingField("dwjz"))?;
    let jzrq = payload
        .jzrq
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(FetchError::MissingField("jzrq"))?;

    let nav = Decimal::from_str_exact(&dwjz)
        .map_err(|e| FetchError::malformed(format!("dwjz 解析失败: {e}")))?;
    let nav_date = NaiveDate::parse_from_str(&jzrq, "%Y-%m-%d")
        .map_err(|e| FetchError::malformed(format!("jzrq 解析失败: {e}")))?;

    Ok(FundGzNav { nav, nav_date })
}

async fn fetch_text(client: &reqwest::Client, url: String) -> Result<String, FetchError> {
    let text = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(text)
}

pub async fn fetch_latest_history_nav(
    client: &reqwest::Client,
    base_url: &str,
    fund_code: &str,
) -> Result<NavPoint, FetchError> {
    let text = fetch_text(client, pingzhong_url(base_url, fund_code)).await?;
    latest_nav_point(&text)
}

pub async fn fetch_fundgz_nav(
    client: &reqwest::Client,
    base_url: &str,
    fund_code: &str,
) -> Result<FundGzNav, FetchError> {
    let text = fetch_text(client, fundgz_url(base_url, fund_code)).await?;
    parse_fundgz_nav(&text)
}
