use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::eastmoney;
use crate::error::FetchError;

pub const SOURCE_MANUAL: &str = "manual";
pub const SOURCE_HISTORY: &str = "history";
pub const SOURCE_JSONP: &str = "jsonp";

pub const BUILTIN_SOURCES: [&str; 3] = [SOURCE_MANUAL, SOURCE_HISTORY, SOURCE_JSONP];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavSource {
    /// 用户手工录入
    Manual,
    /// 天天基金 pingzhongdata 历史净值（endpoint A）
    History,
    /// fundgz 轻量 JSONP（endpoint B）
    Jsonp,
}

impl NavSource {
    pub fn as_str(self) -> &'static str {
        match self {
            NavSource::Manual => SOURCE_MANUAL,
            NavSource::History => SOURCE_HISTORY,
            NavSource::Jsonp => SOURCE_JSONP,
        }
    }
}

pub fn normalize_source_name(input: &str) -> Option<NavSource> {
    let s = input.trim().to_ascii_lowercase();
    if s.is_empty() {
        return None;
    }

    match s.as_str() {
        SOURCE_MANUAL => Some(NavSource::Manual),
        SOURCE_HISTORY | "pingzhong" | "pingzhongdata" | "endpoint-a" => Some(NavSource::History),
        SOURCE_JSONP | "fundgz" | "tiantian" | "endpoint-b" => Some(NavSource::Jsonp),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavRecord {
    pub fund_code: String,
    pub nav: Decimal,
    pub nav_date: Option<NaiveDate>,
    pub source: NavSource,
}

impl NavRecord {
    pub fn manual(fund_code: &str, nav: Decimal, nav_date: Option<NaiveDate>) -> Result<Self, FetchError> {
        if nav <= Decimal::ZERO {
            return Err(FetchError::MissingField("nav"));
        }
        Ok(Self {
            fund_code: fund_code.to_string(),
            nav,
            nav_date,
            source: NavSource::Manual,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NavEndpoints {
    pub pingzhong_base: String,
    pub fundgz_base: String,
}

/// 拉取一次上游净值；`Manual` 没有上游，调用方应直接构造 [`NavRecord::manual`]。
pub async fn fetch_nav(
    client: &reqwest::Client,
    endpoints: &NavEndpoints,
    source: NavSource,
    fund_code: &str,
) -> Result<NavRecord, FetchError> {
    let (nav, nav_date) = match source {
        NavSource::Manual => return Err(FetchError::MissingField("nav")),
        NavSource::History => {
            let p = eastmoney::fetch_latest_history_nav(client, &endpoints.pingzhong_base, fund_code)
                .await?;
            (p.unit_nav, p.nav_date)
        }
        NavSource::Jsonp => {
            let v = eastmoney::fetch_fundgz_nav(client, &endpoints.fundgz_base, fund_code).await?;
            (v.nav, v.nav_date)
        }
    };

    if nav.is_zero() {
        return Err(FetchError::MissingField("nav"));
    }

    Ok(NavRecord {
        fund_code: fund_code.to_string(),
        nav,
        nav_date: Some(nav_date),
        source,
    })
}
