use std::fmt;

use crate::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exchange {
    Shanghai,
    Shenzhen,
}

impl Exchange {
    pub fn prefix(self) -> &'static str {
        match self {
            Exchange::Shanghai => "sh",
            Exchange::Shenzhen => "sz",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "sh" => Some(Exchange::Shanghai),
            "sz" => Some(Exchange::Shenzhen),
            _ => None,
        }
    }
}

/// 交易所 + 6 位基金代码，例如 `sz161226`。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarketCode {
    pub exchange: Exchange,
    pub code: String,
}

impl MarketCode {
    /// 新浪行情使用的 symbol（`sh501018` / `sz161226`）。
    pub fn symbol(&self) -> String {
        format!("{}{}", self.exchange.prefix(), self.code)
    }
}

impl fmt::Display for MarketCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.exchange.prefix(), self.code)
    }
}

fn is_fund_code(s: &str) -> bool {
    s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit())
}

/// 纯数字代码的交易所推断：`5` 开头走上交所，其余走深交所。
pub fn infer_exchange(bare_code: &str) -> Exchange {
    if bare_code.starts_with('5') {
        Exchange::Shanghai
    } else {
        Exchange::Shenzhen
    }
}

/// 解析用户输入的基金代码。
///
/// - 已带 `sh`/`sz` 前缀（大小写不敏感）的保持原交易所；
/// - 纯 6 位数字按 [`infer_exchange`] 推断；
/// - 其余输入一律视为无效代码。
pub fn parse_market_code(input: &str) -> Result<MarketCode, FetchError> {
    let s = input.trim().to_ascii_lowercase();
    if s.len() > 2
        && let Some(exchange) = s.get(..2).and_then(Exchange::from_prefix)
    {
        let code = &s[2..];
        if is_fund_code(code) {
            return Ok(MarketCode {
                exchange,
                code: code.to_string(),
            });
        }
        return Err(FetchError::InvalidCode(input.trim().to_string()));
    }

    if is_fund_code(&s) {
        return Ok(MarketCode {
            exchange: infer_exchange(&s),
            code: s,
        });
    }

    Err(FetchError::InvalidCode(input.trim().to_string()))
}

/// NAV 接口只认 6 位代码；去掉交易所前缀。
pub fn bare_fund_code(input: &str) -> Result<String, FetchError> {
    parse_market_code(input).map(|m| m.code)
}
