use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::premium::{PremiumQuote, display_rate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    NotablePremium,
    NotableDiscount,
    Stable,
}

/// 提示阈值（百分比单位），可配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertThresholds {
    /// 套利空间超过该值即提示溢价
    pub premium: Decimal,
    /// 溢价率低于该值的相反数即提示折价
    pub discount: Decimal,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            premium: dec!(1.0),
            discount: dec!(1.5),
        }
    }
}

pub fn classify(quote: &PremiumQuote, thresholds: &AlertThresholds) -> Advisory {
    if quote.arbitrage_space > thresholds.premium {
        Advisory::NotablePremium
    } else if quote.premium_rate < -thresholds.discount {
        Advisory::NotableDiscount
    } else {
        Advisory::Stable
    }
}

pub fn message(advisory: Advisory, quote: &PremiumQuote) -> String {
    match advisory {
        Advisory::NotablePremium => format!(
            "溢价明显！当前价格比净值贵了 {}%。",
            display_rate(quote.premium_rate)
        ),
        Advisory::NotableDiscount => format!(
            "折价明显！当前价格比净值便宜了 {}%。",
            display_rate(quote.premium_rate.abs())
        ),
        Advisory::Stable => "价格相对平稳。".to_string(),
    }
}
