use rust_decimal::Decimal;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PremiumQuote {
    /// 溢价率（百分比单位）：`(price - nav) / nav * 100`
    pub premium_rate: Decimal,
    /// 扣除交易成本后的套利空间（百分比单位）
    pub arbitrage_space: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl Default for PositionRange {
    fn default() -> Self {
        Self {
            min: Decimal::ZERO,
            max: Decimal::ONE,
        }
    }
}

/// `(a - b) / b * 100`；`b` 为 0 或中间结果溢出时为 `None`。
fn relative_change_pct(a: Decimal, b: Decimal) -> Option<Decimal> {
    if b.is_zero() {
        return None;
    }
    a.checked_sub(b)?.checked_div(b)?.checked_mul(HUNDRED)
}

/// nav 为 0 或数值超出 Decimal 范围时为 `None`。
pub fn premium_rate(price: Decimal, nav: Decimal) -> Option<Decimal> {
    relative_change_pct(price, nav)
}

pub fn evaluate(price: Decimal, nav: Decimal, fee_rate: Decimal) -> Option<PremiumQuote> {
    let premium_rate = premium_rate(price, nav)?;
    Some(PremiumQuote {
        premium_rate,
        arbitrage_space: premium_rate.checked_sub(fee_rate)?,
    })
}

/// 期货相对上一结算价的涨跌幅（百分比单位）。
pub fn futures_change_pct(current: Decimal, settle: Decimal) -> Option<Decimal> {
    relative_change_pct(current, settle)
}

pub fn clamp_position_ratio(ratio: Decimal, range: PositionRange) -> Decimal {
    let (lo, hi) = if range.min <= range.max {
        (range.min, range.max)
    } else {
        (range.max, range.min)
    };
    ratio.max(lo).min(hi)
}

/// IOPV 估算：`last_nav * (1 + change_pct / 100 * position_ratio)`。
pub fn estimate_nav(
    last_nav: Decimal,
    change_pct: Decimal,
    position_ratio: Decimal,
) -> Option<Decimal> {
    let scaled = change_pct.checked_div(HUNDRED)?.checked_mul(position_ratio)?;
    last_nav.checked_mul(Decimal::ONE.checked_add(scaled)?)
}

/// 保留两位小数，采用银行家舍入（`round_dp` 默认的四舍六入五成双）：
/// `2.345` → `"2.34"`，`2.355` → `"2.36"`。
pub fn display_rate(v: Decimal) -> String {
    let r = v.round_dp(2);
    // -0.004 之类不显示成 "-0.00"
    let r = if r.is_zero() { Decimal::ZERO } else { r };
    format!("{r:.2}")
}

pub fn display_price(v: Decimal) -> String {
    format!("{:.3}", v.round_dp(3))
}

pub fn display_nav(v: Decimal) -> String {
    format!("{:.4}", v.round_dp(4))
}
