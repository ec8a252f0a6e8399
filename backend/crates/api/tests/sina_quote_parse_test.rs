use api::sina::{self, QuoteMode, TradingStatus};
use rust_decimal_macros::dec;

const NO_TRADE: &str = "var hq_str_sh501018=\"南方原油LOF,0.000,0.966,0,0.000,0.000\";";

#[test]
fn batch_mode_substitutes_prev_close_for_zero_price() {
    let p = sina::parse_fund_quote("sh501018", NO_TRADE, QuoteMode::Batch).expect("parse");
    assert_eq!(p.name, "南方原油LOF");
    assert_eq!(p.price, dec!(0.966));
    assert_eq!(p.prev_close, dec!(0.966));
    assert_eq!(p.status, TradingStatus::NoTrade);
}

#[test]
fn raw_mode_reports_zero_price_unmodified() {
    let p = sina::parse_fund_quote("sh501018", NO_TRADE, QuoteMode::Raw).expect("parse");
    assert!(p.price.is_zero());
    assert_eq!(p.prev_close, dec!(0.966));
}

#[test]
fn trading_quote_uses_field_three() {
    let text = "var hq_str_sz161226=\"国投白银LOF,1.000,0.990,1.010,1.020\";";
    for mode in [QuoteMode::Raw, QuoteMode::Batch] {
        let p = sina::parse_fund_quote("sz161226", text, mode).expect("parse");
        assert_eq!(p.price, dec!(1.010));
        assert_eq!(p.status, TradingStatus::Trading);
    }
}

#[test]
fn too_few_fields_is_malformed() {
    let err = sina::parse_fund_quote("sz161226", "var hq_str_sz161226=\"a,b\";", QuoteMode::Raw)
        .unwrap_err();
    assert_eq!(err.kind(), "malformed");
}

#[test]
fn non_numeric_price_is_malformed() {
    let err = sina::parse_fund_quote(
        "sz161226",
        "var hq_str_sz161226=\"x,1.0,0.9,abc\";",
        QuoteMode::Raw,
    )
    .unwrap_err();
    assert_eq!(err.kind(), "malformed");
}

#[test]
fn futures_quote_reads_current_and_settlement() {
    let text = "var hq_str_nf_SC0=\"原油连续,150000,104.0,106.0,103.5,0,104.9,105.1,105.0,100.5,98.0,100.0,5\";";
    let f = sina::parse_futures_quote("nf_SC0", text).expect("parse");
    assert_eq!(f.name, "原油连续");
    assert_eq!(f.current, dec!(105.0));
    assert_eq!(f.settle, dec!(100.0));
}

#[test]
fn builds_quote_url() {
    assert_eq!(
        sina::quote_url("http://hq.sinajs.cn/", "sz161226"),
        "http://hq.sinajs.cn/list=sz161226"
    );
}
