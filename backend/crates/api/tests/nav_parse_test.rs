use api::eastmoney;
use rust_decimal_macros::dec;

#[test]
fn history_takes_last_element_and_converts_epoch_ms() {
    let text = r#"var fS_code = "161226";var Data_netWorthTrend = [{"x":1770825600000,"y":0.988,"equityReturn":-0.5,"unitMoney":""},{"x":1770912000000,"y":1.0123,"equityReturn":2.46,"unitMoney":""}];var Data_ACWorthTrend = [];"#;

    let all = eastmoney::parse_net_worth_trend(text).expect("parse");
    assert_eq!(all.len(), 2);

    let latest = eastmoney::latest_nav_point(text).expect("latest");
    assert_eq!(latest.unit_nav, dec!(1.0123));
    assert_eq!(latest.nav_date.to_string(), "2026-02-13");
}

#[test]
fn history_skips_unusable_points() {
    let text = r#"var Data_netWorthTrend = [{"x":1770825600000,"y":0.988},{"x":null,"y":1.5},{"y":2.0}];"#;
    let latest = eastmoney::latest_nav_point(text).expect("latest");
    assert_eq!(latest.unit_nav, dec!(0.988));
    assert_eq!(latest.nav_date.to_string(), "2026-02-12");
}

#[test]
fn history_without_trend_is_malformed() {
    let err = eastmoney::latest_nav_point("var Data_grandTotal = [];").unwrap_err();
    assert_eq!(err.kind(), "malformed");
}

#[test]
fn empty_history_is_missing_field() {
    let err = eastmoney::latest_nav_point("var Data_netWorthTrend = [];").unwrap_err();
    assert_eq!(err.kind(), "missing_field");
}

#[test]
fn fundgz_reads_dwjz_and_jzrq() {
    let text = r#"jsonpgz({"fundcode":"161226","name":"国投瑞银白银期货(LOF)A","jzrq":"2026-02-12","dwjz":"0.9660","gsz":"0.9701","gszzl":"0.42","gztime":"2026-02-13 14:30"});"#;
    let got = eastmoney::parse_fundgz_nav(text).expect("parse");
    assert_eq!(got.nav, dec!(0.9660));
    assert_eq!(got.nav_date.to_string(), "2026-02-12");
}

#[test]
fn fundgz_without_fundcode_still_yields_nav() {
    let text = r#"jsonpgz({"jzrq":"2026-02-12","dwjz":"1.2345"});"#;
    let got = eastmoney::parse_fundgz_nav(text).expect("parse");
    assert_eq!(got.nav, dec!(1.2345));
}

#[test]
fn fundgz_empty_dwjz_is_missing_field() {
    let text = r#"jsonpgz({"fundcode":"164701","name":"x","jzrq":"2026-02-12","dwjz":""});"#;
    let err = eastmoney::parse_fundgz_nav(text).unwrap_err();
    assert_eq!(err.kind(), "missing_field");
}

#[test]
fn fundgz_without_wrapper_is_malformed() {
    let err = eastmoney::parse_fundgz_nav("<html>404</html>").unwrap_err();
    assert_eq!(err.kind(), "malformed");
}
