use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
    sync::{Arc, RwLock},
};

use rust_decimal::Decimal;
use serde_json::Value;

use crate::advisory::AlertThresholds;
use crate::nav::{self, NavEndpoints, NavSource};
use crate::premium::PositionRange;

#[derive(Clone)]
pub struct ConfigStore {
    path: Option<PathBuf>,
    data: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl ConfigStore {
    /// 默认值 ← 配置文件 ← 环境变量，后者覆盖前者。
    pub fn load() -> Self {
        let path = detect_config_path();
        let mut data = default_config();

        if path.exists()
            && let Ok(bytes) = fs::read(&path)
            && let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(&bytes)
        {
            for (k, v) in map {
                data.insert(k, v);
            }
        }

        apply_env_overrides(&mut data);

        Self {
            path: Some(path),
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// 只有默认值，不读文件也不读环境变量（测试用）。
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: Arc::new(RwLock::new(default_config())),
        }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        let guard = self.data.read().expect("config read lock");
        match guard.get(key) {
            Some(Value::Bool(v)) => *v,
            Some(Value::Number(n)) => n.as_i64().unwrap_or_default() != 0,
            _ => default,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        let guard = self.data.read().expect("config read lock");
        match guard.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn get_i64(&self, key: &str, default: i64) -> i64 {
        let guard = self.data.read().expect("config read lock");
        match guard.get(key) {
            Some(Value::Number(n)) => n.as_i64().unwrap_or(default),
            Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(default),
            _ => default,
        }
    }

    /// 金额/比例类配置统一按十进制文本解析（数字或字符串都接受）。
    pub fn get_decimal(&self, key: &str, default: Decimal) -> Decimal {
        let guard = self.data.read().expect("config read lock");
        let text = match guard.get(key) {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return default,
        };
        text.parse::<Decimal>().unwrap_or(default)
    }

    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        let guard = self.data.read().expect("config read lock");
        match guard.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect(),
            Some(Value::String(s)) => s
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn set_value(&self, key: &str, value: Value) {
        let mut guard = self.data.write().expect("config write lock");
        guard.insert(key.to_string(), value);
    }

    pub fn set_bool(&self, key: &str, value: bool) {
        self.set_value(key, Value::Bool(value));
    }

    pub fn set_string(&self, key: &str, value: Option<String>) {
        self.set_value(key, value.map(Value::String).unwrap_or(Value::Null));
    }

    pub fn set_i64(&self, key: &str, value: i64) {
        self.set_value(key, Value::Number(value.into()));
    }

    pub fn port(&self) -> u16 {
        u16::try_from(self.get_i64("port", 8001)).unwrap_or(8001)
    }

    pub fn debug(&self) -> bool {
        self.get_bool("debug", false)
    }

    pub fn fee_rate(&self) -> Decimal {
        self.get_decimal("fee_rate", Decimal::new(6, 1))
    }

    pub fn alert_thresholds(&self) -> AlertThresholds {
        let d = AlertThresholds::default();
        AlertThresholds {
            premium: self.get_decimal("premium_alert_threshold", d.premium),
            discount: self.get_decimal("discount_alert_threshold", d.discount),
        }
    }

    pub fn position_range(&self) -> PositionRange {
        let d = PositionRange::default();
        PositionRange {
            min: self.get_decimal("position_ratio_min", d.min),
            max: self.get_decimal("position_ratio_max", d.max),
        }
    }

    pub fn default_position_ratio(&self) -> Decimal {
        self.get_decimal("default_position_ratio", Decimal::new(95, 2))
    }

    pub fn default_futures_symbol(&self) -> String {
        self.get_string("default_futures_symbol")
            .unwrap_or_else(|| "nf_SC0".to_string())
    }

    /// 未指定来源时使用的上游；`manual` 不能作为默认值。
    pub fn default_nav_source(&self) -> NavSource {
        self.get_string("default_nav_source")
            .as_deref()
            .and_then(nav::normalize_source_name)
            .filter(|s| *s != NavSource::Manual)
            .unwrap_or(NavSource::Jsonp)
    }

    pub fn nav_cache_ttl_secs(&self) -> i64 {
        self.get_i64("nav_cache_ttl_secs", 3600).max(0)
    }

    pub fn http_timeout_secs(&self) -> u64 {
        u64::try_from(self.get_i64("http_timeout_secs", 10)).unwrap_or(10)
    }

    pub fn watchlist(&self) -> Vec<String> {
        self.get_string_list("watchlist")
    }

    pub fn sina_base_url(&self) -> String {
        self.get_string("sina_base_url")
            .unwrap_or_else(|| "http://hq.sinajs.cn".to_string())
    }

    pub fn nav_endpoints(&self) -> NavEndpoints {
        NavEndpoints {
            pingzhong_base: self
                .get_string("pingzhong_base_url")
                .unwrap_or_else(|| "http://fund.eastmoney.com".to_string()),
            fundgz_base: self
                .get_string("fundgz_base_url")
                .unwrap_or_else(|| "http://fundgz.1234567.com.cn".to_string()),
        }
    }
}

fn default_config() -> BTreeMap<String, Value> {
    let mut m = BTreeMap::new();
    m.insert("port".into(), Value::Number(8001.into()));
    m.insert("debug".into(), Value::Bool(false));
    m.insert("fee_rate".into(), Value::String("0.6".into()));
    m.insert("premium_alert_threshold".into(), Value::String("1.0".into()));
    m.insert("discount_alert_threshold".into(), Value::String("1.5".into()));
    m.insert("position_ratio_min".into(), Value::String("0".into()));
    m.insert("position_ratio_max".into(), Value::String("1".into()));
    m.insert("default_position_ratio".into(), Value::String("0.95".into()));
    m.insert("default_futures_symbol".into(), Value::String("nf_SC0".into()));
    m.insert("default_nav_source".into(), Value::String("jsonp".into()));
    m.insert("nav_cache_ttl_secs".into(), Value::Number(3600.into()));
    m.insert("http_timeout_secs".into(), Value::Number(10.into()));
    m.insert(
        "watchlist".into(),
        Value::Array(
            ["161226", "501018", "160723", "161129", "164701"]
                .into_iter()
                .map(|c| Value::String(c.into()))
                .collect(),
        ),
    );
    m.insert("sina_base_url".into(), Value::String("http://hq.sinajs.cn".into()));
    m.insert(
        "fundgz_base_url".into(),
        Value::String("http://fundgz.1234567.com.cn".into()),
    );
    m.insert(
        "pingzhong_base_url".into(),
        Value::String("http://fund.eastmoney.com".into()),
    );
    m.insert("sources_health_probe".into(), Value::Bool(true));
    m
}

fn apply_env_overrides(data: &mut BTreeMap<String, Value>) {
    if let Some(port) = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
    {
        data.insert("port".into(), Value::Number(port.into()));
    }
    if let Ok(debug) = std::env::var("DEBUG") {
        data.insert("debug".into(), Value::Bool(debug.to_lowercase() == "true"));
    }
    if let Ok(fee) = std::env::var("FEE_RATE") {
        data.insert("fee_rate".into(), Value::String(fee));
    }
    for (env, key) in [
        ("NAV_CACHE_TTL_SECS", "nav_cache_ttl_secs"),
        ("HTTP_TIMEOUT_SECS", "http_timeout_secs"),
    ] {
        if let Some(v) = std::env::var(env).ok().and_then(|s| s.parse::<i64>().ok()) {
            data.insert(key.into(), Value::Number(v.into()));
        }
    }
    for (env, key) in [
        ("SINA_BASE_URL", "sina_base_url"),
        ("FUNDGZ_BASE_URL", "fundgz_base_url"),
        ("PINGZHONG_BASE_URL", "pingzhong_base_url"),
    ] {
        if let Ok(v) = std::env::var(env) {
            data.insert(key.into(), Value::String(v));
        }
    }
}

fn detect_config_path() -> PathBuf {
    if let Ok(p) = std::env::var("LOF_CONFIG")
        && !p.trim().is_empty()
    {
        return PathBuf::from(p);
    }
    let preferred = PathBuf::from("/app/config/config.json");
    if preferred.exists() {
        return preferred;
    }
    PathBuf::from("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_cover_every_typed_accessor() {
        let c = ConfigStore::in_memory();
        assert_eq!(c.port(), 8001);
        assert_eq!(c.fee_rate(), dec!(0.6));
        assert_eq!(c.alert_thresholds(), AlertThresholds::default());
        assert_eq!(c.position_range(), PositionRange::default());
        assert_eq!(c.nav_cache_ttl_secs(), 3600);
        assert_eq!(c.watchlist().len(), 5);
        assert_eq!(c.default_futures_symbol(), "nf_SC0");
        assert_eq!(c.default_nav_source(), NavSource::Jsonp);
    }

    #[test]
    fn manual_is_not_a_default_source() {
        let c = ConfigStore::in_memory();
        c.set_string("default_nav_source", Some("manual".into()));
        assert_eq!(c.default_nav_source(), NavSource::Jsonp);
        c.set_string("default_nav_source", Some("pingzhong".into()));
        assert_eq!(c.default_nav_source(), NavSource::History);
    }

    #[test]
    fn decimal_accepts_numbers_and_strings() {
        let c = ConfigStore::in_memory();
        c.set_value("premium_alert_threshold", serde_json::json!(2.0));
        c.set_string("discount_alert_threshold", Some(" 2.5 ".into()));
        let t = c.alert_thresholds();
        assert_eq!(t.premium, dec!(2.0));
        assert_eq!(t.discount, dec!(2.5));
    }

    #[test]
    fn watchlist_accepts_comma_string() {
        let c = ConfigStore::in_memory();
        c.set_string("watchlist", Some("161226, sh501018,,".into()));
        assert_eq!(c.watchlist(), vec!["161226", "sh501018"]);
    }

    #[test]
    fn negative_ttl_is_clamped() {
        let c = ConfigStore::in_memory();
        c.set_i64("nav_cache_ttl_secs", -5);
        assert_eq!(c.nav_cache_ttl_secs(), 0);
    }
}
