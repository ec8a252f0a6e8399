use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;

use crate::cache::{Clock, SystemClock, TtlCache};
use crate::config::ConfigStore;
use crate::nav::{NavRecord, NavSource};

/// NAV 缓存键：同一基金不同来源分开缓存。
pub type NavCacheKey = (NavSource, String);
pub type NavCache = TtlCache<NavCacheKey, NavRecord>;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    pub config: ConfigStore,
    pub client: reqwest::Client,
    pub nav_cache: NavCache,
}

impl AppState {
    pub fn new(config: ConfigStore, client: reqwest::Client) -> Self {
        Self::with_clock(config, client, Arc::new(SystemClock))
    }

    pub fn with_clock(config: ConfigStore, client: reqwest::Client, clock: Arc<dyn Clock>) -> Self {
        let ttl = Duration::seconds(config.nav_cache_ttl_secs());
        Self {
            inner: Arc::new(InnerState {
                config,
                client,
                nav_cache: TtlCache::new(ttl, clock),
            }),
        }
    }

    pub fn config(&self) -> &ConfigStore {
        &self.inner.config
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.inner.client
    }

    pub fn nav_cache(&self) -> &NavCache {
        &self.inner.nav_cache
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub nav_cache_entries: usize,
    pub nav_cache_ttl_secs: i64,
}
