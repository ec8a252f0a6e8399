//! 会话级 TTL 缓存：显式时钟注入 + 显式失效。
//!
//! 只有过期淘汰，没有容量上限或 LRU；过期条目在读取时顺带移除。

use std::{
    collections::HashMap,
    hash::Hash,
    sync::{Arc, Mutex, RwLock},
};

use chrono::{DateTime, Duration, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 测试用时钟：时间只在 `advance`/`set` 时前进。
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().expect("clock lock");
        *guard += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().expect("clock lock") = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Arc<RwLock<HashMap<K, Entry<V>>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// TTL 为 0（或负数）时缓存形同关闭。
    pub fn is_enabled(&self) -> bool {
        self.ttl > Duration::zero()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        if !self.is_enabled() {
            return None;
        }
        let now = self.clock.now();
        {
            let guard = self.entries.read().expect("cache read lock");
            match guard.get(key) {
                None => return None,
                Some(entry) if now - entry.stored_at < self.ttl => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }
        self.entries.write().expect("cache write lock").remove(key);
        None
    }

    pub fn insert(&self, key: K, value: V) {
        if !self.is_enabled() {
            return;
        }
        let entry = Entry {
            value,
            stored_at: self.clock.now(),
        };
        self.entries
            .write()
            .expect("cache write lock")
            .insert(key, entry);
    }

    pub fn invalidate(&self, key: &K) -> bool {
        self.entries
            .write()
            .expect("cache write lock")
            .remove(key)
            .is_some()
    }

    /// 删除所有满足条件的 key，返回删除条数。
    pub fn invalidate_where(&self, mut pred: impl FnMut(&K) -> bool) -> usize {
        let mut guard = self.entries.write().expect("cache write lock");
        let before = guard.len();
        guard.retain(|k, _| !pred(k));
        before - guard.len()
    }

    pub fn clear(&self) -> usize {
        let mut guard = self.entries.write().expect("cache write lock");
        let n = guard.len();
        guard.clear();
        n
    }

    /// 当前存量条目数（包含尚未被读取清理的过期条目）。
    pub fn len(&self) -> usize {
        self.entries.read().expect("cache read lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
