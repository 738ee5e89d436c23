//! In-process key-value store
//!
//! Backed by a sharded `DashMap`. Expiry uses `tokio::time::Instant`, so tests
//! running with a paused clock can move time forward deterministically.
//! Expired entries are invisible to every operation and are physically removed
//! lazily on access or by [`MemoryStore::purge_expired`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::KvStore;
use crate::errors::{NotelinkError, Result};

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn new(value: String, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, StoredValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }

    /// Remaining TTL of a live key
    ///
    /// `None` if the key is absent or expired, `Some(None)` if it never expires.
    pub fn ttl(&self, key: &str) -> Option<Option<Duration>> {
        let now = Instant::now();
        let entry = self.inner.get(key)?;
        if entry.is_expired(now) {
            return None;
        }
        Some(entry.expires_at.map(|at| at.saturating_duration_since(now)))
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.inner.iter().filter(|e| !e.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.inner.len();
        self.inner.retain(|_, v| !v.is_expired(now));
        before.saturating_sub(self.inner.len())
    }

    /// Periodically purge expired entries until the runtime shuts down
    pub fn spawn_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = store.purge_expired();
                if removed > 0 {
                    debug!("MemoryStore sweeper removed {} expired keys", removed);
                }
            }
        })
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let expired = match self.inner.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                trace!("MemoryStore hit: {}", key);
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };

        // 读锁已释放，再按条件删除过期项
        if expired {
            self.inner.remove_if(key, |_, v| v.is_expired(now));
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<()> {
        self.inner
            .insert(key.to_string(), StoredValue::new(value, ttl));
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<bool> {
        let now = Instant::now();
        match self.inner.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.insert(StoredValue::new(value, ttl));
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(StoredValue::new(value, ttl));
                Ok(true)
            }
        }
    }

    async fn increment(&self, key: &str, window: Duration) -> Result<u64> {
        let now = Instant::now();
        match self.inner.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.insert(StoredValue::new("1".to_string(), Some(window)));
                    return Ok(1);
                }

                let current: u64 = occupied.get().value.parse().map_err(|_| {
                    NotelinkError::store_operation(format!(
                        "Value at '{}' is not an integer counter",
                        key
                    ))
                })?;
                let next = current.saturating_add(1);
                occupied.get_mut().value = next.to_string();
                Ok(next)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(StoredValue::new("1".to_string(), Some(window)));
                Ok(1)
            }
        }
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
