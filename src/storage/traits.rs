use std::time::Duration;

use async_trait::async_trait;

use crate::errors::Result;

/// Key-value store with per-key expiry
///
/// Every operation touches exactly one key and is atomic for that key.
/// Values are opaque strings (JSON for notes, decimal integers for counters).
#[async_trait]
pub trait KvStore: Send + Sync {
    /// 读取值；过期的 key 与不存在的 key 不可区分
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// 无条件写入，`ttl = None` 表示永不过期
    ///
    /// Issuance never overwrites and goes through [`KvStore::set_nx`]; this is
    /// the plain set-with-TTL primitive for seeding and maintenance.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<()>;

    /// 仅当 key 不存在时写入（set-if-not-exists）
    ///
    /// Returns `true` when the value was written, `false` when the key was occupied.
    async fn set_nx(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<bool>;

    /// Fixed-window counter increment
    ///
    /// Creates the counter at 1 with `window` as its TTL when absent, otherwise
    /// increments it and leaves the remaining TTL untouched. Returns the new count.
    async fn increment(&self, key: &str, window: Duration) -> Result<u64>;

    /// 健康检查
    async fn ping(&self) -> Result<()>;

    fn backend_name(&self) -> &'static str;
}
