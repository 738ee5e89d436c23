//! Redis 存储后端
//!
//! 所有 key 带统一前缀；连接复用一个 MultiplexedConnection，出错时重置。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use tokio::sync::RwLock;
use tracing::{debug, error, trace};

use super::KvStore;
use crate::config::RedisConfig;
use crate::errors::{NotelinkError, Result};

pub struct RedisStore {
    client: redis::Client,
    /// 持久化连接，使用 RwLock 保护
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    key_prefix: String,
}

impl RedisStore {
    /// Open a client and verify the server answers `PING`
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.clone()).map_err(|e| {
            NotelinkError::store_connection(format!("Invalid Redis URL '{}': {}", config.url, e))
        })?;

        let store = Self {
            client,
            connection: Arc::new(RwLock::new(None)),
            key_prefix: config.key_prefix.clone(),
        };

        store.ping().await.map_err(|e| {
            error!(
                "Failed to ping Redis server: {}. Check Redis server status and URL: {}",
                e, config.url
            );
            NotelinkError::store_connection(format!("Redis ping failed: {}", e))
        })?;

        debug!("RedisStore created with prefix: '{}'", store.key_prefix);
        Ok(store)
    }

    /// 获取或建立持久连接
    async fn get_connection(&self) -> Result<MultiplexedConnection> {
        {
            let conn_guard = self.connection.read().await;
            if let Some(ref conn) = *conn_guard {
                return Ok(conn.clone());
            }
        }

        let mut conn_guard = self.connection.write().await;

        // 双重检查，避免竞态条件
        if let Some(ref conn) = *conn_guard {
            return Ok(conn.clone());
        }

        let new_conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| NotelinkError::store_connection(e.to_string()))?;
        *conn_guard = Some(new_conn.clone());
        debug!("Redis connection established and cached");

        Ok(new_conn)
    }

    /// 重置连接（在连接错误时调用）
    async fn reset_connection(&self) {
        let mut conn_guard = self.connection.write().await;
        *conn_guard = None;
        debug!("Redis connection reset due to error");
    }

    /// Log, drop the cached connection and convert the error
    async fn fail(&self, op: &str, key: &str, err: redis::RedisError) -> NotelinkError {
        error!("Redis {} failed for key '{}': {}", op, key, err);
        self.reset_connection().await;
        err.into()
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let redis_key = self.make_key(key);
        let mut conn = self.get_connection().await?;

        match conn.get::<_, Option<String>>(&redis_key).await {
            Ok(value) => {
                trace!("Redis GET {} -> {}", key, value.is_some());
                Ok(value)
            }
            Err(e) => Err(self.fail("GET", key, e).await),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<()> {
        let redis_key = self.make_key(key);
        let mut conn = self.get_connection().await?;

        let result = match ttl {
            Some(ttl) => {
                conn.set_ex::<_, _, ()>(&redis_key, value, ttl.as_secs().max(1))
                    .await
            }
            None => conn.set::<_, _, ()>(&redis_key, value).await,
        };

        match result {
            Ok(()) => {
                trace!("Redis SET {}", key);
                Ok(())
            }
            Err(e) => Err(self.fail("SET", key, e).await),
        }
    }

    async fn set_nx(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<bool> {
        let redis_key = self.make_key(key);
        let mut conn = self.get_connection().await?;

        // SET key value NX [EX ttl]：存在性检查与写入是同一个原子命令
        let mut cmd = redis::cmd("SET");
        cmd.arg(&redis_key).arg(value).arg("NX");
        if let Some(ttl) = ttl {
            cmd.arg("EX").arg(ttl.as_secs().max(1));
        }

        let reply: redis::RedisResult<Option<String>> = cmd.query_async(&mut conn).await;
        match reply {
            Ok(reply) => {
                let written = reply.is_some();
                trace!("Redis SET NX {} -> {}", key, written);
                Ok(written)
            }
            Err(e) => Err(self.fail("SET NX", key, e).await),
        }
    }

    async fn increment(&self, key: &str, window: Duration) -> Result<u64> {
        let redis_key = self.make_key(key);
        let mut conn = self.get_connection().await?;

        // MULTI: SET key 0 EX window NX; INCR key
        // 新窗口由 SET NX 带上 TTL，已有窗口只做 INCR，TTL 不变
        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("SET")
            .arg(&redis_key)
            .arg(0)
            .arg("EX")
            .arg(window.as_secs().max(1))
            .arg("NX")
            .ignore()
            .cmd("INCR")
            .arg(&redis_key);

        let reply: redis::RedisResult<(u64,)> = pipe.query_async(&mut conn).await;
        match reply {
            Ok((count,)) => {
                trace!("Redis INCR {} -> {}", key, count);
                Ok(count)
            }
            Err(e) => Err(self.fail("INCR", key, e).await),
        }
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let reply: redis::RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        match reply {
            Ok(_) => Ok(()),
            Err(e) => Err(self.fail("PING", "-", e).await),
        }
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
