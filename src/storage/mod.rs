use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::StoreConfig;
use crate::errors::{NotelinkError, Result};

pub mod memory;
pub mod models;
pub mod redis;
pub mod traits;

pub use memory::MemoryStore;
pub use models::{ExpiryPreset, StoredNote, format_timestamp, note_key, rate_limit_key};
pub use redis::RedisStore;
pub use traits::KvStore;

pub struct StoreFactory;

impl StoreFactory {
    /// 根据配置创建存储后端
    pub async fn create(config: &StoreConfig) -> Result<Arc<dyn KvStore>> {
        match config.store_type.as_str() {
            "memory" => {
                let store = MemoryStore::new();
                if config.memory.sweep_interval_secs > 0 {
                    store.spawn_sweeper(Duration::from_secs(config.memory.sweep_interval_secs));
                }
                info!("Using in-memory store (notes are lost on restart)");
                Ok(Arc::new(store))
            }
            "redis" => {
                let store = RedisStore::connect(&config.redis).await?;
                info!("Using Redis store with prefix '{}'", config.redis.key_prefix);
                Ok(Arc::new(store))
            }
            other => Err(NotelinkError::store_plugin_not_found(format!(
                "Unknown store type '{}'",
                other
            ))),
        }
    }
}
