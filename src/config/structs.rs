use serde::{Deserialize, Serialize};

use crate::storage::ExpiryPreset;

/// 静态配置（从 TOML 加载，启动时使用）
///
/// - server: 监听地址、端口、CPU 数量、CORS
/// - store: 键值存储后端（memory / redis）
/// - share: 分享链接的限制与展示参数
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub share: ShareConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config file > 默认值
    /// ENV 前缀：NL，分隔符：__
    /// 示例：NL__SERVER__PORT=9999
    /// 列表用逗号分隔：NL__SERVER__CORS_ALLOWED_ORIGINS=https://a.example,https://b.example
    pub fn load_from(path: &str) -> crate::errors::Result<Self> {
        use config::{Config, Environment, File};

        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("NL")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_allowed_origins"),
            )
            .build()?;

        let config = settings.try_deserialize::<StaticConfig>()?;
        if std::path::Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }
        Ok(config)
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// Empty = same-origin only, `["*"]` = any origin
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

/// 键值存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(rename = "type")]
    #[serde(default = "default_store_type")]
    pub store_type: String,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

/// Redis 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
    #[serde(default = "default_redis_key_prefix")]
    pub key_prefix: String,
}

/// 内存存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Seconds between sweeps of expired keys; 0 disables the sweeper
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

/// 分享链接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Public origin used to build share URLs, e.g. `https://notes.example.com`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_site_name")]
    pub site_name: String,
    #[serde(default = "default_max_content_bytes")]
    pub max_content_bytes: usize,
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: u64,
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,
    #[serde(default = "default_slug_length")]
    pub slug_length: usize,
    #[serde(default = "default_max_slug_retries")]
    pub max_slug_retries: u32,
    #[serde(default)]
    pub default_expiry: ExpiryPreset,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_store_type() -> String {
    "memory".to_string()
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

fn default_redis_key_prefix() -> String {
    "notelink:".to_string()
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_site_name() -> String {
    "Notelink".to_string()
}

fn default_max_content_bytes() -> usize {
    50 * 1024
}

fn default_rate_limit_max() -> u64 {
    20
}

fn default_rate_limit_window_secs() -> u64 {
    3600
}

fn default_slug_length() -> usize {
    8
}

fn default_max_slug_retries() -> u32 {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: default_store_type(),
            redis: RedisConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_redis_key_prefix(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            site_name: default_site_name(),
            max_content_bytes: default_max_content_bytes(),
            rate_limit_max: default_rate_limit_max(),
            rate_limit_window_secs: default_rate_limit_window_secs(),
            slug_length: default_slug_length(),
            max_slug_retries: default_max_slug_retries(),
            default_expiry: ExpiryPreset::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_defaults() {
        let share = ShareConfig::default();
        assert_eq!(share.max_content_bytes, 51200);
        assert_eq!(share.rate_limit_max, 20);
        assert_eq!(share.rate_limit_window_secs, 3600);
        assert_eq!(share.slug_length, 8);
        assert_eq!(share.max_slug_retries, 3);
        assert_eq!(share.default_expiry, ExpiryPreset::SevenDays);
    }

    #[test]
    fn test_sample_config_round_trips_through_toml() {
        let sample = StaticConfig::generate_sample_config();
        assert!(sample.contains("[share]"));
        assert!(sample.contains("default_expiry = \"7d\""));

        let parsed: StaticConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.store.store_type, "memory");
        assert_eq!(parsed.share.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: StaticConfig = toml::from_str(
            r#"
            [share]
            base_url = "https://notes.example.com"
            default_expiry = "never"

            [store]
            type = "redis"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.share.base_url, "https://notes.example.com");
        assert_eq!(parsed.share.default_expiry, ExpiryPreset::Never);
        assert_eq!(parsed.share.rate_limit_max, 20);
        assert_eq!(parsed.store.store_type, "redis");
        assert_eq!(parsed.store.redis.key_prefix, "notelink:");
        assert_eq!(parsed.server.port, 8080);
    }
}
