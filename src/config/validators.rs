//! 配置值验证模块
//!
//! 启动时对静态配置做一次整体校验，非法配置直接拒绝启动。

use url::Url;

use super::StaticConfig;
use crate::errors::{NotelinkError, Result};

/// 支持的存储后端
pub const SUPPORTED_STORE_TYPES: [&str; 2] = ["memory", "redis"];

/// Slug 长度范围（过短会导致碰撞概率不可忽略）
pub const MIN_SLUG_LENGTH: usize = 6;
pub const MAX_SLUG_LENGTH: usize = 32;

/// Validate the whole static configuration
pub fn validate_config(config: &StaticConfig) -> Result<()> {
    validate_base_url(&config.share.base_url)?;

    let share = &config.share;
    if share.max_content_bytes == 0 {
        return Err(NotelinkError::config("share.max_content_bytes must be > 0"));
    }
    if share.rate_limit_max == 0 {
        return Err(NotelinkError::config("share.rate_limit_max must be > 0"));
    }
    if share.rate_limit_window_secs == 0 {
        return Err(NotelinkError::config(
            "share.rate_limit_window_secs must be > 0",
        ));
    }
    if !(MIN_SLUG_LENGTH..=MAX_SLUG_LENGTH).contains(&share.slug_length) {
        return Err(NotelinkError::config(format!(
            "share.slug_length must be between {} and {} (got {})",
            MIN_SLUG_LENGTH, MAX_SLUG_LENGTH, share.slug_length
        )));
    }
    if share.max_slug_retries == 0 {
        return Err(NotelinkError::config("share.max_slug_retries must be >= 1"));
    }

    let store_type = config.store.store_type.as_str();
    if !SUPPORTED_STORE_TYPES.contains(&store_type) {
        return Err(NotelinkError::store_plugin_not_found(format!(
            "Unknown store type '{}'. Valid: {}",
            store_type,
            SUPPORTED_STORE_TYPES.join(", ")
        )));
    }
    if store_type == "redis" && Url::parse(&config.store.redis.url).is_err() {
        return Err(NotelinkError::config(format!(
            "store.redis.url is not a valid URL: '{}'",
            config.store.redis.url
        )));
    }

    for origin in &config.server.cors_allowed_origins {
        validate_cors_origin(origin)?;
    }

    if !["text", "json"].contains(&config.logging.format.as_str()) {
        return Err(NotelinkError::config(format!(
            "logging.format must be 'text' or 'json' (got '{}')",
            config.logging.format
        )));
    }

    Ok(())
}

/// The base URL must be an absolute http(s) origin (an optional path prefix is allowed)
pub fn validate_base_url(base_url: &str) -> Result<()> {
    let parsed = Url::parse(base_url)
        .map_err(|e| NotelinkError::config(format!("Invalid share.base_url '{}': {}", base_url, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(NotelinkError::config(format!(
                "share.base_url must use http or https (got '{}')",
                other
            )));
        }
    }

    if parsed.host_str().is_none() {
        return Err(NotelinkError::config(format!(
            "share.base_url has no host: '{}'",
            base_url
        )));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(NotelinkError::config(
            "share.base_url must not contain a query string or fragment",
        ));
    }

    Ok(())
}

/// `*` or a bare `scheme://host[:port]` origin
pub fn validate_cors_origin(origin: &str) -> Result<()> {
    if origin == "*" {
        return Ok(());
    }
    let invalid = || {
        NotelinkError::config(format!(
            "server.cors_allowed_origins entry '{}' is not an origin (expected e.g. https://app.example.com)",
            origin
        ))
    };
    let parsed = Url::parse(origin).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https")
        || parsed.host_str().is_none()
        || origin.ends_with('/')
        || parsed.path() != "/"
    {
        return Err(invalid());
    }
    Ok(())
}
