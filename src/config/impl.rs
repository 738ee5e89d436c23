use std::sync::{Arc, OnceLock};

use super::{StaticConfig, validate_config};
use crate::errors::Result;

static CONFIG: OnceLock<Arc<StaticConfig>> = OnceLock::new();

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get()
        .cloned()
        .expect("Config not initialized. Call init_config() first.")
}

/// Like [`get_config`], but `None` before initialization
pub fn try_get_config() -> Option<Arc<StaticConfig>> {
    CONFIG.get().cloned()
}

/// Initialize the global configuration
///
/// Loads and validates the configuration from `path` (missing file means
/// defaults plus environment overrides). Calling it again after a successful
/// initialization keeps the first configuration.
///
/// # Examples
/// ```no_run
/// use notelink::config::init_config;
/// init_config("config.toml").unwrap();
/// ```
pub fn init_config(path: &str) -> Result<Arc<StaticConfig>> {
    if let Some(existing) = try_get_config() {
        return Ok(existing);
    }

    let config = StaticConfig::load_from(path)?;
    validate_config(&config)?;

    Ok(CONFIG.get_or_init(|| Arc::new(config)).clone())
}
