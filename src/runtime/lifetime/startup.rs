use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::api::services::PageContext;
use crate::config::StaticConfig;
use crate::services::{ShareService, ShareSettings};
use crate::storage::{KvStore, StoreFactory};

pub struct StartupContext {
    pub store: Arc<dyn KvStore>,
    pub share_service: Arc<ShareService>,
    pub page_context: PageContext,
}

/// 安装 rustls 加密提供者（rediss:// 连接需要）
///
/// 已安装时直接跳过，重复调用是安全的。
pub fn install_crypto_provider() {
    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}

/// 准备启动上下文：存储后端和分享服务
///
/// 服务器和 CLI 共用。
pub async fn prepare_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    install_crypto_provider();

    let store = StoreFactory::create(&config.store)
        .await
        .context("Failed to create store backend")?;
    info!("Using store backend: {}", store.backend_name());

    let settings = ShareSettings::from_config(&config.share);
    let page_context = PageContext::new(config.share.site_name.clone(), &settings.base_url);
    let share_service = Arc::new(ShareService::new(store.clone(), settings));

    debug!("Pre-startup completed in {:?}", start_time.elapsed());

    Ok(StartupContext {
        store,
        share_service,
        page_context,
    })
}
