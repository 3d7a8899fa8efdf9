use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::get_config;
use crate::services::{LiveHub, ScanService, UpdateBroadcaster};
use crate::storage::{SeaOrmStorage, StorageFactory};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub live_hub: Arc<LiveHub>,
    pub scan_service: Arc<ScanService>,
}

/// 准备服务器启动的上下文：连接存储并执行迁移、创建推送中心和业务服务
///
/// 存储连接或迁移失败直接返回错误，由调用方终止进程。
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = Instant::now();
    debug!("Starting pre-startup processing...");

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let config = get_config();
    let live_hub = Arc::new(LiveHub::new(config.live.channel_capacity));
    let broadcaster: Arc<dyn UpdateBroadcaster> = live_hub.clone();
    let scan_service = Arc::new(ScanService::new(storage.clone(), broadcaster));

    match scan_service.count_codes().await {
        Ok(count) => info!("{} tracked codes in store", count),
        Err(e) => warn!("Could not count tracked codes: {}", e),
    }

    debug!(
        "Pre-startup processing completed in {:?}",
        start_time.elapsed()
    );

    Ok(StartupContext {
        storage,
        live_hub,
        scan_service,
    })
}
