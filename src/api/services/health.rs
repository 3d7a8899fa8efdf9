use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};
use ts_rs::TS;

use crate::api::response::json_response;
use crate::services::ScanService;
use crate::storage::models::TS_EXPORT_PATH;

/// 健康检查中存储探测的超时
const STORAGE_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

// 应用启动时间
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

impl AppStartTime {
    pub fn now() -> Self {
        Self {
            start_datetime: chrono::Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct HealthStorageCheck {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub codes_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    /// 运行秒数
    pub uptime: u32,
    pub storage: HealthStorageCheck,
    pub live_subscribers: u32,
    pub response_time_ms: u32,
}

/// Health Service
///
/// 只做轻量探测：统计 code 数量，不加载数据。
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        service: web::Data<Arc<ScanService>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> HttpResponse {
        let started = Instant::now();
        trace!("Received health check request");

        let backend = service.storage().backend_name().to_string();
        let storage = match tokio::time::timeout(STORAGE_PROBE_TIMEOUT, service.count_codes()).await
        {
            Ok(Ok(count)) => HealthStorageCheck {
                status: "healthy".to_string(),
                backend,
                codes_count: Some(count),
                error: None,
            },
            Ok(Err(e)) => {
                error!("Storage health check failed: {}", e);
                HealthStorageCheck {
                    status: "unhealthy".to_string(),
                    backend,
                    codes_count: None,
                    error: Some("database error".to_string()),
                }
            }
            Err(_) => {
                error!("Storage health check timeout");
                HealthStorageCheck {
                    status: "unhealthy".to_string(),
                    backend,
                    codes_count: None,
                    error: Some("timeout".to_string()),
                }
            }
        };

        let now = chrono::Utc::now();
        let uptime = (now - app_start_time.start_datetime).num_seconds().max(0) as u32;
        let is_healthy = storage.status == "healthy";

        let body = HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            timestamp: now.to_rfc3339(),
            uptime,
            storage,
            live_subscribers: service.broadcaster().subscriber_count() as u32,
            response_time_ms: started.elapsed().as_millis() as u32,
        };

        debug!(
            "Health check completed in {:?}, healthy: {}",
            started.elapsed(),
            is_healthy
        );

        let status = if is_healthy {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };
        json_response(status, &body)
    }
}
