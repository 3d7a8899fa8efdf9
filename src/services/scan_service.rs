//! Scan tracking service
//!
//! Business logic shared by the HTTP handlers: URL registration, scan
//! aggregation with live fan-out, and the read-only statistics queries.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, instrument};

use crate::config::get_config;
use crate::errors::{Result, ScanlinkerError};
use crate::services::broadcast::{ScanUpdate, UpdateBroadcaster};
use crate::services::device::DeviceCategory;
use crate::storage::{CodeSummary, Registration, ScanReceipt, SeaOrmStorage, TrackedCode, VisitorStat};
use crate::utils::url_validator::normalize_url;

/// Service for code registration, scan counting and statistics
pub struct ScanService {
    storage: Arc<SeaOrmStorage>,
    broadcaster: Arc<dyn UpdateBroadcaster>,
    timeout: Duration,
}

impl ScanService {
    pub fn new(storage: Arc<SeaOrmStorage>, broadcaster: Arc<dyn UpdateBroadcaster>) -> Self {
        let timeout = Duration::from_secs(get_config().database.timeout.max(1));
        Self {
            storage,
            broadcaster,
            timeout,
        }
    }

    pub fn storage(&self) -> &Arc<SeaOrmStorage> {
        &self.storage
    }

    pub fn broadcaster(&self) -> &Arc<dyn UpdateBroadcaster> {
        &self.broadcaster
    }

    /// 为存储调用加上超时
    async fn bounded<T>(&self, operation: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                error!("{} timed out after {:?}", operation, self.timeout);
                Err(ScanlinkerError::database_operation(format!(
                    "{} timed out after {:?}",
                    operation, self.timeout
                )))
            }
        }
    }

    /// Register a URL, reusing the existing code when the URL is known
    pub async fn register_url(&self, url: &str) -> Result<Registration> {
        let url = normalize_url(url)?;
        let registration = self
            .bounded("register_url", self.storage.insert_code(&url))
            .await?;

        if !registration.created {
            info!(
                "Reusing code {} for already registered URL",
                registration.code_id
            );
        }
        Ok(registration)
    }

    /// Count one scan and notify live subscribers
    ///
    /// The total and the visitor counter change together or not at all.
    /// An unknown code is `NotFound` and publishes nothing.
    #[instrument(skip(self))]
    pub async fn register_scan(
        &self,
        code_id: &str,
        signature: &str,
        device: DeviceCategory,
    ) -> Result<ScanReceipt> {
        let receipt = self
            .bounded(
                "register_scan",
                self.storage.record_scan(code_id, signature, device),
            )
            .await?
            .ok_or_else(|| not_found(code_id))?;

        self.broadcaster.publish(ScanUpdate {
            code_id: receipt.code_id.clone(),
            scan_count: receipt.total,
        });

        Ok(receipt)
    }

    pub async fn get_code(&self, code_id: &str) -> Result<TrackedCode> {
        self.bounded("get_code", self.storage.get_code(code_id))
            .await?
            .ok_or_else(|| not_found(code_id))
    }

    pub async fn get_total(&self, code_id: &str) -> Result<u64> {
        self.bounded("get_total", self.storage.get_total(code_id))
            .await?
            .ok_or_else(|| not_found(code_id))
    }

    /// Visitors of a code, oldest first
    pub async fn get_visitors(&self, code_id: &str) -> Result<Vec<VisitorStat>> {
        self.bounded("get_visitors", self.storage.list_visitors(code_id))
            .await?
            .ok_or_else(|| not_found(code_id))
    }

    pub async fn list_all(&self) -> Result<Vec<CodeSummary>> {
        self.bounded("list_all", self.storage.list_summaries()).await
    }

    /// Number of registered codes (health probe)
    pub async fn count_codes(&self) -> Result<u64> {
        self.bounded("count_codes", self.storage.count_codes()).await
    }
}

fn not_found(code_id: &str) -> ScanlinkerError {
    ScanlinkerError::not_found(format!("Code not found: {}", code_id))
}
