//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::{debug, error};

use super::converters::{model_to_tracked_code, model_to_visitor_stat};
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, ScanlinkerError};
use crate::storage::{CodeSummary, TrackedCode, VisitorStat};

use migration::entities::{code_visitor, tracked_code};

impl SeaOrmStorage {
    pub async fn get_code(&self, code_id: &str) -> Result<Option<TrackedCode>> {
        let db = &self.db;

        let model = retry::with_retry(&format!("get_code({})", code_id), self.retry_config, || {
            tracked_code::Entity::find_by_id(code_id.to_string()).one(db)
        })
        .await
        .map_err(|e| {
            error!("查询 code 失败（重试后仍失败）: {}", e);
            ScanlinkerError::database_operation(format!("查询 code 失败: {}", e))
        })?;

        Ok(model.map(model_to_tracked_code))
    }

    pub(super) async fn find_by_hash(&self, hash: &str) -> Result<Option<tracked_code::Model>> {
        tracked_code::Entity::find()
            .filter(tracked_code::Column::UrlHash.eq(hash))
            .one(&self.db)
            .await
            .map_err(|e| ScanlinkerError::database_operation(format!("按 URL 查询失败: {}", e)))
    }

    pub async fn get_total(&self, code_id: &str) -> Result<Option<u64>> {
        let total = tracked_code::Entity::find_by_id(code_id.to_string())
            .select_only()
            .column(tracked_code::Column::TotalCount)
            .into_tuple::<i64>()
            .one(&self.db)
            .await
            .map_err(|e| ScanlinkerError::database_operation(format!("查询扫描总数失败: {}", e)))?;

        Ok(total.map(|t| t.max(0) as u64))
    }

    /// 列出某个 code 的全部访客，按首次扫描时间排序
    ///
    /// code 不存在时返回 `None`，与“存在但没有访客”区分开。
    pub async fn list_visitors(&self, code_id: &str) -> Result<Option<Vec<VisitorStat>>> {
        if self.get_total(code_id).await?.is_none() {
            return Ok(None);
        }

        let db = &self.db;
        let models = retry::with_retry(
            &format!("list_visitors({})", code_id),
            self.retry_config,
            || {
                code_visitor::Entity::find()
                    .filter(code_visitor::Column::CodeId.eq(code_id))
                    .order_by_asc(code_visitor::Column::FirstSeen)
                    .order_by_asc(code_visitor::Column::Signature)
                    .all(db)
            },
        )
        .await
        .map_err(|e| ScanlinkerError::database_operation(format!("查询访客列表失败: {}", e)))?;

        debug!("Loaded {} visitors for code {}", models.len(), code_id);
        Ok(Some(models.into_iter().map(model_to_visitor_stat).collect()))
    }

    /// 列出全部 code 及其扫描总数（不分页）
    pub async fn list_summaries(&self) -> Result<Vec<CodeSummary>> {
        let rows = tracked_code::Entity::find()
            .select_only()
            .column(tracked_code::Column::CodeId)
            .column(tracked_code::Column::TargetUrl)
            .column(tracked_code::Column::TotalCount)
            .order_by_asc(tracked_code::Column::CreatedAt)
            .order_by_asc(tracked_code::Column::CodeId)
            .into_tuple::<(String, String, i64)>()
            .all(&self.db)
            .await
            .map_err(|e| ScanlinkerError::database_operation(format!("加载 code 列表失败: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|(code_id, url, count)| CodeSummary {
                code_id,
                url,
                count: count.max(0) as u64,
            })
            .collect())
    }

    /// code 总数（健康检查使用）
    pub async fn count_codes(&self) -> Result<u64> {
        tracked_code::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| ScanlinkerError::database_operation(format!("统计 code 数量失败: {}", e)))
    }
}
