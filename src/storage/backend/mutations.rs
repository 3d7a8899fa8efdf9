//! Mutation operations for SeaOrmStorage
//!
//! This module contains all write database operations.

use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ExprTrait, QueryFilter,
    TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use tracing::{debug, info, warn};

use super::converters::{generate_code_id, url_hash};
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, ScanlinkerError};
use crate::services::device::DeviceCategory;
use crate::storage::{Registration, ScanReceipt};

use migration::entities::{code_visitor, tracked_code};

impl SeaOrmStorage {
    /// 登记 URL；已存在时返回原有 code，不重置计数
    pub async fn insert_code(&self, url: &str) -> Result<Registration> {
        let hash = url_hash(url);

        if let Some(existing) = self.find_by_hash(&hash).await? {
            return reuse_existing(existing, url);
        }

        let code_id = generate_code_id();
        let model = tracked_code::ActiveModel {
            code_id: Set(code_id.clone()),
            target_url: Set(url.to_string()),
            url_hash: Set(hash.clone()),
            total_count: Set(0),
            created_at: Set(Utc::now()),
        };

        let db = &self.db;
        let inserted = retry::with_retry("insert_code", self.retry_config, || {
            let model = model.clone();
            async move {
                let result = tracked_code::Entity::insert(model)
                    .on_conflict(
                        OnConflict::column(tracked_code::Column::UrlHash)
                            .do_nothing_on([tracked_code::Column::UrlHash])
                            .to_owned(),
                    )
                    .exec(db)
                    .await;

                match result {
                    Ok(_) => Ok(true),
                    Err(DbErr::RecordNotInserted) => Ok(false),
                    Err(e) => Err(e),
                }
            }
        })
        .await
        .map_err(|e| ScanlinkerError::database_operation(format!("登记 URL 失败: {}", e)))?;

        if inserted {
            info!("Registered code {} for {}", code_id, url);
            return Ok(Registration {
                code_id,
                total: 0,
                created: true,
            });
        }

        // 并发登记同一 URL：另一请求先插入成功，读取其记录
        debug!("Concurrent registration for {}, re-reading winner", url);
        match self.find_by_hash(&hash).await? {
            Some(existing) => reuse_existing(existing, url),
            None => Err(ScanlinkerError::database_operation(format!(
                "登记 URL 失败: 冲突记录不可见 ({})",
                url
            ))),
        }
    }

    /// 记录一次扫描：总数与访客计数在同一事务内更新
    ///
    /// code 不存在时返回 `None`，不做任何写入。
    pub async fn record_scan(
        &self,
        code_id: &str,
        signature: &str,
        device: DeviceCategory,
    ) -> Result<Option<ScanReceipt>> {
        let db = &self.db;

        retry::with_retry(
            &format!("record_scan({})", code_id),
            self.retry_config,
            || record_scan_once(db, code_id, signature, device),
        )
        .await
        .map_err(|e| ScanlinkerError::database_operation(format!("记录扫描失败: {}", e)))
    }
}

fn reuse_existing(existing: tracked_code::Model, url: &str) -> Result<Registration> {
    if existing.target_url != url {
        warn!(
            "URL hash collision between {} and stored code {}",
            url, existing.code_id
        );
        return Err(ScanlinkerError::database_operation(format!(
            "URL 哈希冲突: {}",
            url
        )));
    }

    Ok(Registration {
        code_id: existing.code_id,
        total: Ord::max(existing.total_count, 0) as u64,
        created: false,
    })
}

async fn record_scan_once(
    db: &DatabaseConnection,
    code_id: &str,
    signature: &str,
    device: DeviceCategory,
) -> std::result::Result<Option<ScanReceipt>, DbErr> {
    let txn = db.begin().await?;

    // 先写总数：在 PostgreSQL/MySQL 上锁住该行，串行化同一 code 的并发扫描
    let updated = tracked_code::Entity::update_many()
        .col_expr(
            tracked_code::Column::TotalCount,
            Expr::col(tracked_code::Column::TotalCount).add(1),
        )
        .filter(tracked_code::Column::CodeId.eq(code_id))
        .exec(&txn)
        .await?;

    if updated.rows_affected == 0 {
        txn.rollback().await?;
        return Ok(None);
    }

    let now = Utc::now();
    let visitor = code_visitor::ActiveModel {
        code_id: Set(code_id.to_string()),
        signature: Set(signature.to_string()),
        scan_count: Set(1),
        device: Set(device.as_ref().to_string()),
        first_seen: Set(now),
        last_seen: Set(now),
    };

    // 冲突时只累加次数并刷新 last_seen；device 保持首次值
    code_visitor::Entity::insert(visitor)
        .on_conflict(
            OnConflict::columns([code_visitor::Column::CodeId, code_visitor::Column::Signature])
                .value(
                    code_visitor::Column::ScanCount,
                    Expr::col((code_visitor::Entity, code_visitor::Column::ScanCount)).add(1),
                )
                .update_column(code_visitor::Column::LastSeen)
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    let Some(row) = tracked_code::Entity::find_by_id(code_id.to_string())
        .one(&txn)
        .await?
    else {
        txn.rollback().await?;
        return Ok(None);
    };

    txn.commit().await?;

    Ok(Some(ScanReceipt {
        code_id: row.code_id,
        target_url: row.target_url,
        total: Ord::max(row.total_count, 0) as u64,
    }))
}
