use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::services::device::DeviceCategory;

/// TypeScript 类型导出路径（供前端仪表盘使用）
pub const TS_EXPORT_PATH: &str = "../dashboard/src/types.generated.ts";

/// 一个已登记的 URL 及其总扫描次数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedCode {
    pub code_id: String,
    pub target_url: String,
    pub total_count: u64,
    pub created_at: DateTime<Utc>,
}

/// 单个访客（按来源地址区分）的扫描统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct VisitorStat {
    pub signature: String,
    #[ts(type = "number")]
    pub count: u64,
    pub device: DeviceCategory,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// 全量列表中的一项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct CodeSummary {
    pub code_id: String,
    pub url: String,
    #[ts(type = "number")]
    pub count: u64,
}

/// 登记结果；`created = false` 表示 URL 已存在，复用原有 code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub code_id: String,
    pub total: u64,
    pub created: bool,
}

/// 一次扫描提交后的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReceipt {
    pub code_id: String,
    pub target_url: String,
    pub total: u64,
}
