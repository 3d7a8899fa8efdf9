use xxhash_rust::xxh64::xxh64;

use crate::services::device::parse_device;
use crate::storage::{TrackedCode, VisitorStat};
use migration::entities::{code_visitor, tracked_code};

/// 将 tracked_code Model 转换为 TrackedCode
pub fn model_to_tracked_code(model: tracked_code::Model) -> TrackedCode {
    TrackedCode {
        code_id: model.code_id,
        target_url: model.target_url,
        total_count: model.total_count.max(0) as u64,
        created_at: model.created_at,
    }
}

/// 将 code_visitor Model 转换为 VisitorStat
pub fn model_to_visitor_stat(model: code_visitor::Model) -> VisitorStat {
    VisitorStat {
        signature: model.signature,
        count: model.scan_count.max(0) as u64,
        device: parse_device(&model.device),
        first_seen: model.first_seen,
        last_seen: model.last_seen,
    }
}

/// URL 去重键：xxHash64 的 16 位十六进制
pub fn url_hash(url: &str) -> String {
    format!("{:016x}", xxh64(url.as_bytes(), 0))
}

/// 生成新的 code id（32 位小写十六进制）
pub fn generate_code_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
