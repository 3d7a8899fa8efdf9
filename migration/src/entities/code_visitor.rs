//! Per-visitor scan counters, keyed by (code_id, signature)

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "code_visitors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub signature: String,
    pub scan_count: i64,
    /// 首次扫描时的设备类型，之后不再更新
    pub device: String,
    pub first_seen: DateTimeUtc,
    pub last_seen: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tracked_code::Entity",
        from = "Column::CodeId",
        to = "super::tracked_code::Column::CodeId"
    )]
    TrackedCode,
}

impl Related<super::tracked_code::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TrackedCode.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
