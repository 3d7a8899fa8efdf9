//! Tracked code entity: one row per registered URL

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "tracked_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code_id: String,
    #[sea_orm(column_type = "Text")]
    pub target_url: String,
    #[sea_orm(unique)]
    pub url_hash: String, // CHAR(16) xxHash64 hex of target_url
    pub total_count: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::code_visitor::Entity")]
    CodeVisitor,
}

impl Related<super::code_visitor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CodeVisitor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
