//! code_visitors 表迁移
//!
//! 按 (code_id, signature) 记录每个访客的扫描次数和首次识别的设备类型。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CodeVisitors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CodeVisitors::CodeId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CodeVisitors::Signature)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CodeVisitors::ScanCount)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(CodeVisitors::Device)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CodeVisitors::FirstSeen)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CodeVisitors::LastSeen)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(CodeVisitors::CodeId)
                            .col(CodeVisitors::Signature),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_code_visitors_code_id")
                            .from(CodeVisitors::Table, CodeVisitors::CodeId)
                            .to(TrackedCodes::Table, TrackedCodes::CodeId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CodeVisitors::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CodeVisitors {
    #[sea_orm(iden = "code_visitors")]
    Table,
    CodeId,
    Signature,
    ScanCount,
    Device,
    FirstSeen,
    LastSeen,
}

#[derive(DeriveIden)]
enum TrackedCodes {
    #[sea_orm(iden = "tracked_codes")]
    Table,
    CodeId,
}
