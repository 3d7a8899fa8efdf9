//! tracked_codes 表迁移
//!
//! 每个登记的 URL 对应一行，url_hash 上的唯一索引作为去重键。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TrackedCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TrackedCodes::CodeId)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TrackedCodes::TargetUrl).text().not_null())
                    .col(
                        ColumnDef::new(TrackedCodes::UrlHash)
                            .char_len(16) // xxHash64 hex 表示
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrackedCodes::TotalCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TrackedCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // TEXT 列在 MySQL 上无法直接建唯一索引，所以对 hash 建
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tracked_codes_url_hash")
                    .table(TrackedCodes::Table)
                    .col(TrackedCodes::UrlHash)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_tracked_codes_url_hash")
                    .table(TrackedCodes::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(TrackedCodes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TrackedCodes {
    #[sea_orm(iden = "tracked_codes")]
    Table,
    CodeId,
    TargetUrl,
    UrlHash,
    TotalCount,
    CreatedAt,
}
