//! Create principal table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Principal::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Principal::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Principal::Username).string_len(128).not_null())
                    .col(ColumnDef::new(Principal::DisplayName).string_len(256))
                    .col(
                        ColumnDef::new(Principal::Role)
                            .string_len(32)
                            .not_null()
                            .default("restricted"),
                    )
                    .col(
                        ColumnDef::new(Principal::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: username
        manager
            .create_index(
                Index::create()
                    .name("idx_principal_username")
                    .table(Principal::Table)
                    .col(Principal::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Principal::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Principal {
    Table,
    Id,
    Username,
    DisplayName,
    Role,
    CreatedAt,
}
