//! Create `audit_record` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuditRecord::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AuditRecord::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(AuditRecord::ActorId).string_len(32).not_null())
                    .col(ColumnDef::new(AuditRecord::Action).string_len(64).not_null())
                    .col(ColumnDef::new(AuditRecord::TargetId).string_len(32))
                    .col(ColumnDef::new(AuditRecord::TargetKind).string_len(64))
                    .col(ColumnDef::new(AuditRecord::Detail).json_binary())
                    .col(
                        ColumnDef::new(AuditRecord::OccurredAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: actor_id (filter by actor)
        manager
            .create_index(
                Index::create()
                    .name("idx_audit_record_actor_id")
                    .table(AuditRecord::Table)
                    .col(AuditRecord::ActorId)
                    .to_owned(),
            )
            .await?;

        // Index: action (filter by kind)
        manager
            .create_index(
                Index::create()
                    .name("idx_audit_record_action")
                    .table(AuditRecord::Table)
                    .col(AuditRecord::Action)
                    .to_owned(),
            )
            .await?;

        // Index: occurred_at (range reads, descending order)
        manager
            .create_index(
                Index::create()
                    .name("idx_audit_record_occurred_at")
                    .table(AuditRecord::Table)
                    .col(AuditRecord::OccurredAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditRecord::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AuditRecord {
    Table,
    Id,
    ActorId,
    Action,
    TargetId,
    TargetKind,
    Detail,
    OccurredAt,
}
