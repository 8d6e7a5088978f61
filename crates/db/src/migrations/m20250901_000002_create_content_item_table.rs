//! Create `content_item` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContentItem::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ContentItem::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(ContentItem::Title).text().not_null())
                    .col(ColumnDef::new(ContentItem::Body).text().not_null())
                    .col(ColumnDef::new(ContentItem::Excerpt).string_len(1024))
                    .col(ColumnDef::new(ContentItem::Tags).json_binary().not_null())
                    .col(ColumnDef::new(ContentItem::Category).string_len(128))
                    .col(ColumnDef::new(ContentItem::Featured).boolean().not_null().default(false))
                    .col(ColumnDef::new(ContentItem::HeroImageId).string_len(32))
                    .col(ColumnDef::new(ContentItem::AttachmentIds).json_binary().not_null())
                    .col(
                        ColumnDef::new(ContentItem::PublicationState)
                            .string_len(32)
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(ContentItem::ReviewState)
                            .string_len(32)
                            .not_null()
                            .default("none"),
                    )
                    .col(ColumnDef::new(ContentItem::PendingPatch).json_binary())
                    .col(ColumnDef::new(ContentItem::ChangeSummary).string_len(512))
                    .col(ColumnDef::new(ContentItem::RejectionReason).string_len(2000))
                    .col(
                        ColumnDef::new(ContentItem::RequiresReview)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ContentItem::CreatedBy).string_len(32).not_null())
                    .col(
                        ColumnDef::new(ContentItem::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(ContentItem::UpdatedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(ContentItem::PublishedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Index: review_state (reviewer queue)
        manager
            .create_index(
                Index::create()
                    .name("idx_content_item_review_state")
                    .table(ContentItem::Table)
                    .col(ContentItem::ReviewState)
                    .to_owned(),
            )
            .await?;

        // Index: publication_state
        manager
            .create_index(
                Index::create()
                    .name("idx_content_item_publication_state")
                    .table(ContentItem::Table)
                    .col(ContentItem::PublicationState)
                    .to_owned(),
            )
            .await?;

        // Index: updated_at (queue ordering)
        manager
            .create_index(
                Index::create()
                    .name("idx_content_item_updated_at")
                    .table(ContentItem::Table)
                    .col(ContentItem::UpdatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContentItem::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ContentItem {
    Table,
    Id,
    Title,
    Body,
    Excerpt,
    Tags,
    Category,
    Featured,
    HeroImageId,
    AttachmentIds,
    PublicationState,
    ReviewState,
    PendingPatch,
    ChangeSummary,
    RejectionReason,
    RequiresReview,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
    PublishedAt,
}
