//! Content item entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Publication lifecycle of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[derive(Default)]
pub enum PublicationState {
    #[sea_orm(string_value = "draft")]
    #[default]
    Draft,
    #[sea_orm(string_value = "published")]
    Published,
    #[sea_orm(string_value = "archived")]
    Archived,
}

/// Editorial review state of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[derive(Default)]
pub enum ReviewState {
    #[sea_orm(string_value = "none")]
    #[default]
    None,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Content item model.
///
/// Invariant: `pending_patch` is non-null iff `review_state` is `Pending`,
/// and `rejection_reason` is set only while `review_state` is `Rejected`.
/// When `publication_state` is `Published` the live fields always reflect
/// the last approved state, never an unmerged patch.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "content_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Display title.
    #[sea_orm(column_type = "Text")]
    pub title: String,

    /// Main body content.
    #[sea_orm(column_type = "Text")]
    pub body: String,

    /// Short teaser shown in list views.
    pub excerpt: Option<String>,

    /// Tag list (JSON array of strings).
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,

    /// Category slug.
    pub category: Option<String>,

    /// Whether the item is featured on the chapter front page.
    pub featured: bool,

    /// Hero image reference.
    pub hero_image_id: Option<String>,

    /// Attached file references (JSON array of strings).
    #[sea_orm(column_type = "JsonBinary")]
    pub attachment_ids: Json,

    /// Publication lifecycle state.
    #[sea_orm(indexed)]
    pub publication_state: PublicationState,

    /// Editorial review state.
    #[sea_orm(indexed)]
    pub review_state: ReviewState,

    /// Staged field-level diff awaiting review.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub pending_patch: Option<Json>,

    /// Summary derived from the pending patch keys, for list views.
    pub change_summary: Option<String>,

    /// Reviewer-provided reason for the last rejection.
    pub rejection_reason: Option<String>,

    /// True iff the item was last modified by a restricted principal.
    pub requires_review: bool,

    /// Principal that created the item.
    pub created_by: String,

    /// When the item was created.
    pub created_at: DateTimeWithTimeZone,

    /// When the item was last modified.
    pub updated_at: Option<DateTimeWithTimeZone>,

    /// When the item was first published.
    pub published_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
