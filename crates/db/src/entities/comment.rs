//! Comment entity.
//!
//! Append-only discussion log attached to a reviewable item. Submissions
//! and content revisions share this table via `thread_id`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[derive(Default)]
pub enum CommentKind {
    #[sea_orm(string_value = "general")]
    #[default]
    General,
    #[sea_orm(string_value = "feedback")]
    Feedback,
    #[sea_orm(string_value = "internal")]
    Internal,
    /// System-generated record of an approve/reject transition.
    #[sea_orm(string_value = "status_change")]
    StatusChange,
}

/// Comment model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Content item or external submission this comment belongs to.
    #[sea_orm(indexed)]
    pub thread_id: String,

    /// Principal that authored the comment.
    pub author_id: String,

    /// Comment text.
    #[sea_orm(column_type = "Text")]
    pub body: String,

    /// Kind of comment.
    pub kind: CommentKind,

    /// When the comment was created.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
