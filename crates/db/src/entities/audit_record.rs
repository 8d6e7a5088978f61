//! Audit record entity.
//!
//! Append-only. Rows are inserted when a privileged action commits and are
//! never updated or deleted; the repository exposes insert and filtered
//! reads only.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Audit record model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_record")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Principal that performed the action.
    #[sea_orm(indexed)]
    pub actor_id: String,

    /// Action kind, e.g. `approve_content`.
    #[sea_orm(indexed)]
    pub action: String,

    /// Id of the acted-on record, if any.
    pub target_id: Option<String>,

    /// Kind of the acted-on record, e.g. `content_item`.
    pub target_kind: Option<String>,

    /// Free-form structured detail about the action.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub detail: Option<Json>,

    /// When the action occurred.
    #[sea_orm(indexed)]
    pub occurred_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
