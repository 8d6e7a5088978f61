//! Principal entity.
//!
//! A principal is an authenticated actor in the editorial pipeline. The
//! role is fixed for the lifetime of a session; every capability check is
//! a pure function of it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[derive(Default)]
pub enum PrincipalRole {
    /// Edits to shared published content are staged for review.
    #[sea_orm(string_value = "restricted")]
    #[default]
    Restricted,
    /// Writes directly, reviews staged revisions, deletes content.
    #[sea_orm(string_value = "unrestricted")]
    Unrestricted,
    /// Unrestricted plus access to the audit trail.
    #[sea_orm(string_value = "superuser")]
    Superuser,
}

/// Principal model.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "principal")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Login name, unique per chapter.
    #[sea_orm(unique)]
    pub username: String,
    /// Display name shown in editorial views.
    pub display_name: Option<String>,
    /// Role determining the capability set.
    pub role: PrincipalRole,
    /// When the principal was created.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
