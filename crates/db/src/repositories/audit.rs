//! Audit record repository.
//!
//! Append-only by construction: this type exposes insert and filtered
//! reads, and nothing else. The absence of update/delete methods is the
//! API-layer encoding of the immutability contract.

use std::sync::Arc;

use crate::entities::{audit_record, AuditRecord};
use chapterhub_common::{AppError, AppResult};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
};

/// Filter for audit trail reads.
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    /// Only records by this actor.
    pub actor_id: Option<String>,
    /// Only records of this action kind.
    pub action: Option<String>,
    /// Only records targeting this record.
    pub target_id: Option<String>,
    /// Only records at or after this instant.
    pub occurred_after: Option<DateTime<Utc>>,
    /// Only records before this instant.
    pub occurred_before: Option<DateTime<Utc>>,
}

/// Audit record repository for database operations.
#[derive(Clone)]
pub struct AuditRepository {
    db: Arc<DatabaseConnection>,
}

impl AuditRepository {
    /// Create a new audit repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append a new audit record.
    pub async fn insert(
        &self,
        model: audit_record::ActiveModel,
    ) -> AppResult<audit_record::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get audit records matching `filter`, newest first.
    pub async fn query(
        &self,
        filter: &AuditQuery,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<audit_record::Model>> {
        Self::apply_filter(AuditRecord::find(), filter)
            .order_by_desc(audit_record::Column::OccurredAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count audit records matching `filter`.
    pub async fn count(&self, filter: &AuditQuery) -> AppResult<u64> {
        Self::apply_filter(AuditRecord::find(), filter)
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn apply_filter(
        mut query: Select<AuditRecord>,
        filter: &AuditQuery,
    ) -> Select<AuditRecord> {
        if let Some(actor_id) = &filter.actor_id {
            query = query.filter(audit_record::Column::ActorId.eq(actor_id));
        }
        if let Some(action) = &filter.action {
            query = query.filter(audit_record::Column::Action.eq(action));
        }
        if let Some(target_id) = &filter.target_id {
            query = query.filter(audit_record::Column::TargetId.eq(target_id));
        }
        if let Some(after) = filter.occurred_after {
            query = query.filter(audit_record::Column::OccurredAt.gte(after));
        }
        if let Some(before) = filter.occurred_before {
            query = query.filter(audit_record::Column::OccurredAt.lt(before));
        }
        query
    }
}
