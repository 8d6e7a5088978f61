//! Audit trail service.
//!
//! Appends immutable action records for every privileged operation and
//! exposes filtered, paginated reads. Appends are best-effort: the audit
//! trail never blocks the business operation that triggered it.

use chapterhub_common::config::ReviewConfig;
use chapterhub_common::{AppError, AppResult, IdGenerator};
use chapterhub_db::entities::audit_record;
use chapterhub_db::repositories::{AuditQuery, AuditRepository, PrincipalRepository};
use sea_orm::Set;
use serde_json::Value;
use tracing::warn;

use super::access::capabilities_for;

/// Audit trail service.
#[derive(Clone)]
pub struct AuditTrailService {
    audit_repo: AuditRepository,
    principal_repo: PrincipalRepository,
    config: ReviewConfig,
    id_gen: IdGenerator,
}

impl AuditTrailService {
    /// Create a new audit trail service.
    #[must_use]
    pub const fn new(
        audit_repo: AuditRepository,
        principal_repo: PrincipalRepository,
        config: ReviewConfig,
    ) -> Self {
        Self {
            audit_repo,
            principal_repo,
            config,
            id_gen: IdGenerator::new(),
        }
    }

    /// Append an audit record for a committed action.
    ///
    /// Best-effort: a storage failure is logged and swallowed, returning
    /// `None`. Callers must only invoke this after the mutation the record
    /// describes has durably committed.
    pub async fn record(
        &self,
        actor_id: &str,
        action: &str,
        target_kind: Option<&str>,
        target_id: Option<&str>,
        detail: Option<Value>,
    ) -> Option<audit_record::Model> {
        let model = audit_record::ActiveModel {
            id: Set(self.id_gen.generate()),
            actor_id: Set(actor_id.to_string()),
            action: Set(action.to_string()),
            target_id: Set(target_id.map(String::from)),
            target_kind: Set(target_kind.map(String::from)),
            detail: Set(detail),
            occurred_at: Set(chrono::Utc::now().into()),
        };

        match self.audit_repo.insert(model).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(
                    actor_id,
                    action,
                    target_id = target_id.unwrap_or(""),
                    error = %e,
                    "Audit append failed; continuing without record"
                );
                None
            }
        }
    }

    /// Get audit records matching `filter`, newest first.
    ///
    /// Requires the viewer to hold the audit capability.
    pub async fn query(
        &self,
        viewer_id: &str,
        filter: &AuditQuery,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<audit_record::Model>> {
        self.require_viewer(viewer_id).await?;
        self.audit_repo
            .query(filter, self.clamp_limit(limit), offset)
            .await
    }

    /// Count audit records matching `filter`.
    pub async fn count(&self, viewer_id: &str, filter: &AuditQuery) -> AppResult<u64> {
        self.require_viewer(viewer_id).await?;
        self.audit_repo.count(filter).await
    }

    async fn require_viewer(&self, viewer_id: &str) -> AppResult<()> {
        let viewer = self.principal_repo.get_by_id(viewer_id).await?;
        if !capabilities_for(viewer.role).can_view_audit {
            return Err(AppError::PermissionDenied(
                "Viewing the audit trail requires the audit capability".to_string(),
            ));
        }
        Ok(())
    }

    fn clamp_limit(&self, limit: u64) -> u64 {
        if limit == 0 {
            self.config.default_page_size
        } else {
            limit.min(self.config.max_page_size)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chapterhub_db::entities::principal::{self, PrincipalRole};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, RuntimeErr};
    use std::sync::Arc;

    fn test_principal(id: &str, role: PrincipalRole) -> principal::Model {
        principal::Model {
            id: id.to_string(),
            username: id.to_string(),
            display_name: None,
            role,
            created_at: Utc::now().into(),
        }
    }

    fn test_record(id: &str, action: &str) -> audit_record::Model {
        audit_record::Model {
            id: id.to_string(),
            actor_id: "admin1".to_string(),
            action: action.to_string(),
            target_id: None,
            target_kind: None,
            detail: None,
            occurred_at: Utc::now().into(),
        }
    }

    fn service(db: sea_orm::DatabaseConnection) -> AuditTrailService {
        let db = Arc::new(db);
        AuditTrailService::new(
            AuditRepository::new(db.clone()),
            PrincipalRepository::new(db),
            ReviewConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_record_returns_inserted_record() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_record("rec1", "approve_content")]])
            .into_connection();

        let service = service(db);
        let result = service
            .record("admin1", "approve_content", Some("content_item"), Some("item1"), None)
            .await;

        assert!(result.is_some());
        assert_eq!(result.unwrap().action, "approve_content");
    }

    #[tokio::test]
    async fn test_record_swallows_storage_failure() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Exec(RuntimeErr::Internal(
                "connection refused".to_string(),
            ))])
            .into_connection();

        let service = service(db);
        let result = service
            .record("admin1", "approve_content", None, None, None)
            .await;

        // Degrades to a no-op instead of propagating.
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_query_requires_audit_capability() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_principal("rev1", PrincipalRole::Unrestricted)]])
            .into_connection();

        let service = service(db);
        let result = service.query("rev1", &AuditQuery::default(), 10, 0).await;

        assert!(matches!(result, Err(AppError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_query_returns_records_for_superuser() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_principal("root1", PrincipalRole::Superuser)]])
            .append_query_results([[
                test_record("rec2", "reject_content"),
                test_record("rec1", "approve_content"),
            ]])
            .into_connection();

        let service = service(db);
        let result = service
            .query("root1", &AuditQuery::default(), 10, 0)
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "rec2");
    }
}
