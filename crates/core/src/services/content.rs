//! Content approval state machine.
//!
//! Owns the lifecycle of a content item under review: staging a revision,
//! approving (merge and publish), rejecting (discard with a reason),
//! direct writes, and deletion. Every transition commits through a
//! per-item conditional write on the observed review state, so of two
//! concurrent reviewers exactly one wins and the loser sees a
//! precondition failure it can resolve by refetching.

use chapterhub_common::config::ReviewConfig;
use chapterhub_common::{AppError, AppResult, IdGenerator};
use chapterhub_db::entities::content_item::{self, PublicationState, ReviewState};
use chapterhub_db::repositories::{ContentRepository, PrincipalRepository};
use sea_orm::Set;
use serde_json::json;
use validator::Validate;

use super::access::{capabilities_for, Capabilities};
use super::audit::AuditTrailService;
use super::comment::CommentService;
use super::revision::{
    apply_patch, compute_diff, patch_from_json, patch_to_json, summarize, ContentFields,
};

const TARGET_KIND: &str = "content_item";

/// Content approval service.
#[derive(Clone)]
pub struct ContentService {
    content_repo: ContentRepository,
    principal_repo: PrincipalRepository,
    audit: AuditTrailService,
    comments: CommentService,
    config: ReviewConfig,
    id_gen: IdGenerator,
}

impl ContentService {
    /// Create a new content service.
    #[must_use]
    pub const fn new(
        content_repo: ContentRepository,
        principal_repo: PrincipalRepository,
        audit: AuditTrailService,
        comments: CommentService,
        config: ReviewConfig,
    ) -> Self {
        Self {
            content_repo,
            principal_repo,
            audit,
            comments,
            config,
            id_gen: IdGenerator::new(),
        }
    }

    // ========== Writes ==========

    /// Create a new content item in `draft`.
    pub async fn create(
        &self,
        actor_id: &str,
        fields: ContentFields,
    ) -> AppResult<content_item::Model> {
        let caps = self.actor_caps(actor_id).await?;
        validate_fields(&fields)?;

        let now = chrono::Utc::now();
        let model = content_item::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(fields.title),
            body: Set(fields.body),
            excerpt: Set(fields.excerpt),
            tags: Set(json!(fields.tags)),
            category: Set(fields.category),
            featured: Set(fields.featured),
            hero_image_id: Set(fields.hero_image_id),
            attachment_ids: Set(json!(fields.attachment_ids)),
            publication_state: Set(PublicationState::Draft),
            review_state: Set(ReviewState::None),
            pending_patch: Set(None),
            change_summary: Set(None),
            rejection_reason: Set(None),
            requires_review: Set(!caps.can_write_direct),
            created_by: Set(actor_id.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(None),
            published_at: Set(None),
        };

        let item = self.content_repo.create(model).await?;
        self.audit
            .record(actor_id, "create_content", Some(TARGET_KIND), Some(&item.id), None)
            .await;
        Ok(item)
    }

    /// Stage a proposed revision for review.
    ///
    /// Only principals without direct write access stage; the proposed
    /// state is diffed against live fields and stored as a pending patch
    /// without touching the live fields. Staging over an already-pending
    /// item replaces the previous patch wholesale.
    pub async fn stage(
        &self,
        actor_id: &str,
        item_id: &str,
        proposed: ContentFields,
    ) -> AppResult<content_item::Model> {
        let caps = self.actor_caps(actor_id).await?;
        if caps.can_write_direct {
            return Err(AppError::PermissionDenied(
                "Principals with direct write access must use write_direct".to_string(),
            ));
        }
        validate_fields(&proposed)?;

        let item = self.content_repo.get_by_id(item_id).await?;
        let live = ContentFields::from_model(&item);
        let patch = compute_diff(&live, &proposed);
        if patch.is_empty() {
            return Err(AppError::Validation(
                "Proposed revision contains no changes".to_string(),
            ));
        }
        let summary = summarize(&patch);

        let update = content_item::ActiveModel {
            pending_patch: Set(Some(patch_to_json(&patch)?)),
            change_summary: Set(Some(summary.clone())),
            review_state: Set(ReviewState::Pending),
            requires_review: Set(true),
            rejection_reason: Set(None),
            updated_at: Set(Some(chrono::Utc::now().into())),
            ..Default::default()
        };

        let committed = self
            .content_repo
            .update_where_review_state(item_id, item.review_state, update)
            .await?;
        if !committed {
            return Err(AppError::PreconditionFailed(
                "Content item changed state while staging".to_string(),
            ));
        }

        self.audit
            .record(
                actor_id,
                "stage_revision",
                Some(TARGET_KIND),
                Some(item_id),
                Some(json!({ "summary": summary })),
            )
            .await;

        self.content_repo.get_by_id(item_id).await
    }

    /// Approve the pending revision: merge the patch into live fields and
    /// publish.
    ///
    /// The stored patch's recorded `from` values are re-validated against
    /// live fields first; a drifted field refuses the merge with a
    /// conflict instead of overwriting newer state.
    pub async fn approve(&self, actor_id: &str, item_id: &str) -> AppResult<content_item::Model> {
        let caps = self.actor_caps(actor_id).await?;
        if !caps.can_review {
            return Err(AppError::PermissionDenied(
                "Approving a revision requires the review capability".to_string(),
            ));
        }

        let item = self.content_repo.get_by_id(item_id).await?;
        if item.review_state != ReviewState::Pending {
            return Err(AppError::PreconditionFailed(
                "Only pending revisions can be approved".to_string(),
            ));
        }
        let stored = item
            .pending_patch
            .as_ref()
            .ok_or_else(|| AppError::Internal("Pending item is missing its patch".to_string()))?;
        let patch = patch_from_json(stored)?;
        let live = ContentFields::from_model(&item);
        let merged = apply_patch(&live, &patch)?;
        let summary = item
            .change_summary
            .clone()
            .unwrap_or_else(|| summarize(&patch));

        let now = chrono::Utc::now();
        let mut update = content_item::ActiveModel {
            title: Set(merged.title),
            body: Set(merged.body),
            excerpt: Set(merged.excerpt),
            tags: Set(json!(merged.tags)),
            category: Set(merged.category),
            featured: Set(merged.featured),
            hero_image_id: Set(merged.hero_image_id),
            attachment_ids: Set(json!(merged.attachment_ids)),
            publication_state: Set(PublicationState::Published),
            review_state: Set(ReviewState::Approved),
            pending_patch: Set(None),
            requires_review: Set(false),
            updated_at: Set(Some(now.into())),
            ..Default::default()
        };
        if item.published_at.is_none() {
            update.published_at = Set(Some(now.into()));
        }

        let committed = self
            .content_repo
            .update_where_review_state(item_id, ReviewState::Pending, update)
            .await?;
        if !committed {
            return Err(AppError::PreconditionFailed(
                "Revision was already reviewed".to_string(),
            ));
        }

        self.audit
            .record(
                actor_id,
                "approve_content",
                Some(TARGET_KIND),
                Some(item_id),
                Some(json!({ "summary": summary })),
            )
            .await;
        self.comments
            .add_status_change(
                actor_id,
                item_id,
                &format!("Revision approved and published ({summary})"),
            )
            .await;

        self.content_repo.get_by_id(item_id).await
    }

    /// Reject the pending revision, discarding the patch.
    ///
    /// Live fields are untouched; the reason is stored on the item.
    pub async fn reject(
        &self,
        actor_id: &str,
        item_id: &str,
        reason: &str,
    ) -> AppResult<content_item::Model> {
        let caps = self.actor_caps(actor_id).await?;
        if !caps.can_review {
            return Err(AppError::PermissionDenied(
                "Rejecting a revision requires the review capability".to_string(),
            ));
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation(
                "Rejection reason is required".to_string(),
            ));
        }

        let item = self.content_repo.get_by_id(item_id).await?;
        if item.review_state != ReviewState::Pending {
            return Err(AppError::PreconditionFailed(
                "Only pending revisions can be rejected".to_string(),
            ));
        }

        let update = content_item::ActiveModel {
            review_state: Set(ReviewState::Rejected),
            rejection_reason: Set(Some(reason.to_string())),
            pending_patch: Set(None),
            updated_at: Set(Some(chrono::Utc::now().into())),
            ..Default::default()
        };

        let committed = self
            .content_repo
            .update_where_review_state(item_id, ReviewState::Pending, update)
            .await?;
        if !committed {
            return Err(AppError::PreconditionFailed(
                "Revision was already reviewed".to_string(),
            ));
        }

        self.audit
            .record(
                actor_id,
                "reject_content",
                Some(TARGET_KIND),
                Some(item_id),
                Some(json!({ "reason": reason })),
            )
            .await;
        self.comments
            .add_status_change(actor_id, item_id, &format!("Revision rejected: {reason}"))
            .await;

        self.content_repo.get_by_id(item_id).await
    }

    /// Replace live fields wholesale, bypassing review.
    pub async fn write_direct(
        &self,
        actor_id: &str,
        item_id: &str,
        proposed: ContentFields,
    ) -> AppResult<content_item::Model> {
        let caps = self.actor_caps(actor_id).await?;
        if !caps.can_write_direct {
            return Err(AppError::PermissionDenied(
                "Writing content directly requires the direct write capability".to_string(),
            ));
        }
        validate_fields(&proposed)?;

        let item = self.content_repo.get_by_id(item_id).await?;

        let update = content_item::ActiveModel {
            title: Set(proposed.title),
            body: Set(proposed.body),
            excerpt: Set(proposed.excerpt),
            tags: Set(json!(proposed.tags)),
            category: Set(proposed.category),
            featured: Set(proposed.featured),
            hero_image_id: Set(proposed.hero_image_id),
            attachment_ids: Set(json!(proposed.attachment_ids)),
            review_state: Set(ReviewState::None),
            pending_patch: Set(None),
            change_summary: Set(None),
            rejection_reason: Set(None),
            requires_review: Set(false),
            updated_at: Set(Some(chrono::Utc::now().into())),
            ..Default::default()
        };

        let committed = self
            .content_repo
            .update_where_review_state(item_id, item.review_state, update)
            .await?;
        if !committed {
            return Err(AppError::PreconditionFailed(
                "Content item changed state during the write".to_string(),
            ));
        }

        self.audit
            .record(actor_id, "update_content", Some(TARGET_KIND), Some(item_id), None)
            .await;

        self.content_repo.get_by_id(item_id).await
    }

    /// Permanently delete a content item.
    ///
    /// Restricted principals are denied regardless of ownership.
    pub async fn delete(&self, actor_id: &str, item_id: &str) -> AppResult<()> {
        let caps = self.actor_caps(actor_id).await?;
        if !caps.can_delete {
            return Err(AppError::PermissionDenied(
                "Deleting content requires the delete capability".to_string(),
            ));
        }

        self.content_repo.delete(item_id).await?;

        self.audit
            .record(actor_id, "delete_content", Some(TARGET_KIND), Some(item_id), None)
            .await;
        Ok(())
    }

    /// Shelve a content item.
    pub async fn archive(&self, actor_id: &str, item_id: &str) -> AppResult<content_item::Model> {
        let caps = self.actor_caps(actor_id).await?;
        if !caps.can_write_direct {
            return Err(AppError::PermissionDenied(
                "Archiving content requires the direct write capability".to_string(),
            ));
        }

        let item = self.content_repo.get_by_id(item_id).await?;
        if item.publication_state == PublicationState::Archived {
            return Err(AppError::PreconditionFailed(
                "Content item is already archived".to_string(),
            ));
        }

        let mut model: content_item::ActiveModel = item.into();
        model.publication_state = Set(PublicationState::Archived);
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        let updated = self.content_repo.update(model).await?;
        self.audit
            .record(actor_id, "archive_content", Some(TARGET_KIND), Some(item_id), None)
            .await;
        Ok(updated)
    }

    /// Restore an archived content item.
    ///
    /// Previously published items return to `published`; never-published
    /// items return to `draft`.
    pub async fn unarchive(
        &self,
        actor_id: &str,
        item_id: &str,
    ) -> AppResult<content_item::Model> {
        let caps = self.actor_caps(actor_id).await?;
        if !caps.can_write_direct {
            return Err(AppError::PermissionDenied(
                "Restoring content requires the direct write capability".to_string(),
            ));
        }

        let item = self.content_repo.get_by_id(item_id).await?;
        if item.publication_state != PublicationState::Archived {
            return Err(AppError::PreconditionFailed(
                "Content item is not archived".to_string(),
            ));
        }

        let restored_state = if item.published_at.is_some() {
            PublicationState::Published
        } else {
            PublicationState::Draft
        };

        let mut model: content_item::ActiveModel = item.into();
        model.publication_state = Set(restored_state);
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        let updated = self.content_repo.update(model).await?;
        self.audit
            .record(actor_id, "unarchive_content", Some(TARGET_KIND), Some(item_id), None)
            .await;
        Ok(updated)
    }

    // ========== Reads ==========

    /// Get a content item by ID.
    pub async fn get(&self, item_id: &str) -> AppResult<content_item::Model> {
        self.content_repo.get_by_id(item_id).await
    }

    /// Get the reviewer queue: items awaiting review, most recently
    /// touched first.
    pub async fn list_pending(
        &self,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<content_item::Model>> {
        self.content_repo
            .list_pending(self.clamp_limit(limit), offset)
            .await
    }

    /// Count items awaiting review.
    pub async fn count_pending(&self) -> AppResult<u64> {
        self.content_repo.count_pending().await
    }

    /// Get items in a given review state.
    pub async fn list_by_review_state(
        &self,
        state: ReviewState,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<content_item::Model>> {
        self.content_repo
            .list_by_review_state(state, self.clamp_limit(limit), offset)
            .await
    }

    // ========== Helpers ==========

    async fn actor_caps(&self, actor_id: &str) -> AppResult<Capabilities> {
        let actor = self.principal_repo.get_by_id(actor_id).await?;
        Ok(capabilities_for(actor.role))
    }

    fn clamp_limit(&self, limit: u64) -> u64 {
        if limit == 0 {
            self.config.default_page_size
        } else {
            limit.min(self.config.max_page_size)
        }
    }
}

fn validate_fields(fields: &ContentFields) -> AppResult<()> {
    fields.validate()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chapterhub_db::entities::principal::{self, PrincipalRole};
    use chapterhub_db::entities::{audit_record, comment};
    use chapterhub_db::repositories::{AuditRepository, CommentRepository};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn restricted(id: &str) -> principal::Model {
        principal::Model {
            id: id.to_string(),
            username: id.to_string(),
            display_name: None,
            role: PrincipalRole::Restricted,
            created_at: Utc::now().into(),
        }
    }

    fn reviewer(id: &str) -> principal::Model {
        principal::Model {
            role: PrincipalRole::Unrestricted,
            ..restricted(id)
        }
    }

    fn published_item(id: &str, title: &str) -> content_item::Model {
        content_item::Model {
            id: id.to_string(),
            title: title.to_string(),
            body: "Original body".to_string(),
            excerpt: None,
            tags: json!(["chapter"]),
            category: Some("news".to_string()),
            featured: false,
            hero_image_id: None,
            attachment_ids: json!([]),
            publication_state: PublicationState::Published,
            review_state: ReviewState::None,
            pending_patch: None,
            change_summary: None,
            rejection_reason: None,
            requires_review: false,
            created_by: "bob".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
            published_at: Some(Utc::now().into()),
        }
    }

    fn pending_item(id: &str, live_title: &str, proposed_title: &str) -> content_item::Model {
        content_item::Model {
            review_state: ReviewState::Pending,
            pending_patch: Some(json!({
                "title": { "from": live_title, "to": proposed_title }
            })),
            change_summary: Some("title changed".to_string()),
            requires_review: true,
            ..published_item(id, live_title)
        }
    }

    fn audit_stub(action: &str) -> audit_record::Model {
        audit_record::Model {
            id: "rec1".to_string(),
            actor_id: "actor".to_string(),
            action: action.to_string(),
            target_id: Some("item1".to_string()),
            target_kind: Some("content_item".to_string()),
            detail: None,
            occurred_at: Utc::now().into(),
        }
    }

    fn comment_stub() -> comment::Model {
        comment::Model {
            id: "c1".to_string(),
            thread_id: "item1".to_string(),
            author_id: "actor".to_string(),
            body: "Revision approved and published (title changed)".to_string(),
            kind: comment::CommentKind::StatusChange,
            created_at: Utc::now().into(),
        }
    }

    fn exec_ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    fn exec_noop() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }
    }

    /// Each repository gets its own mock connection so result queues do
    /// not interleave across concerns.
    fn service(
        content_db: DatabaseConnection,
        principal_db: DatabaseConnection,
        audit_db: DatabaseConnection,
        comment_db: DatabaseConnection,
    ) -> ContentService {
        let audit_db = Arc::new(audit_db);
        let audit = AuditTrailService::new(
            AuditRepository::new(audit_db.clone()),
            PrincipalRepository::new(audit_db),
            ReviewConfig::default(),
        );
        let comments = CommentService::new(
            CommentRepository::new(Arc::new(comment_db)),
            ReviewConfig::default(),
        );
        ContentService::new(
            ContentRepository::new(Arc::new(content_db)),
            PrincipalRepository::new(Arc::new(principal_db)),
            audit,
            comments,
            ReviewConfig::default(),
        )
    }

    fn empty() -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres).into_connection()
    }

    #[tokio::test]
    async fn test_stage_by_restricted_stores_patch_without_touching_live() {
        let live = published_item("item1", "A");
        let staged = pending_item("item1", "A", "B");

        let principal_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[restricted("alice")]])
            .into_connection();
        let content_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[live.clone()]])
            .append_exec_results([exec_ok()])
            .append_query_results([[staged]])
            .into_connection();
        let audit_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[audit_stub("stage_revision")]])
            .into_connection();

        let service = service(content_db, principal_db, audit_db, empty());

        let mut proposed = ContentFields::from_model(&live);
        proposed.title = "B".to_string();

        let result = service.stage("alice", "item1", proposed).await.unwrap();

        assert_eq!(result.review_state, ReviewState::Pending);
        assert_eq!(result.title, "A"); // live field untouched
        let patch = result.pending_patch.unwrap();
        assert_eq!(patch["title"]["from"], json!("A"));
        assert_eq!(patch["title"]["to"], json!("B"));
        assert!(result.change_summary.unwrap().contains("title"));
    }

    #[tokio::test]
    async fn test_stage_by_direct_writer_is_denied() {
        let principal_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[reviewer("bob")]])
            .into_connection();

        let service = service(empty(), principal_db, empty(), empty());

        let proposed = ContentFields::from_model(&published_item("item1", "A"));
        let result = service.stage("bob", "item1", proposed).await;

        assert!(matches!(result, Err(AppError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_stage_with_no_changes_is_rejected() {
        let live = published_item("item1", "A");

        let principal_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[restricted("alice")]])
            .into_connection();
        let content_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[live.clone()]])
            .into_connection();

        let service = service(content_db, principal_db, empty(), empty());

        let proposed = ContentFields::from_model(&live);
        let result = service.stage("alice", "item1", proposed).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_approve_merges_patch_and_publishes() {
        let staged = pending_item("item1", "A", "B");
        let approved = content_item::Model {
            title: "B".to_string(),
            review_state: ReviewState::Approved,
            pending_patch: None,
            ..published_item("item1", "B")
        };

        let principal_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[reviewer("bob")]])
            .into_connection();
        let content_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[staged]])
            .append_exec_results([exec_ok()])
            .append_query_results([[approved]])
            .into_connection();
        let audit_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[audit_stub("approve_content")]])
            .into_connection();
        let comment_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[comment_stub()]])
            .into_connection();

        let service = service(content_db, principal_db, audit_db, comment_db);

        let result = service.approve("bob", "item1").await.unwrap();

        assert_eq!(result.title, "B");
        assert_eq!(result.review_state, ReviewState::Approved);
        assert_eq!(result.publication_state, PublicationState::Published);
        assert!(result.pending_patch.is_none());
    }

    #[tokio::test]
    async fn test_approve_requires_review_capability() {
        let principal_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[restricted("alice")]])
            .into_connection();

        let service = service(empty(), principal_db, empty(), empty());

        let result = service.approve("alice", "item1").await;

        assert!(matches!(result, Err(AppError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_reject_after_approval_is_precondition_failed() {
        let approved = content_item::Model {
            review_state: ReviewState::Approved,
            ..published_item("item1", "B")
        };

        let principal_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[reviewer("bob")]])
            .into_connection();
        let content_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[approved]])
            .into_connection();

        let service = service(content_db, principal_db, empty(), empty());

        let result = service.reject("bob", "item1", "too late").await;

        assert!(matches!(result, Err(AppError::PreconditionFailed(_))));
    }

    #[tokio::test]
    async fn test_approve_lost_race_is_precondition_failed() {
        let staged = pending_item("item1", "A", "B");

        let principal_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[reviewer("bob")]])
            .into_connection();
        let content_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[staged]])
            .append_exec_results([exec_noop()]) // another reviewer won
            .into_connection();

        let service = service(content_db, principal_db, empty(), empty());

        let result = service.approve("bob", "item1").await;

        assert!(matches!(result, Err(AppError::PreconditionFailed(_))));
    }

    #[tokio::test]
    async fn test_approve_stale_patch_is_conflict() {
        // Patch was computed against title "A" but live title has since
        // become "C" through a direct write.
        let drifted = content_item::Model {
            title: "C".to_string(),
            ..pending_item("item1", "A", "B")
        };

        let principal_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[reviewer("bob")]])
            .into_connection();
        let content_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[drifted]])
            .into_connection();

        let service = service(content_db, principal_db, empty(), empty());

        let result = service.approve("bob", "item1").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_reject_discards_patch_and_keeps_live_fields() {
        let staged = pending_item("item1", "A", "B");
        let rejected = content_item::Model {
            review_state: ReviewState::Rejected,
            rejection_reason: Some("needs more detail".to_string()),
            pending_patch: None,
            ..published_item("item1", "A")
        };

        let principal_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[reviewer("bob")]])
            .into_connection();
        let content_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[staged]])
            .append_exec_results([exec_ok()])
            .append_query_results([[rejected]])
            .into_connection();
        let audit_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[audit_stub("reject_content")]])
            .into_connection();
        let comment_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[comment_stub()]])
            .into_connection();

        let service = service(content_db, principal_db, audit_db, comment_db);

        let result = service
            .reject("bob", "item1", "needs more detail")
            .await
            .unwrap();

        assert_eq!(result.title, "A"); // live fields untouched
        assert_eq!(result.review_state, ReviewState::Rejected);
        assert_eq!(result.rejection_reason.as_deref(), Some("needs more detail"));
        assert!(result.pending_patch.is_none());
    }

    #[tokio::test]
    async fn test_reject_requires_reason() {
        let principal_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[reviewer("bob")]])
            .into_connection();

        let service = service(empty(), principal_db, empty(), empty());

        let result = service.reject("bob", "item1", "   ").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_write_direct_by_restricted_is_denied() {
        let principal_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[restricted("alice")]])
            .into_connection();

        let service = service(empty(), principal_db, empty(), empty());

        let proposed = ContentFields::from_model(&published_item("item1", "A"));
        let result = service.write_direct("alice", "item1", proposed).await;

        assert!(matches!(result, Err(AppError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_write_direct_replaces_and_clears_review_state() {
        let rejected = content_item::Model {
            review_state: ReviewState::Rejected,
            rejection_reason: Some("stale".to_string()),
            ..published_item("item1", "A")
        };
        let updated = published_item("item1", "Fresh title");

        let principal_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[reviewer("bob")]])
            .into_connection();
        let content_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[rejected.clone()]])
            .append_exec_results([exec_ok()])
            .append_query_results([[updated]])
            .into_connection();
        let audit_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[audit_stub("update_content")]])
            .into_connection();

        let service = service(content_db, principal_db, audit_db, empty());

        let mut proposed = ContentFields::from_model(&rejected);
        proposed.title = "Fresh title".to_string();
        let result = service.write_direct("bob", "item1", proposed).await.unwrap();

        assert_eq!(result.title, "Fresh title");
        assert_eq!(result.review_state, ReviewState::None);
        assert!(result.rejection_reason.is_none());
    }

    #[tokio::test]
    async fn test_delete_by_restricted_is_denied_regardless_of_ownership() {
        // Alice created the item, but deletion is still denied.
        let principal_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[restricted("alice")]])
            .into_connection();

        let service = service(empty(), principal_db, empty(), empty());

        let result = service.delete("alice", "item1").await;

        assert!(matches!(result, Err(AppError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_delete_by_reviewer_succeeds() {
        let principal_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[reviewer("bob")]])
            .into_connection();
        let content_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec_ok()])
            .into_connection();
        let audit_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[audit_stub("delete_content")]])
            .into_connection();

        let service = service(content_db, principal_db, audit_db, empty());

        let result = service.delete("bob", "item1").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_marks_restricted_authors_for_review() {
        let created = content_item::Model {
            publication_state: PublicationState::Draft,
            requires_review: true,
            published_at: None,
            ..published_item("item1", "New draft")
        };

        let principal_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[restricted("alice")]])
            .into_connection();
        let content_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[created]])
            .into_connection();
        let audit_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[audit_stub("create_content")]])
            .into_connection();

        let service = service(content_db, principal_db, audit_db, empty());

        let fields = ContentFields {
            title: "New draft".to_string(),
            body: "Body".to_string(),
            excerpt: None,
            tags: vec![],
            category: None,
            featured: false,
            hero_image_id: None,
            attachment_ids: vec![],
        };
        let result = service.create("alice", fields).await.unwrap();

        assert_eq!(result.publication_state, PublicationState::Draft);
        assert_eq!(result.review_state, ReviewState::None);
        assert!(result.requires_review);
    }

    #[tokio::test]
    async fn test_archive_and_unarchive_round_trip() {
        let live = published_item("item1", "A");
        let archived = content_item::Model {
            publication_state: PublicationState::Archived,
            ..published_item("item1", "A")
        };

        let principal_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[reviewer("bob")], [reviewer("bob")]])
            .into_connection();
        let content_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[live]])
            .append_query_results([[archived.clone()]]) // update returning
            .append_query_results([[archived]])
            .append_query_results([[published_item("item1", "A")]]) // update returning
            .into_connection();
        let audit_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[audit_stub("archive_content")], [audit_stub("unarchive_content")]])
            .into_connection();

        let service = service(content_db, principal_db, audit_db, empty());

        let result = service.archive("bob", "item1").await.unwrap();
        assert_eq!(result.publication_state, PublicationState::Archived);

        // Previously published, so restoring returns it to published.
        let result = service.unarchive("bob", "item1").await.unwrap();
        assert_eq!(result.publication_state, PublicationState::Published);
    }
}
