//! Comment thread service.
//!
//! Append-only discussion log attached to a reviewable item. Submissions
//! and content revisions share the same thread table.

use chapterhub_common::config::ReviewConfig;
use chapterhub_common::{AppError, AppResult, IdGenerator};
use chapterhub_db::entities::comment::{self, CommentKind};
use chapterhub_db::repositories::CommentRepository;
use sea_orm::Set;
use tracing::warn;

/// Input for adding a comment.
pub struct AddCommentInput {
    pub thread_id: String,
    pub body: String,
    pub kind: CommentKind,
}

/// Comment thread service.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    config: ReviewConfig,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comment_repo: CommentRepository, config: ReviewConfig) -> Self {
        Self {
            comment_repo,
            config,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a comment to a thread.
    ///
    /// Status-change comments cannot be authored here; they are produced
    /// only as side effects of approve/reject transitions.
    pub async fn add(&self, author_id: &str, input: AddCommentInput) -> AppResult<comment::Model> {
        let body = input.body.trim();
        if body.is_empty() {
            return Err(AppError::Validation(
                "Comment body is required".to_string(),
            ));
        }
        if body.chars().count() > self.config.max_comment_length {
            return Err(AppError::Validation("Comment body too long".to_string()));
        }
        if input.kind == CommentKind::StatusChange {
            return Err(AppError::Validation(
                "Status-change comments are system-generated".to_string(),
            ));
        }

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            thread_id: Set(input.thread_id),
            author_id: Set(author_id.to_string()),
            body: Set(body.to_string()),
            kind: Set(input.kind),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.comment_repo.insert(model).await
    }

    /// Get all comments in a thread, oldest first.
    pub async fn list_for(&self, thread_id: &str) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.list_for_thread(thread_id).await
    }

    /// Append a system-generated status-change comment.
    ///
    /// Called by the approval state machine after a transition has
    /// committed; a failure here is logged and swallowed so it cannot
    /// un-commit the transition it describes.
    pub(crate) async fn add_status_change(
        &self,
        author_id: &str,
        thread_id: &str,
        body: &str,
    ) -> Option<comment::Model> {
        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            thread_id: Set(thread_id.to_string()),
            author_id: Set(author_id.to_string()),
            body: Set(body.to_string()),
            kind: Set(CommentKind::StatusChange),
            created_at: Set(chrono::Utc::now().into()),
        };

        match self.comment_repo.insert(model).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(
                    thread_id,
                    error = %e,
                    "Status-change comment append failed; continuing"
                );
                None
            }
        }
    }
}
