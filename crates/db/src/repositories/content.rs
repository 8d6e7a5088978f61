//! Content item repository.

use std::sync::Arc;

use crate::entities::{
    content_item::{self, ReviewState},
    ContentItem,
};
use chapterhub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Content item repository for database operations.
#[derive(Clone)]
pub struct ContentRepository {
    db: Arc<DatabaseConnection>,
}

impl ContentRepository {
    /// Create a new content repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a new content item.
    pub async fn create(
        &self,
        model: content_item::ActiveModel,
    ) -> AppResult<content_item::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a content item by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<content_item::Model> {
        ContentItem::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Content item {id} not found")))
    }

    /// Update a content item unconditionally.
    pub async fn update(
        &self,
        model: content_item::ActiveModel,
    ) -> AppResult<content_item::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a content item only if its review state still matches
    /// `expected` at commit time.
    ///
    /// Returns `false` when zero rows were affected, i.e. a concurrent
    /// transition won the race and the caller must surface a precondition
    /// failure. Only fields set in `model` are written.
    pub async fn update_where_review_state(
        &self,
        id: &str,
        expected: ReviewState,
        model: content_item::ActiveModel,
    ) -> AppResult<bool> {
        let result = ContentItem::update_many()
            .set(model)
            .filter(content_item::Column::Id.eq(id))
            .filter(content_item::Column::ReviewState.eq(expected))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// Permanently delete a content item.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = ContentItem::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Content item {id} not found")));
        }
        Ok(())
    }

    /// Get items awaiting review, most recently touched first.
    pub async fn list_pending(
        &self,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<content_item::Model>> {
        ContentItem::find()
            .filter(content_item::Column::ReviewState.eq(ReviewState::Pending))
            .order_by_desc(content_item::Column::UpdatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count items awaiting review.
    pub async fn count_pending(&self) -> AppResult<u64> {
        ContentItem::find()
            .filter(content_item::Column::ReviewState.eq(ReviewState::Pending))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get items in a given review state.
    pub async fn list_by_review_state(
        &self,
        state: ReviewState,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<content_item::Model>> {
        ContentItem::find()
            .filter(content_item::Column::ReviewState.eq(state))
            .order_by_desc(content_item::Column::UpdatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
