//! Principal repository.

use std::sync::Arc;

use crate::entities::{principal, Principal};
use chapterhub_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Principal repository for database operations.
#[derive(Clone)]
pub struct PrincipalRepository {
    db: Arc<DatabaseConnection>,
}

impl PrincipalRepository {
    /// Create a new principal repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a new principal.
    pub async fn create(&self, model: principal::ActiveModel) -> AppResult<principal::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a principal by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<principal::Model> {
        Principal::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Principal {id} not found")))
    }

    /// Find a principal by username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<principal::Model>> {
        Principal::find()
            .filter(principal::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
