//! Role assignments stored in `sec_role_assignment`.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};

use super::entities::role_assignment::{self, ActiveModel, Entity as RoleAssignmentEntity};
use common::{AppError, AppResult, OptionExt};
use domain::RoleAssignment;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Role assignment repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoleAssignmentRepository: Send + Sync {
    /// Assignments of `username` in the order they were made
    async fn get_assignments_by_username(&self, username: &str) -> AppResult<Vec<RoleAssignment>>;

    /// Assign a role code to a username
    async fn assign(&self, username: &str, role_code: &str) -> AppResult<RoleAssignment>;

    /// Remove an assignment
    async fn revoke(&self, username: &str, role_code: &str) -> AppResult<()>;
}

/// Database-backed role assignments.
pub struct RoleAssignmentStore {
    db: DatabaseConnection,
}

impl RoleAssignmentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find(&self, username: &str, role_code: &str) -> AppResult<Option<role_assignment::Model>> {
        RoleAssignmentEntity::find()
            .filter(role_assignment::Column::Username.eq(username))
            .filter(role_assignment::Column::RoleCode.eq(role_code))
            .one(&self.db)
            .await
            .map_err(AppError::from)
    }
}

#[async_trait]
impl RoleAssignmentRepository for RoleAssignmentStore {
    async fn get_assignments_by_username(&self, username: &str) -> AppResult<Vec<RoleAssignment>> {
        let models = RoleAssignmentEntity::find()
            .filter(role_assignment::Column::Username.eq(username))
            .order_by_asc(role_assignment::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(RoleAssignment::from).collect())
    }

    async fn assign(&self, username: &str, role_code: &str) -> AppResult<RoleAssignment> {
        if username.trim().is_empty() || role_code.trim().is_empty() {
            return Err(AppError::validation("Username and role code are required"));
        }
        if self.find(username, role_code).await?.is_some() {
            return Err(AppError::conflict("Role assignment"));
        }

        let active_model = ActiveModel {
            username: Set(username.to_string()),
            role_code: Set(role_code.to_string()),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        tracing::info!(username, role_code, "Role assigned");
        Ok(RoleAssignment::from(model))
    }

    async fn revoke(&self, username: &str, role_code: &str) -> AppResult<()> {
        let model = self
            .find(username, role_code)
            .await?
            .ok_or_not_found()?;

        model.delete(&self.db).await.map_err(AppError::from)?;
        tracing::info!(username, role_code, "Role revoked");
        Ok(())
    }
}
