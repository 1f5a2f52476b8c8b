//! Database-defined roles stored in `sec_resource_role`.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use super::entities::resource_role::{self, ActiveModel, Entity as RoleEntity};
use super::role_repository::RoleRepository;
use common::{AppError, AppResult};
use domain::Role;

/// Roles editable at runtime.
pub struct RoleStore {
    db: DatabaseConnection,
}

impl RoleStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Store a new role definition.
    pub async fn create(&self, code: &str, name: &str, description: Option<String>) -> AppResult<Role> {
        if code.trim().is_empty() || name.trim().is_empty() {
            return Err(AppError::validation("Role code and name are required"));
        }
        if RoleEntity::find_by_id(code.to_string())
            .one(&self.db)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Role"));
        }

        let active_model = ActiveModel {
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            description: Set(description),
            created_at: Set(chrono::Utc::now()),
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        tracing::info!(code, "Role created");
        Ok(Role::from(model))
    }
}

#[async_trait]
impl RoleRepository for RoleStore {
    async fn get_role_by_code(&self, code: &str) -> AppResult<Option<Role>> {
        let result = RoleEntity::find_by_id(code.to_string())
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Role::from))
    }

    async fn all_roles(&self) -> AppResult<Vec<Role>> {
        let models = RoleEntity::find()
            .order_by_asc(resource_role::Column::Code)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Role::from).collect())
    }
}
