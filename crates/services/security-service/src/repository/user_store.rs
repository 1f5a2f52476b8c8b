//! User records stored in `sec_user`.

use async_trait::async_trait;
use chrono_tz::Tz;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;
use validator::Validate;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use common::{AppError, AppResult, OptionExt};
use domain::{is_sentinel_username, NewUser, Password, User, UserDetails};

/// Source of principal records, looked up by username.
#[async_trait]
pub trait UserRecordRepository<U: UserDetails>: Send + Sync {
    /// Records whose username equals `username`, oldest first
    async fn find_by_username(&self, username: &str) -> AppResult<Vec<U>>;

    /// Records whose username contains `fragment`, case-sensitively
    async fn find_by_username_like(&self, fragment: &str) -> AppResult<Vec<U>>;
}

/// Database-backed user records.
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    /// Create a user with a hashed password.
    ///
    /// # Errors
    /// `ConstraintViolations` or `Validation` for invalid input, `Conflict`
    /// when the username is taken.
    pub async fn create(&self, new_user: NewUser) -> AppResult<User> {
        new_user.validate()?;

        if is_sentinel_username(&new_user.username) {
            return Err(AppError::validation(format!(
                "Username '{}' is reserved",
                new_user.username
            )));
        }
        if let Some(id) = new_user.time_zone_id.as_deref() {
            id.parse::<Tz>()
                .map_err(|_| AppError::validation(format!("Unknown time zone '{}'", id)))?;
        }
        if !self.find_by_username(&new_user.username).await?.is_empty() {
            return Err(AppError::conflict("User"));
        }

        let password = Password::new(&new_user.password)?;
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(new_user.username),
            password_hash: Set(password.into_string()),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            email: Set(new_user.email),
            active: Set(true),
            time_zone_id: Set(new_user.time_zone_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        tracing::info!(username = %model.username, "User created");
        Ok(User::from(model))
    }

    /// Enable or disable a user.
    pub async fn set_active(&self, id: Uuid, active: bool) -> AppResult<User> {
        let user = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found()?;

        let mut model: ActiveModel = user.into();
        model.active = Set(active);
        model.updated_at = Set(chrono::Utc::now());

        let model = model.update(&self.db).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }
}

#[async_trait]
impl UserRecordRepository<User> for UserStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .order_by_asc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn find_by_username_like(&self, fragment: &str) -> AppResult<Vec<User>> {
        // LIKE may ignore case depending on the backend
        let models = UserEntity::find()
            .filter(user::Column::Username.contains(fragment))
            .order_by_asc(user::Column::Username)
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models
            .into_iter()
            .filter(|m| m.username.contains(fragment))
            .map(User::from)
            .collect())
    }
}
