//! Security Service Library
//!
//! Users, role assignments and role definitions stored in the database,
//! authority resolution for principals, and password authentication.

pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use std::sync::Arc;

use tracing::info;

use crate::config::SecurityServiceConfig;
use crate::infra::Database;
use crate::repository::{
    CompositeRoleRepository, InMemoryRoleRepository, RoleAssignmentStore, RoleRepository, RoleStore,
    UserStore,
};
use crate::service::{Authenticator, DatabaseUserRepository};
use common::AppResult;
use domain::User;

/// Stores and services sharing one database connection.
pub struct SecurityServices {
    pub db: Database,
    pub users: Arc<UserStore>,
    pub assignments: Arc<RoleAssignmentStore>,
    pub role_store: Arc<RoleStore>,
    /// Roles registered in code, then roles stored in the database
    pub roles: Arc<CompositeRoleRepository>,
    pub user_repository: Arc<DatabaseUserRepository<User>>,
}

impl SecurityServices {
    /// Connect using `config`, applying migrations when enabled.
    pub async fn connect(config: &SecurityServiceConfig) -> AppResult<Self> {
        let db = if config.auto_migrate {
            Database::connect(&config.database).await?
        } else {
            Database::connect_without_migrations(&config.database).await?
        };
        Self::from_database(db, InMemoryRoleRepository::with_defaults()).await
    }

    /// Wire the stores over an open database.
    pub async fn from_database(db: Database, annotated: InMemoryRoleRepository) -> AppResult<Self> {
        let conn = db.get_connection();

        let users = Arc::new(UserStore::new(conn.clone()));
        let assignments = Arc::new(RoleAssignmentStore::new(conn.clone()));
        let role_store = Arc::new(RoleStore::new(conn));
        let annotated: Arc<dyn RoleRepository> = Arc::new(annotated);
        let stored: Arc<dyn RoleRepository> = role_store.clone();
        let roles = Arc::new(CompositeRoleRepository::new(vec![annotated, stored]));

        let user_repository = Arc::new(
            DatabaseUserRepository::<User>::initialize(
                users.clone(),
                assignments.clone(),
                roles.clone(),
            )
            .await?,
        );

        Ok(Self {
            db,
            users,
            assignments,
            role_store,
            roles,
            user_repository,
        })
    }

    pub fn authenticator(&self) -> Authenticator {
        Authenticator::new(self.user_repository.clone())
    }
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = SecurityServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}
